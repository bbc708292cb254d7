//! HTTP method sets.
//!
//! A route accepts either a single method token or a set of them. Both forms
//! are normalized once, at construction, into a [`MethodSet`]. Standard verbs
//! live in a [`Methods`] bit set; any other token is kept verbatim as an
//! extension token. `ANY` is a reserved member that accepts every method.
//!
//! Tokens are compared case-sensitively: `"get"` is an extension token and
//! does not match `GET`.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Standard HTTP methods plus the `ANY` wildcard.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Methods: u16 {
        /// `GET`
        const GET = 1 << 0;
        /// `HEAD`
        const HEAD = 1 << 1;
        /// `POST`
        const POST = 1 << 2;
        /// `PUT`
        const PUT = 1 << 3;
        /// `DELETE`
        const DELETE = 1 << 4;
        /// `CONNECT`
        const CONNECT = 1 << 5;
        /// `OPTIONS`
        const OPTIONS = 1 << 6;
        /// `TRACE`
        const TRACE = 1 << 7;
        /// `PATCH`
        const PATCH = 1 << 8;
        /// Wildcard accepting every method.
        const ANY = 1 << 15;
    }
}

const TOKENS: [(&str, Methods); 10] = [
    ("GET", Methods::GET),
    ("HEAD", Methods::HEAD),
    ("POST", Methods::POST),
    ("PUT", Methods::PUT),
    ("DELETE", Methods::DELETE),
    ("CONNECT", Methods::CONNECT),
    ("OPTIONS", Methods::OPTIONS),
    ("TRACE", Methods::TRACE),
    ("PATCH", Methods::PATCH),
    ("ANY", Methods::ANY),
];

impl Methods {
    /// Look up the flag for a method token.
    pub fn from_token(token: &str) -> Option<Self> {
        TOKENS
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, flag)| *flag)
    }
}

/// The normalized set of methods a route accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSet {
    flags: Methods,
    extensions: Vec<String>,
}

impl MethodSet {
    /// A set accepting every method.
    pub fn any() -> Self {
        Self::from(Methods::ANY)
    }

    /// Build a set from method tokens.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self {
            flags: Methods::empty(),
            extensions: Vec::new(),
        };
        for token in tokens {
            set.insert(token.as_ref());
        }
        set
    }

    fn insert(&mut self, token: &str) {
        match Methods::from_token(token) {
            Some(flag) => self.flags |= flag,
            None => {
                if !self.extensions.iter().any(|t| t == token) {
                    self.extensions.push(token.to_owned());
                }
            }
        }
    }

    /// Whether this set contains the `ANY` wildcard.
    pub fn is_any(&self) -> bool {
        self.flags.contains(Methods::ANY)
    }

    /// Whether a request with `method` is accepted.
    ///
    /// A request method of `"ANY"` is only accepted by wildcard sets.
    pub fn accepts(&self, method: &str) -> bool {
        if self.is_any() {
            return true;
        }
        match Methods::from_token(method) {
            Some(flag) => self.flags.contains(flag),
            None => self.extensions.iter().any(|t| t == method),
        }
    }

    /// The standard methods in this set.
    pub fn flags(&self) -> Methods {
        self.flags
    }

    /// Non-standard tokens, in insertion order.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Whether the set accepts nothing.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty() && self.extensions.is_empty()
    }
}

impl Default for MethodSet {
    fn default() -> Self {
        Self::any()
    }
}

impl From<Methods> for MethodSet {
    fn from(flags: Methods) -> Self {
        Self {
            flags,
            extensions: Vec::new(),
        }
    }
}

impl From<&str> for MethodSet {
    fn from(token: &str) -> Self {
        Self::new([token])
    }
}

impl From<String> for MethodSet {
    fn from(token: String) -> Self {
        Self::new([token])
    }
}

impl From<&[&str]> for MethodSet {
    fn from(tokens: &[&str]) -> Self {
        Self::new(tokens)
    }
}

impl<const N: usize> From<[&str; N]> for MethodSet {
    fn from(tokens: [&str; N]) -> Self {
        Self::new(tokens)
    }
}

impl From<Vec<&str>> for MethodSet {
    fn from(tokens: Vec<&str>) -> Self {
        Self::new(tokens)
    }
}

impl From<Vec<String>> for MethodSet {
    fn from(tokens: Vec<String>) -> Self {
        Self::new(tokens)
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let standard = TOKENS
            .iter()
            .filter(|(_, flag)| self.flags.contains(*flag))
            .map(|(name, _)| *name);
        let extensions = self.extensions.iter().map(String::as_str);
        for (i, token) in standard.chain(extensions).enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(token)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_token() {
        let set = MethodSet::from("GET");
        assert!(set.accepts("GET"));
        assert!(!set.accepts("POST"));
        assert!(!set.accepts("get"));
    }

    #[test]
    fn test_token_list() {
        let set = MethodSet::from(["GET", "POST"]);
        assert!(set.accepts("GET"));
        assert!(set.accepts("POST"));
        assert!(!set.accepts("DELETE"));
        assert_eq!(set.to_string(), "GET|POST");
    }

    #[test]
    fn test_any_wildcard() {
        let set = MethodSet::from(["POST", "ANY"]);
        assert!(set.is_any());
        assert!(set.accepts("GET"));
        assert!(set.accepts("PROPFIND"));
        assert!(set.accepts("ANY"));

        let only_get = MethodSet::from("GET");
        assert!(!only_get.accepts("ANY"));
    }

    #[test]
    fn test_extension_tokens() {
        let set = MethodSet::from(vec!["PROPFIND", "PROPFIND", "get"]);
        assert_eq!(set.extensions(), ["PROPFIND".to_string(), "get".to_string()]);
        assert!(set.accepts("PROPFIND"));
        assert!(set.accepts("get"));
        assert!(!set.accepts("GET"));
    }

    #[test]
    fn test_empty_set_accepts_nothing() {
        let set = MethodSet::new(Vec::<String>::new());
        assert!(set.is_empty());
        assert!(!set.accepts("GET"));
    }
}
