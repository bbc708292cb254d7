//! A single method/path/action binding.

use super::template::{self, Segment};
use regex::Regex;
use waypost_core::{MethodSet, RouteError};

/// Parameters captured from a request path, in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    /// Create an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value captured for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Append a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// An immutable binding of methods and a path template to an action.
///
/// The match pattern is compiled once, when the route is created. A template
/// whose pattern does not compile is still accepted; the route then never
/// matches, and [`Route::validate`] reports why.
#[derive(Debug, Clone)]
pub struct Route<A> {
    methods: MethodSet,
    path: String,
    segments: Vec<Segment>,
    pattern: Option<Regex>,
    pattern_error: Option<String>,
    is_dynamic: bool,
    action: A,
    name: Option<String>,
}

impl<A> Route<A> {
    /// Create a route, compiling its template.
    pub fn new(methods: impl Into<MethodSet>, path: impl Into<String>, action: A) -> Self {
        let path = path.into();
        let is_dynamic = path.contains('{');
        let segments = template::parse(&path);

        let (pattern, pattern_error) = if is_dynamic {
            match Regex::new(&template::regex_source(&segments)) {
                Ok(regex) => (Some(regex), None),
                Err(e) => (None, Some(e.to_string())),
            }
        } else {
            (None, None)
        };

        Self {
            methods: methods.into(),
            path,
            segments,
            pattern,
            pattern_error,
            is_dynamic,
            action,
            name: None,
        }
    }

    /// The methods this route accepts.
    pub fn methods(&self) -> &MethodSet {
        &self.methods
    }

    /// The template as registered.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The literal text before the first placeholder.
    pub fn static_prefix(&self) -> &str {
        template::static_prefix(&self.path)
    }

    /// The compiled pattern: regex source for dynamic routes, the literal
    /// path otherwise.
    pub fn pattern(&self) -> &str {
        match &self.pattern {
            Some(regex) => regex.as_str(),
            None => &self.path,
        }
    }

    /// Whether the template contains a placeholder.
    pub fn is_dynamic(&self) -> bool {
        self.is_dynamic
    }

    /// The bound action.
    pub fn action(&self) -> &A {
        &self.action
    }

    /// The reverse-lookup name, if set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set the reverse-lookup name.
    pub fn named(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Builder-style variant of [`Route::named`].
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Names of the placeholders, in template order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// The pattern compile error, if the template is malformed.
    pub fn pattern_error(&self) -> Option<&str> {
        self.pattern_error.as_deref()
    }

    /// Fail if the template's pattern does not compile.
    pub fn validate(&self) -> Result<(), RouteError> {
        match &self.pattern_error {
            Some(reason) => Err(RouteError::InvalidPattern {
                template: self.path.clone(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Whether `path` matches this route's pattern.
    ///
    /// Static routes match only their exact literal path.
    pub fn matches(&self, path: &str) -> bool {
        if !self.is_dynamic {
            return self.path == path;
        }
        self.pattern.as_ref().is_some_and(|regex| regex.is_match(path))
    }

    /// Match `path` and extract the named captures.
    pub fn captures(&self, path: &str) -> Option<Params> {
        if !self.is_dynamic {
            return (self.path == path).then(Params::new);
        }
        let regex = self.pattern.as_ref()?;
        let captures = regex.captures(path)?;
        let mut params = Params::new();
        for name in regex.capture_names().flatten() {
            if let Some(value) = captures.name(name) {
                params.insert(name, value.as_str());
            }
        }
        Some(params)
    }

    /// Build a concrete path by filling each placeholder from `params`.
    pub fn url_for(&self, params: &Params) -> Result<String, RouteError> {
        let mut url = String::with_capacity(self.path.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => url.push_str(text),
                Segment::Param { name, constraint } => {
                    let value = params.get(name).ok_or_else(|| RouteError::MissingParam {
                        template: self.path.clone(),
                        param: name.clone(),
                    })?;
                    let check = Regex::new(&format!("^(?:{constraint})$")).map_err(|e| {
                        RouteError::InvalidPattern {
                            template: self.path.clone(),
                            reason: e.to_string(),
                        }
                    })?;
                    if !check.is_match(value) {
                        return Err(RouteError::ParamMismatch {
                            template: self.path.clone(),
                            param: name.clone(),
                            value: value.to_owned(),
                        });
                    }
                    url.push_str(value);
                }
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_route_matches_only_literal() {
        let route = Route::new("GET", "/about", ());
        assert!(!route.is_dynamic());
        assert_eq!(route.pattern(), "/about");
        assert!(route.matches("/about"));
        assert!(!route.matches("/about/"));
        assert!(!route.matches("/abou"));
        assert_eq!(route.captures("/about"), Some(Params::new()));
    }

    #[test]
    fn test_dynamic_route_captures() {
        let route = Route::new("GET", "/users/{id}", ());
        assert!(route.is_dynamic());
        assert_eq!(route.static_prefix(), "/users/");

        let params = route.captures("/users/42").unwrap();
        assert_eq!(params.get("id"), Some("42"));
        assert!(route.captures("/users/abc/def").is_none());
        assert!(route.captures("/users/").is_none());
    }

    #[test]
    fn test_constraint_is_applied() {
        let route = Route::new("GET", "/items/{id:\\d+}", ());
        assert_eq!(route.captures("/items/7").unwrap().get("id"), Some("7"));
        assert!(!route.matches("/items/x"));
    }

    #[test]
    fn test_anonymous_capture_names() {
        let route = Route::new("GET", "/archive/{\\d{4}}/{\\d{2}}", ());
        let names: Vec<_> = route.param_names().collect();
        assert_eq!(names, ["param0", "param1"]);

        let params = route.captures("/archive/2024/05").unwrap();
        assert_eq!(params.get("param0"), Some("2024"));
        assert_eq!(params.get("param1"), Some("05"));
    }

    #[test]
    fn test_malformed_constraint_never_matches() {
        let route = Route::new("GET", "/broken/{id:[0-9}", ());
        assert!(route.pattern_error().is_some());
        assert!(!route.matches("/broken/1"));
        assert!(matches!(
            route.validate(),
            Err(RouteError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_url_for() {
        let route = Route::new("GET", "/users/{id:\\d+}/posts/{slug}", ());
        let params: Params = [("id", "7"), ("slug", "hello")].into_iter().collect();
        assert_eq!(route.url_for(&params).unwrap(), "/users/7/posts/hello");

        let missing: Params = [("id", "7")].into_iter().collect();
        assert!(matches!(
            route.url_for(&missing),
            Err(RouteError::MissingParam { param, .. }) if param == "slug"
        ));

        let wrong: Params = [("id", "x"), ("slug", "hello")].into_iter().collect();
        assert!(matches!(
            route.url_for(&wrong),
            Err(RouteError::ParamMismatch { param, .. }) if param == "id"
        ));
    }

    #[test]
    fn test_naming() {
        let mut route = Route::new("GET", "/", ());
        route.named("home");
        assert_eq!(route.name(), Some("home"));

        let route = Route::new("GET", "/about", ()).with_name("about");
        assert_eq!(route.name(), Some("about"));
    }
}
