//! Path template parsing.
//!
//! A template is literal text interleaved with `{...}` placeholders:
//!
//! | placeholder       | capture name | constraint        |
//! |-------------------|--------------|-------------------|
//! | `{name}`          | `name`       | `[^/]+`           |
//! | `{name:regex}`    | `name`       | `regex` verbatim  |
//! | `{regex}`         | `paramN`     | `regex` verbatim  |
//!
//! The third form applies when the content starts with a regex
//! metacharacter. `N` counts anonymous placeholders from 0 within one
//! template. Braces inside a placeholder are balanced, so `{id:\d{2}}` is a
//! single placeholder. An empty `{}` or an unterminated `{` stays literal.

/// Constraint used by `{name}` placeholders.
pub const DEFAULT_CONSTRAINT: &str = "[^/]+";

const METACHARACTERS: [char; 14] = [
    '\\', '^', '$', '.', '*', '+', '?', '(', ')', '[', ']', '{', '}', '|',
];

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text matched verbatim.
    Literal(String),
    /// A named capture.
    Param {
        /// Capture name.
        name: String,
        /// Regex fragment the value must match.
        constraint: String,
    },
}

/// The text before the first `{`, or the whole path if there is none.
pub fn static_prefix(path: &str) -> &str {
    match path.find('{') {
        Some(index) => &path[..index],
        None => path,
    }
}

/// Split a template into literal and placeholder segments.
pub fn parse(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut anonymous = 0usize;
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        literal.push_str(&rest[..open]);
        let inner = &rest[open + 1..];
        match group_end(inner) {
            Some(close) if close > 0 => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(placeholder(&inner[..close], &mut anonymous));
                rest = &inner[close + 1..];
            }
            _ => {
                literal.push('{');
                rest = inner;
            }
        }
    }
    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

/// Anchored regex source for a parsed template.
pub fn regex_source(segments: &[Segment]) -> String {
    let mut source = String::from("^");
    for segment in segments {
        match segment {
            Segment::Literal(text) => source.push_str(&regex::escape(text)),
            Segment::Param { name, constraint } => {
                source.push_str("(?P<");
                source.push_str(name);
                source.push('>');
                source.push_str(constraint);
                source.push(')');
            }
        }
    }
    source.push('$');
    source
}

// Index of the `}` closing the placeholder that `s` starts inside of.
fn group_end(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut escaped = false;
    for (index, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' if depth == 0 => return Some(index),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn placeholder(content: &str, anonymous: &mut usize) -> Segment {
    if let Some((name, constraint)) = content.split_once(':') {
        if is_param_name(name) && !constraint.is_empty() {
            return Segment::Param {
                name: name.to_owned(),
                constraint: constraint.to_owned(),
            };
        }
    }
    if content.starts_with(METACHARACTERS) {
        let name = format!("param{anonymous}");
        *anonymous += 1;
        return Segment::Param {
            name,
            constraint: content.to_owned(),
        };
    }
    Segment::Param {
        name: content.to_owned(),
        constraint: DEFAULT_CONSTRAINT.to_owned(),
    }
}

fn is_param_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
