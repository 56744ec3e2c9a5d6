//! Structured qualified names.
//!
//! A `QName` is a dot-separated namespace-and-identifier path. The pipeline
//! works on structured names throughout; flattening to output text (dotted
//! vs. underscore-joined) is a pure rendering decision applied only at the
//! printer/assembler boundary via [`QNamePolicy`].

use std::fmt;

use serde::Serialize;

/// Language/runtime built-in names that are never recorded as dependencies
/// and never namespace-qualified in output.
pub const BUILTIN_NAMES: &[&str] = &[
    "Object", "Array", "String", "Number", "Boolean", "Function", "int", "uint", "void", "*",
    "undefined", "null",
];

/// A structured qualified name: one or more identifier segments.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QName {
    segments: Vec<String>,
}

impl QName {
    /// Build from explicit segments. Empty segment lists are not meaningful;
    /// callers construct names from resolved symbols, which always have at
    /// least the simple name.
    pub fn new(segments: Vec<String>) -> Self {
        debug_assert!(!segments.is_empty());
        Self { segments }
    }

    /// Parse a dotted path: `"org.example.Button"`.
    pub fn parse(dotted: &str) -> Self {
        Self {
            segments: dotted.split('.').map(str::to_string).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The final identifier segment.
    pub fn simple_name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// The namespace portion, if any (all segments but the last).
    pub fn namespace(&self) -> Option<QName> {
        if self.segments.len() > 1 {
            Some(Self {
                segments: self.segments[..self.segments.len() - 1].to_vec(),
            })
        } else {
            None
        }
    }

    /// Unqualified single-segment names matching a runtime built-in are
    /// excluded from dependency tracking.
    pub fn is_builtin(&self) -> bool {
        self.segments.len() == 1 && BUILTIN_NAMES.contains(&self.segments[0].as_str())
    }

    /// Render for output text under the given policy.
    pub fn render(&self, policy: QNamePolicy) -> String {
        match policy {
            QNamePolicy::Dotted => self.segments.join("."),
            QNamePolicy::UnderscoreJoined => self.segments.join("_"),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for QName {
    fn from(dotted: &str) -> Self {
        Self::parse(dotted)
    }
}

/// Target-surface naming policy for flattened qualified names.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum QNamePolicy {
    /// `org.example.Button`
    #[default]
    Dotted,
    /// `org_example_Button`
    UnderscoreJoined,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_simple_name() {
        let q = QName::parse("org.example.Button");
        assert_eq!(q.segments().len(), 3);
        assert_eq!(q.simple_name(), "Button");
        assert_eq!(q.namespace(), Some(QName::parse("org.example")));
        assert_eq!(QName::parse("Button").namespace(), None);
    }

    #[test]
    fn test_render_policies() {
        let q = QName::parse("org.example.Button");
        assert_eq!(q.render(QNamePolicy::Dotted), "org.example.Button");
        assert_eq!(q.render(QNamePolicy::UnderscoreJoined), "org_example_Button");
    }

    #[test]
    fn test_builtins() {
        assert!(QName::parse("String").is_builtin());
        assert!(QName::parse("*").is_builtin());
        assert!(!QName::parse("org.example.String").is_builtin());
        assert!(!QName::parse("Sprite").is_builtin());
    }
}
