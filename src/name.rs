//! Qualified names
//!
//! A qualified name is the scope-prefixed path of a symbol, unique within its
//! language and project. Input may use `.`, `/` or `::` as separators; the
//! canonical display form is dot-joined.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Ordered path segments, outermost first.
///
/// The empty name denotes a project root.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QualifiedName {
    segments: Vec<String>,
}

impl QualifiedName {
    /// The empty (root) name
    pub fn root() -> Self {
        Self::default()
    }

    /// Build from already-split segments, dropping empty ones
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments
                .into_iter()
                .map(|s| -> String { s.into() })
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Parse a dotted, slashed or `::`-separated path
    pub fn parse(path: &str) -> Self {
        Self::from_segments(path.split("::").flat_map(|part| part.split(['.', '/'])))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The innermost segment (the local name)
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The enclosing scope, `None` for the root
    pub fn parent(&self) -> Option<QualifiedName> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Append one segment
    pub fn child(&self, name: &str) -> QualifiedName {
        let mut segments = self.segments.clone();
        segments.extend(Self::parse(name).segments);
        Self { segments }
    }

    /// Append another qualified name
    pub fn join(&self, other: &QualifiedName) -> QualifiedName {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// The first `len` segments
    pub fn prefix(&self, len: usize) -> QualifiedName {
        Self {
            segments: self.segments[..len.min(self.segments.len())].to_vec(),
        }
    }

    pub fn starts_with(&self, other: &QualifiedName) -> bool {
        self.segments.starts_with(&other.segments)
    }

    /// All prefixes from the full name down to (and including) the root,
    /// innermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = QualifiedName> + '_ {
        (0..=self.segments.len()).rev().map(move |len| self.prefix(len))
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for QualifiedName {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl Serialize for QualifiedName {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for QualifiedName {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(QualifiedName::parse(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_separators() {
        assert_eq!(QualifiedName::parse("MyApp.Models.Person").len(), 3);
        assert_eq!(QualifiedName::parse("src/services/service").len(), 3);
        assert_eq!(QualifiedName::parse("crate::graph::Graph").to_string(), "crate.graph.Graph");
        assert!(QualifiedName::parse("").is_root());
    }

    #[test]
    fn test_parent_and_child() {
        let name = QualifiedName::parse("MyApp.Models.Person");
        assert_eq!(name.last(), Some("Person"));
        assert_eq!(name.parent().unwrap().to_string(), "MyApp.Models");
        assert_eq!(name.child("GetFullName").to_string(), "MyApp.Models.Person.GetFullName");
        assert_eq!(QualifiedName::root().parent(), None);
    }

    #[test]
    fn test_ancestors_innermost_first() {
        let name = QualifiedName::parse("a.b.c");
        let chain: Vec<String> = name.ancestors().map(|n| n.to_string()).collect();
        assert_eq!(chain, vec!["a.b.c", "a.b", "a", ""]);
    }
}
