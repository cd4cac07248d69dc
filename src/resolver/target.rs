//! Target expression normalization
//!
//! Adapters hand over the target of a usage as written at the use site.
//! Before lookup it is reduced to a plain dotted path: call parentheses and
//! type arguments are dropped, and `::`, `->`, `?.` and `!.` become member
//! separators.

use regex::Regex;
use std::sync::LazyLock;

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*(::|->|\?\.|!\.|\.)\s*").unwrap_or_else(|_| unreachable!())
});

/// A usage target split into path segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPath {
    pub raw: String,
    pub segments: Vec<String>,
}

impl TargetPath {
    pub fn parse(raw: &str) -> Self {
        let stripped = strip_groups(raw);
        let dotted = SEPARATORS.replace_all(&stripped, ".");
        let segments = dotted
            .split('.')
            .map(|s| s.trim().trim_end_matches(['!', '?']))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The identifier lookup starts from
    pub fn root(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// Segments after the root (member accesses)
    pub fn members(&self) -> &[String] {
        self.segments.get(1..).unwrap_or(&[])
    }
}

/// Drop balanced `(...)`, `<...>` and `[...]` groups
fn strip_groups(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut depth = 0usize;
    for c in raw.chars() {
        match c {
            '(' | '<' | '[' => depth += 1,
            ')' | '>' | ']' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Extract the simple name from a potentially qualified name
/// e.g., "self.method" → "method", "module.func" → "func"
pub fn simple_name(name: &str) -> String {
    TargetPath::parse(name)
        .segments
        .last()
        .cloned()
        .unwrap_or_else(|| name.to_string())
}

/// Extract the receiver from a qualified name
/// e.g., "self.method" → Some("self"), "func" → None
pub fn receiver(name: &str) -> Option<String> {
    let path = TargetPath::parse(name);
    if path.segments.len() > 1 {
        path.root().map(str::to_string)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_name() {
        assert_eq!(simple_name("func"), "func");
        assert_eq!(simple_name("self.method"), "method");
        assert_eq!(simple_name("module.submodule.func"), "func");
    }

    #[test]
    fn test_extract_receiver() {
        assert_eq!(receiver("func"), None);
        assert_eq!(receiver("self.method"), Some("self".to_string()));
        assert_eq!(receiver("obj.method"), Some("obj".to_string()));
    }

    #[test]
    fn test_normalize_call_chains() {
        let path = TargetPath::parse("person.GetFullName()");
        assert_eq!(path.segments, vec!["person", "GetFullName"]);

        let path = TargetPath::parse("factory().build<Widget>().run");
        assert_eq!(path.segments, vec!["factory", "build", "run"]);

        let path = TargetPath::parse("std::collections::HashMap::new");
        assert_eq!(path.root(), Some("std"));
        assert_eq!(path.members().len(), 3);

        let path = TargetPath::parse("user?.profile!.name");
        assert_eq!(path.segments, vec!["user", "profile", "name"]);
    }

    #[test]
    fn test_empty_target() {
        assert!(TargetPath::parse("()").is_empty());
        assert!(TargetPath::parse("").members().is_empty());
    }
}
