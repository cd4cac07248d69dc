//! Language tags
//!
//! Every node, file and usage carries the tag of the language that produced
//! it. The core only branches on it to pick a scope strategy.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Source languages known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    CSharp,
    Swift,
    TypeScript,
    JavaScript,
    Python,
    Java,
    Go,
    Rust,
}

impl Language {
    /// Get the string representation of the language
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::CSharp => "csharp",
            Language::Swift => "swift",
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Go => "go",
            Language::Rust => "rust",
        }
    }

    /// Get all languages
    pub fn all() -> &'static [Language] {
        &[
            Language::CSharp,
            Language::Swift,
            Language::TypeScript,
            Language::JavaScript,
            Language::Python,
            Language::Java,
            Language::Go,
            Language::Rust,
        ]
    }

    /// Guess the language from a file extension (without the dot)
    pub fn from_extension(ext: &str) -> Option<Language> {
        match ext {
            "cs" => Some(Language::CSharp),
            "swift" => Some(Language::Swift),
            "ts" | "tsx" | "mts" | "cts" => Some(Language::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "py" | "pyi" => Some(Language::Python),
            "java" => Some(Language::Java),
            "go" => Some(Language::Go),
            "rs" => Some(Language::Rust),
            _ => None,
        }
    }

    /// Guess the language from a path
    pub fn from_path(path: &str) -> Option<Language> {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        let (_, ext) = file_name.rsplit_once('.')?;
        Self::from_extension(ext)
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csharp" | "c#" | "cs" | "c-sharp" => Ok(Language::CSharp),
            "swift" => Ok(Language::Swift),
            "typescript" | "ts" => Ok(Language::TypeScript),
            "javascript" | "js" => Ok(Language::JavaScript),
            "python" | "py" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            "go" | "golang" => Ok(Language::Go),
            "rust" | "rs" => Ok(Language::Rust),
            _ => Err(Error::InvalidKind(format!("Unknown language: {}", s))),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_roundtrip() {
        for language in Language::all() {
            let parsed: Language = language.as_str().parse().unwrap();
            assert_eq!(*language, parsed);
        }
    }

    #[test]
    fn test_language_aliases() {
        assert_eq!(Language::from_str("c#").unwrap(), Language::CSharp);
        assert_eq!(Language::from_str("TS").unwrap(), Language::TypeScript);
        assert!(Language::from_str("cobol").is_err());
    }

    #[test]
    fn test_from_path() {
        assert_eq!(Language::from_path("MyApp/Models/Person.cs"), Some(Language::CSharp));
        assert_eq!(Language::from_path("src/services/service.ts"), Some(Language::TypeScript));
        assert_eq!(Language::from_path("Makefile"), None);
    }
}
