//! Symbol ids - global, stable identity for every node
//!
//! Format: `sym:<32 lowercase hex digits>`
//!
//! The id is a truncated blake3 digest of the declaration's identity key:
//! project, language, kind, qualified name and (for callables) arity. The
//! declaring file is deliberately left out so partial declarations merge and
//! an unchanged declaration keeps its id across rebuilds.

use crate::{Error, Result};
use crate::language::Language;
use crate::name::QualifiedName;
use crate::symbol::SymbolKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const PREFIX: &str = "sym:";

/// Opaque identifier of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId([u8; 16]);

impl SymbolId {
    /// Derive the id of a declaration from its identity key
    pub fn derive(
        project: &str,
        language: Language,
        kind: SymbolKind,
        qualified_name: &QualifiedName,
        arity: Option<u32>,
    ) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(project.as_bytes());
        hasher.update(&[0]);
        hasher.update(language.as_str().as_bytes());
        hasher.update(&[0]);
        hasher.update(kind.as_str().as_bytes());
        hasher.update(&[0]);
        for segment in qualified_name.segments() {
            hasher.update(segment.as_bytes());
            hasher.update(&[1]);
        }
        if let Some(arity) = arity {
            hasher.update(&[0]);
            hasher.update(&arity.to_le_bytes());
        }

        let digest = hasher.finalize();
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest.as_bytes()[..16]);
        Self(bytes)
    }

    /// Parse an id string
    ///
    /// Expected format: `sym:<32 hex digits>`
    pub fn parse(s: &str) -> Result<Self> {
        let hex = s
            .strip_prefix(PREFIX)
            .ok_or_else(|| Error::InvalidId(format!("id must start with {}: {}", PREFIX, s)))?;

        if hex.len() != 32 || !hex.is_ascii() {
            return Err(Error::InvalidId(format!("id must carry 32 hex digits: {}", s)));
        }

        let mut bytes = [0u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|_| Error::InvalidId(format!("invalid hex in id: {}", s)))?;
        }
        Ok(Self(bytes))
    }

    /// Convert to the id string
    pub fn to_id_string(&self) -> String {
        let mut out = String::with_capacity(PREFIX.len() + 32);
        out.push_str(PREFIX);
        for byte in self.0 {
            out.push_str(&format!("{:02x}", byte));
        }
        out
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_id_string())
    }
}

impl FromStr for SymbolId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for SymbolId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_id_string())
    }
}

impl<'de> Deserialize<'de> for SymbolId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SymbolId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person_id(arity: Option<u32>) -> SymbolId {
        SymbolId::derive(
            "MyApp",
            Language::CSharp,
            SymbolKind::Method,
            &QualifiedName::parse("MyApp.Models.Person.GetFullName"),
            arity,
        )
    }

    #[test]
    fn test_id_is_stable() {
        assert_eq!(person_id(Some(0)), person_id(Some(0)));
    }

    #[test]
    fn test_arity_distinguishes_overloads() {
        assert_ne!(person_id(Some(0)), person_id(Some(1)));
        assert_ne!(person_id(None), person_id(Some(0)));
    }

    #[test]
    fn test_id_parse() {
        let id = person_id(None);
        let s = id.to_id_string();
        assert!(s.starts_with("sym:"));
        assert_eq!(s.len(), 36);
        assert_eq!(SymbolId::parse(&s).unwrap(), id);
    }

    #[test]
    fn test_invalid_id() {
        assert!(SymbolId::parse("invalid").is_err());
        assert!(SymbolId::parse("sym:1234").is_err());
        assert!(SymbolId::parse("sym:zz000000000000000000000000000000").is_err());
    }
}
