//! Declared inter-unit dependencies
//!
//! Manifest loaders (Swift `Package.swift`, `Cargo.toml`, `package.json`,
//! `.csproj`, ...) are external collaborators; they hand the engine the list of
//! units and what each unit depends on. The engine uses it to seed `imports`
//! edges and to tell external dependencies apart from plain typos.

use crate::language::Language;
use crate::location::SourceLocation;
use crate::symbol::SymbolKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Kind of a manifest unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// A distributable package
    Package,
    /// A build target / module inside a package
    Module,
}

impl UnitKind {
    pub fn symbol_kind(&self) -> SymbolKind {
        match self {
            UnitKind::Package => SymbolKind::Package,
            UnitKind::Module => SymbolKind::Module,
        }
    }
}

/// One package or target declared by a manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestUnit {
    pub name: String,
    pub kind: UnitKind,
    /// Names of the units this one depends on
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Where the unit is declared inside the manifest
    pub location: SourceLocation,
}

impl ManifestUnit {
    pub fn module(name: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            name: name.into(),
            kind: UnitKind::Module,
            dependencies: Vec::new(),
            location,
        }
    }

    pub fn package(name: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            name: name.into(),
            kind: UnitKind::Package,
            dependencies: Vec::new(),
            location,
        }
    }

    pub fn depends_on<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(dependencies.into_iter().map(Into::into));
        self
    }
}

/// Dependency declarations of one manifest file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyManifest {
    /// Manifest path relative to the project root
    pub path: String,
    pub language: Language,
    #[serde(default)]
    pub units: Vec<ManifestUnit>,
}

impl DependencyManifest {
    pub fn new(path: impl Into<String>, language: Language) -> Self {
        Self {
            path: path.into(),
            language,
            units: Vec::new(),
        }
    }

    pub fn with_unit(mut self, unit: ManifestUnit) -> Self {
        self.units.push(unit);
        self
    }

    /// Every dependency name mentioned by any unit
    pub fn declared_dependencies(&self) -> BTreeSet<&str> {
        self.units
            .iter()
            .flat_map(|unit| unit.dependencies.iter().map(String::as_str))
            .collect()
    }

    /// Dependencies that no unit of this manifest provides
    pub fn foreign_dependencies(&self) -> BTreeSet<&str> {
        let provided: BTreeSet<&str> = self.units.iter().map(|u| u.name.as_str()).collect();
        self.declared_dependencies()
            .into_iter()
            .filter(|dep| !provided.contains(dep))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swift_package() -> DependencyManifest {
        let loc = |line| SourceLocation::new("Package.swift", line, 9);
        DependencyManifest::new("Package.swift", Language::Swift)
            .with_unit(ManifestUnit::module("MyApp", loc(12)).depends_on(["Utilities", "Other", "Alamofire"]))
            .with_unit(ManifestUnit::module("Utilities", loc(16)))
            .with_unit(ManifestUnit::module("Other", loc(20)))
            .with_unit(ManifestUnit::module("MyAppTests", loc(24)).depends_on(["MyApp"]))
    }

    #[test]
    fn test_declared_dependencies() {
        let manifest = swift_package();
        let deps = manifest.declared_dependencies();
        assert!(deps.contains("Utilities"));
        assert!(deps.contains("MyApp"));
        assert_eq!(deps.len(), 4);
    }

    #[test]
    fn test_foreign_dependencies() {
        let manifest = swift_package();
        let foreign: Vec<&str> = manifest.foreign_dependencies().into_iter().collect();
        assert_eq!(foreign, vec!["Alamofire"]);
    }

    #[test]
    fn test_manifest_from_json() {
        let json = r#"{
            "path": "Package.swift",
            "language": "swift",
            "units": [{"name": "MyApp", "kind": "module", "dependencies": ["Utilities"],
                       "location": {"file": "Package.swift", "line": 12, "column": 9}}]
        }"#;
        let manifest: DependencyManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.units[0].kind.symbol_kind(), SymbolKind::Module);
    }
}
