use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Engine settings, usually read from `symgraph.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Project name; part of every symbol id and the name of root packages
    pub project: String,
    /// Worker threads for adaptation and resolution (0 = one per core)
    pub threads: usize,
    pub resolution: ResolutionConfig,
    pub cycles: CycleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Narrow overload sets by the call's argument count
    pub arity_overloads: bool,
    /// Unmatched member accesses (`Console.WriteLine`) in a file with an open
    /// import of an unanalyzed unit are classified as external instead of not
    /// found; bare names stay not found
    pub open_imports_are_external: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Report a symbol calling itself as a cycle
    pub include_self_loops: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            project: "project".to_string(),
            threads: 0,
            resolution: ResolutionConfig::default(),
            cycles: CycleConfig::default(),
        }
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            arity_overloads: true,
            open_imports_are_external: true,
        }
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            include_self_loops: true,
        }
    }
}

impl EngineConfig {
    pub fn for_project(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            ..Self::default()
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("symgraph.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<EngineConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: EngineConfig = toml::from_str(&contents)?;
    if config.project.trim().is_empty() {
        anyhow::bail!("config at {} has an empty project name", path.display());
    }
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &EngineConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
