use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "mongo-indexer.toml";

/// Project context for mongo-indexer operations
pub struct ProjectContext {
    /// Root directory of the project (where Cargo.toml is)
    pub project_root: PathBuf,
    /// Path to config file
    pub config_path: PathBuf,
    /// Loaded configuration (defaults when the file is absent)
    pub config: IndexerFileConfig,
}

/// Configuration stored in mongo-indexer.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexerFileConfig {
    #[serde(default)]
    pub scan: ScanSettings,
    #[serde(default)]
    pub mongodb: MongoSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSettings {
    #[serde(default = "default_scan_dirs")]
    pub dirs: Vec<String>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            dirs: default_scan_dirs(),
        }
    }
}

fn default_scan_dirs() -> Vec<String> {
    vec!["src".to_string(), "tests".to_string(), "examples".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSettings {
    #[serde(default = "default_mongodb_uri")]
    pub uri: String,
    #[serde(default)]
    pub database: Option<String>,
}

impl Default for MongoSettings {
    fn default() -> Self {
        Self {
            uri: default_mongodb_uri(),
            database: None,
        }
    }
}

fn default_mongodb_uri() -> String {
    "${MONGODB_URI}".to_string()
}

impl ProjectContext {
    /// Find and load project context from current directory or ancestors
    pub fn find() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::find_from(&current_dir)
    }

    /// Find project context starting from the given directory
    pub fn find_from(start: &Path) -> Result<Self> {
        let project_root = Self::find_project_root(start)?;
        Self::from_root(project_root)
    }

    /// Create context from a known project root
    pub fn from_root(project_root: PathBuf) -> Result<Self> {
        let config_path = project_root.join(CONFIG_FILE);

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {CONFIG_FILE}"))?;
            toml::from_str(&content).with_context(|| format!("Failed to parse {CONFIG_FILE}"))?
        } else {
            IndexerFileConfig::default()
        };

        Ok(Self {
            project_root,
            config_path,
            config,
        })
    }

    /// Find project root by looking for Cargo.toml
    fn find_project_root(start: &Path) -> Result<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join("Cargo.toml").exists() {
                return Ok(current);
            }

            if !current.pop() {
                anyhow::bail!(
                    "Could not find Cargo.toml in {start:?} or any parent directory. \
                     Are you in a Rust project?"
                );
            }
        }
    }

    /// Directories to scan, resolved against the project root
    pub fn scan_dirs(&self) -> Vec<PathBuf> {
        self.config
            .scan
            .dirs
            .iter()
            .map(|dir| self.project_root.join(dir))
            .collect()
    }

    /// Get the MongoDB URI, expanding environment variables
    #[cfg_attr(not(feature = "mongodb"), allow(dead_code))]
    pub fn mongodb_uri(&self) -> Result<String> {
        expand_env(&self.config.mongodb.uri)
    }
}

/// Expand a `${VAR}` value from the environment; other values pass through.
pub fn expand_env(value: &str) -> Result<String> {
    if let Some(var_name) = value.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
        std::env::var(var_name).with_context(|| format!("Environment variable {var_name} not set"))
    } else {
        Ok(value.to_string())
    }
}
