//! Configuration management for appmake

pub mod schema;

pub use schema::{BundleConfig, CleanConfig, CleanFind, Config, LessConfig, OptimizeConfig, TemplatesConfig};

use crate::error::{AppmakeError, AppmakeResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Project config file name
pub const CONFIG_FILE_NAME: &str = "appmake.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Create a config manager for `appmake.toml` in `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::with_path(dir.join(CONFIG_FILE_NAME))
    }

    /// Walk up from `start` looking for `appmake.toml`
    pub fn find_project_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Load configuration, falling back to defaults if the file is missing
    pub async fn load(&self) -> AppmakeResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> AppmakeResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| AppmakeError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| AppmakeError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Directory relative paths in the config are resolved against
    pub fn project_dir(&self) -> &Path {
        self.config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }
}
