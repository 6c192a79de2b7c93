use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error_handler::{LaunchError, Result};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "launch.toml";

/// Per-network settings from the config file. Both fields are optional so a
/// file can adjust a single value of a built-in network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkSettings {
    pub url: Option<String>,
    pub gas_price: Option<u64>,
}

/// Project configuration, read from `launch.toml`.
///
/// The deployer mnemonic is **never** part of this file. Only the name of the
/// environment variable that holds it is configured here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Network used when a command does not name one.
    pub default_network: String,
    /// Environment variable holding the HD wallet mnemonic.
    pub mnemonic_env: String,
    /// Solidity compiler version the artifacts were built with.
    pub compiler: String,
    /// Hardhat artifacts directory.
    pub artifacts_dir: PathBuf,
    /// Where exported deployment plans are written.
    pub deployments_dir: PathBuf,
    pub log_level: String,
    /// Overrides and additions to the built-in network table.
    pub networks: BTreeMap<String, NetworkSettings>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            default_network: "base-local".into(),
            mnemonic_env: "WALLET_KEY".into(),
            compiler: "0.8.24".into(),
            artifacts_dir: PathBuf::from("artifacts"),
            deployments_dir: PathBuf::from("deployments"),
            log_level: "info".into(),
            networks: BTreeMap::new(),
        }
    }
}

impl LaunchConfig {
    /// Returns the per-user state directory: `~/.fairlaunch/`
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| LaunchError::Config("could not determine home directory".into()))?;
        Ok(home.join(".fairlaunch"))
    }

    /// Returns the logs directory: `~/.fairlaunch/logs/`
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("logs"))
    }

    /// Load config from a specific file path. A missing file yields the
    /// defaults; an unreadable or malformed file is an error.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| LaunchError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| LaunchError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!(
            path = %path.display(),
            networks = config.networks.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// Save config to a specific file path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| LaunchError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        info!(path = %path.display(), "config written");
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.default_network.trim().is_empty() {
            return Err(LaunchError::Config("default_network must not be empty".into()));
        }
        if self.mnemonic_env.trim().is_empty() {
            return Err(LaunchError::Config("mnemonic_env must not be empty".into()));
        }
        if let Some(id) = self.networks.keys().find(|id| id.trim().is_empty()) {
            return Err(LaunchError::Config(format!("invalid network identifier `{id}`")));
        }
        Ok(())
    }
}
