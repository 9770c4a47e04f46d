//! CLI configuration, read from `sealdrive.toml`.

use anyhow::{Context, Result};
use sealdrive_drive::DriveConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "sealdrive.toml";

/// Top-level CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Directory holding `blobs/` and `records/`.
    pub data_dir: PathBuf,
    pub drive: DriveConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".sealdrive"),
            drive: DriveConfig::default(),
        }
    }
}

impl CliConfig {
    /// Loads the configuration.
    ///
    /// An explicit path must exist. Without one, a missing
    /// [`DEFAULT_CONFIG_FILE`] yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parses a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        Ok(config)
    }

    pub fn blob_dir(&self) -> PathBuf {
        self.data_dir.join("blobs")
    }

    pub fn record_dir(&self) -> PathBuf {
        self.data_dir.join("records")
    }
}
