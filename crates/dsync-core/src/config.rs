use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::copier::DEFAULT_BLOCK_SIZE;
use crate::wait::WaitPolicy;

/// Remote-size wait parameters (`[wait]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Seconds between size checks.
    pub poll_interval_secs: u64,
    /// Give up after this many seconds.
    pub max_wait_secs: u64,
    /// Optional cap on size checks (including the first).
    pub max_attempts: Option<u32>,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 10,
            max_wait_secs: 3600,
            max_attempts: None,
        }
    }
}

impl WaitConfig {
    pub fn policy(&self) -> WaitPolicy {
        WaitPolicy {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_wait: Duration::from_secs(self.max_wait_secs),
            max_attempts: self.max_attempts,
        }
    }
}

/// Global configuration loaded from `~/.config/dsync/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DsyncConfig {
    /// Copy block size in bytes.
    pub block_size: usize,
    /// Append completion records here instead of printing them.
    pub record_log: Option<PathBuf>,
    pub wait: WaitConfig,
}

impl Default for DsyncConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            record_log: None,
            wait: WaitConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dsync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<DsyncConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = DsyncConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg: DsyncConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
