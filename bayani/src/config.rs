//! Daemon and CLI configuration.
//!
//! ```ron
//! (
//!     rules: (
//!         same_day: (fee: 150, free_threshold: 1000),
//!         cycle: (delivery_day: "Sat", delivery_time: "10:00:00"),
//!     ),
//!     clock: (utc_offset_minutes: 480),
//!     countdown: (tick_interval_ms: 1000),
//! )
//! ```

use std::path::{Path, PathBuf};

use bayani_common::clock::{ClockConfig, ClockError};
use bayani_delivery::{ConfigError, CountdownConfig, DeliveryRules};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "BAYANI_CONFIG";

/// Searched in order when [`CONFIG_ENV`] is unset.
pub const DEFAULT_CONFIG_PATHS: [&str; 2] =
    ["./bayani.config.ron", "/etc/bayani/bayani.config.ron"];

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("BAYANI_CONFIG points to non-existent file: {}", .0.display())]
    MissingOverride(PathBuf),

    #[error("No configuration file found. Tried:\n  - BAYANI_CONFIG environment variable\n{tried}")]
    NotFound { tried: String },

    #[error("Failed to read config from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config from {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },

    #[error(transparent)]
    Rules(#[from] ConfigError),

    #[error(transparent)]
    Clock(#[from] ClockError),
}

/// Everything the daemon and `bayanictl` can be configured with. Every
/// section is optional; an empty `()` file runs with the stock rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rules: DeliveryRules,

    #[serde(default)]
    pub clock: ClockConfig,

    #[serde(default)]
    pub countdown: CountdownConfig,
}

impl Config {
    /// Read and parse a RON config file.
    ///
    /// # Errors
    ///
    /// If the file can't be read or is not a valid config.
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        ron::from_str(&content).map_err(|source| ConfigFileError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// # Errors
    ///
    /// The first inconsistency found in the rules, clock or countdown settings.
    pub fn validate(&self) -> Result<(), ConfigFileError> {
        self.rules.validate()?;
        self.clock.offset()?;
        self.countdown.tick_interval()?;
        Ok(())
    }
}

/// Find the configuration file using the following precedence:
/// 1. `BAYANI_CONFIG` environment variable
/// 2. ./bayani.config.ron (current working directory)
/// 3. /etc/bayani/bayani.config.ron (system-wide config)
///
/// # Errors
///
/// If `BAYANI_CONFIG` names a missing file, or none of the defaults exist.
pub fn find_config_file() -> Result<PathBuf, ConfigFileError> {
    let candidates = DEFAULT_CONFIG_PATHS.map(PathBuf::from);
    locate(std::env::var_os(CONFIG_ENV).map(PathBuf::from), &candidates)
}

/// Lookup behind [`find_config_file`], with the override and candidates given.
///
/// # Errors
///
/// See [`find_config_file`].
pub fn locate(
    override_path: Option<PathBuf>,
    candidates: &[PathBuf],
) -> Result<PathBuf, ConfigFileError> {
    if let Some(path) = override_path {
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigFileError::MissingOverride(path));
    }

    if let Some(path) = candidates.iter().find(|path| path.exists()) {
        return Ok(path.clone());
    }

    let tried = candidates
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigFileError::NotFound { tried })
}
