//! TOML-based configuration persistence for the bridge.
//!
//! Reads and writes `HidirtConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\hidirt\hidirt.toml`
//! - Linux:    `~/.config/hidirt/hidirt.toml`
//! - macOS:    `~/Library/Application Support/hidirt/hidirt.toml`
//!
//! The command line may point at another file with `--config`.
//!
//! # File layout
//!
//! ```toml
//! name = "hidirt.toml"
//!
//! [settings]
//! send_keys = true
//! start_apps = false
//!
//! [device]
//! vendor_id = 0x0483
//! product_id = 0x6611
//!
//! [[mappings]]
//! description = "open a terminal"
//! ir_protocol = 0x01
//! ir_address = 0x02
//! ir_command = 0x03
//! key = "ctrl+alt+t"
//! ```
//!
//! # Serde default values
//!
//! Every field carries a serde default, so a file that only lists mappings
//! (or an older file missing newer sections) still loads.
//!
//! # First run
//!
//! When the file does not exist, [`load_or_create_config`] writes a default
//! file with two placeholder mappings for the user to edit and continues with
//! those defaults.  The placeholders are harmless: both action switches are
//! off by default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use hidirt_core::{MappingRule, Settings};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// File name of the configuration inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "hidirt.toml";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The TOML parsed but a value is out of range.
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HidirtConfig {
    /// Informational name of the file.
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub mappings: Vec<MappingRule>,
}

/// USB identifiers and timing of the transceiver.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceConfig {
    #[serde(default = "default_vendor_id")]
    pub vendor_id: u16,
    #[serde(default = "default_product_id")]
    pub product_id: u16,
    /// Pause between interrupt reads in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Pause between reconnection attempts in milliseconds.
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
}

impl DeviceConfig {
    /// Checks the timing values.  Neither interval may be zero.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "device.poll_interval_ms",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.reconnect_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "device.reconnect_interval_ms",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_name() -> String {
    CONFIG_FILE_NAME.to_string()
}
fn default_vendor_id() -> u16 {
    0x0483
}
fn default_product_id() -> u16 {
    0x6611
}
fn default_poll_interval_ms() -> u64 {
    25
}
fn default_reconnect_interval_ms() -> u64 {
    500
}

impl Default for HidirtConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            settings: Settings::default(),
            device: DeviceConfig::default(),
            mappings: Vec::new(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            vendor_id: default_vendor_id(),
            product_id: default_product_id(),
            poll_interval_ms: default_poll_interval_ms(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
        }
    }
}

impl HidirtConfig {
    /// The configuration written on first run: default settings plus two
    /// placeholder mappings showing every field.
    pub fn with_example_mappings() -> Self {
        let example = |description: &str, base: i64, other: &str| MappingRule {
            description: description.to_string(),
            ir_protocol: Some(base + 0x01),
            ir_address: Some(base + 0x02),
            ir_command: Some(base + 0x03),
            key_sequence: Some(format!("# {other}key or key sequence to be sent")),
            application: Some(format!("# path to {other}application to be started")),
            parameter: Some(format!("# parameter for the {other}application")),
        };
        Self {
            mappings: vec![
                example("any helpful name", 0x00, ""),
                example("another helpful name", 0x10, "another "),
            ],
            ..Self::default()
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Loads the config at `path`.
///
/// Returns `Ok(None)` if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// [`ConfigError::Parse`] if the TOML is malformed and
/// [`ConfigError::Invalid`] if a value is out of range.
pub fn load_config(path: &Path) -> Result<Option<HidirtConfig>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let config: HidirtConfig = toml::from_str(&content)?;
            config.device.validate()?;
            Ok(Some(config))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Loads the config at `path`, writing a default file first if none exists.
///
/// A default file that cannot be written is logged; the defaults are still
/// returned.
///
/// # Errors
///
/// Same as [`load_config`].
pub fn load_or_create_config(path: &Path) -> Result<HidirtConfig, ConfigError> {
    if let Some(config) = load_config(path)? {
        info!("loaded {} mappings from {}", config.mappings.len(), path.display());
        return Ok(config);
    }

    let config = HidirtConfig::with_example_mappings();
    match save_config(&config, path) {
        Ok(()) => info!(
            "no configuration found; wrote a default one to {}, edit it and restart",
            path.display()
        ),
        Err(e) => warn!("no configuration found and writing a default one failed: {e}"),
    }
    Ok(config)
}

/// Persists `config` to `path`.
///
/// Creates the parent directory if it does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &HidirtConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config base directory including the `hidirt`
/// subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("hidirt"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("hidirt"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join("Library").join("Application Support").join("hidirt"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
