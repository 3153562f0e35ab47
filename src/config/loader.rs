//! Config-file loading for the binary, with precedence handling.
//!
//! Precedence, lowest to highest: built-in defaults → TOML config file →
//! environment variables → CLI arguments. The library never reads any of
//! these; instances take an explicit [`LayoutOptions`].

use crate::config::{LayoutOptions, PartialOptions};
use crate::model::ThresholdOverrides;
use crate::style::DefaultsTable;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read an explicitly named config file.
    #[error("failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML.
    #[error("invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional; absent fields fall back to the defaults.
/// Lives at `~/.config/colonnade/config.toml` unless `--config` names
/// another path.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Path to the log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Item selector for tracked children.
    #[serde(default)]
    pub item_selector: Option<String>,

    /// Debounce delay for resize/media triggers, milliseconds.
    #[serde(default)]
    pub debounce_ms: Option<u64>,

    /// Transition duration hint, milliseconds.
    #[serde(default)]
    pub transition_ms: Option<u64>,

    /// Discovery attribute name.
    #[serde(default)]
    pub discovery_attr: Option<String>,

    /// Discovery attribute value.
    #[serde(default)]
    pub discovery_value: Option<String>,

    /// Breakpoint threshold overrides.
    #[serde(default)]
    pub thresholds: Option<ThresholdOverrides>,

    /// Style-resolver default table overrides.
    #[serde(default)]
    pub defaults: Option<DefaultsTable>,
}

/// Fully resolved application configuration for the binary.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Where tracing output goes.
    pub log_file_path: PathBuf,
    /// Options handed to every constructed instance.
    pub options: LayoutOptions,
}

/// Load a config file, explicit path first, default location second.
///
/// An explicit path that cannot be read or parsed is an error; a missing
/// file at the default location is not (returns `Ok(None)`).
pub fn load_config_with_precedence(
    explicit: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    let (path, must_exist) = match explicit {
        Some(path) => (path, true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return Ok(None),
        },
    };

    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if must_exist => {
            return Err(ConfigError::ReadError {
                path,
                reason: err.to_string(),
            });
        }
        Err(_) => {
            debug!(path = %path.display(), "no config file at default location");
            return Ok(None);
        }
    };

    let parsed: ConfigFile = toml::from_str(&contents).map_err(|err| ConfigError::ParseError {
        path: path.clone(),
        reason: err.to_string(),
    })?;
    debug!(path = %path.display(), "loaded config file");
    Ok(Some(parsed))
}

/// Merge a loaded config file (or none) with the built-in defaults.
pub fn merge_config(file: Option<ConfigFile>) -> AppConfig {
    let file = file.unwrap_or_default();
    let options = LayoutOptions::merged(PartialOptions {
        item_selector: file.item_selector,
        transition_ms: file.transition_ms,
        debounce_ms: file.debounce_ms,
        thresholds: file.thresholds,
        discovery_attr: file.discovery_attr,
        discovery_value: file.discovery_value,
        defaults: file.defaults,
    });
    AppConfig {
        log_file_path: file.log_file_path.unwrap_or_else(default_log_path),
        options,
    }
}

/// Apply environment variable overrides on top of a merged config.
///
/// Recognized: `COLONNADE_LOG_FILE`, `COLONNADE_DEBOUNCE_MS`,
/// `COLONNADE_ITEM_SELECTOR`. Unparsable numeric values are ignored.
pub fn apply_env_overrides(mut config: AppConfig) -> AppConfig {
    if let Ok(path) = std::env::var("COLONNADE_LOG_FILE") {
        if !path.is_empty() {
            config.log_file_path = PathBuf::from(path);
        }
    }
    if let Ok(raw) = std::env::var("COLONNADE_DEBOUNCE_MS") {
        if let Ok(ms) = raw.parse::<u64>() {
            config.options.debounce_ms = ms;
        }
    }
    if let Ok(selector) = std::env::var("COLONNADE_ITEM_SELECTOR") {
        if !selector.is_empty() {
            config.options.item_selector = selector;
        }
    }
    config
}

/// Apply CLI argument overrides, the highest-precedence layer.
pub fn apply_cli_overrides(
    mut config: AppConfig,
    log_file: Option<PathBuf>,
    debounce_ms: Option<u64>,
) -> AppConfig {
    if let Some(path) = log_file {
        config.log_file_path = path;
    }
    if let Some(ms) = debounce_ms {
        config.options.debounce_ms = ms;
    }
    config
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("colonnade").join("config.toml"))
}

fn default_log_path() -> PathBuf {
    dirs::state_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("colonnade")
        .join("colonnade.log")
}
