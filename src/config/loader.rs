//! Configuration file loading with precedence handling.

use crate::source::FormatChoice;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "D20STATS_CONFIG";
/// Environment variable enabling the roll trace (`1`/`true`/`yes`/`on`).
pub const DEBUG_ENV_VAR: &str = "D20STATS_DEBUG";
/// Environment variable forcing the archive format.
pub const FORMAT_ENV_VAR: &str = "D20STATS_FORMAT";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment override holds a value that cannot be used.
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue {
        /// Variable name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Failed to read config file (permission issues, not a file).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/d20stats/config.toml`:
///
/// ```toml
/// debug = true
/// format = "base64"
/// log_file_path = "/tmp/d20stats.log"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Print every accepted d20 outcome to stderr.
    #[serde(default)]
    pub debug: Option<bool>,

    /// Archive encoding: "auto", "json" or "base64".
    #[serde(default)]
    pub format: Option<FormatChoice>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Roll trace enabled.
    pub debug: bool,
    /// Archive encoding choice.
    pub format: FormatChoice,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            debug: false,
            format: FormatChoice::Auto,
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/d20stats/d20stats.log` on Linux, or the
/// appropriate platform path elsewhere. Falls back to the current directory
/// if no state directory can be determined.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("d20stats").join("d20stats.log")
    } else {
        PathBuf::from("d20stats.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/d20stats/config.toml` on Linux, appropriate path on
/// other platforms, `None` if no config directory can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("d20stats").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `D20STATS_CONFIG` environment variable
/// 3. Default path `~/.config/d20stats/config.toml`
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        debug: config.debug.unwrap_or(defaults.debug),
        format: config.format.unwrap_or(defaults.format),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks `D20STATS_DEBUG` and `D20STATS_FORMAT`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a variable is set to something
/// unrecognized.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> Result<ResolvedConfig, ConfigError> {
    if let Ok(raw) = std::env::var(DEBUG_ENV_VAR) {
        config.debug = parse_flag(&raw).ok_or_else(|| ConfigError::InvalidValue {
            name: DEBUG_ENV_VAR,
            reason: format!("expected a boolean, got '{raw}'"),
        })?;
    }

    if let Ok(raw) = std::env::var(FORMAT_ENV_VAR) {
        config.format = raw
            .parse()
            .map_err(|reason| ConfigError::InvalidValue {
                name: FORMAT_ENV_VAR,
                reason,
            })?;
    }

    Ok(config)
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence. Only flags the user actually passed
/// are `Some`.
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    debug_override: Option<bool>,
    format_override: Option<FormatChoice>,
) -> ResolvedConfig {
    if let Some(debug) = debug_override {
        config.debug = debug;
    }

    if let Some(format) = format_override {
        config.format = format;
    }

    config
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
