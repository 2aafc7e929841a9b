//! Configuration file loading with precedence handling.

use crate::state::{EvictionCaps, ListConfig, MediaPolicy};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CHATSCROLL_CONFIG";
/// Environment variable overriding the `insert_once` seed.
pub const SEED_ENV: &str = "CHATSCROLL_SEED";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path of the config file.
        path: PathBuf,
        /// Reason the read failed.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path of the config file.
        path: PathBuf,
        /// Reason the parse failed.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional; anything missing keeps its default.
/// Corresponds to `~/.config/chatscroll/config.toml`.
///
/// ```toml
/// bottom_tolerance = 10.0
/// media_max_width = 320.0
/// asset_timeout_frames = 120
/// max_messages = 500
/// seed = 42
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Distance from the bottom still treated as pinned.
    #[serde(default)]
    pub bottom_tolerance: Option<f64>,

    /// Allowed media ratio deviation, in percent.
    #[serde(default)]
    pub aspect_tolerance_percent: Option<f64>,

    /// Upper bound on media width in layout units.
    #[serde(default)]
    pub media_max_width: Option<f64>,

    /// Media width limit as a fraction of the container width.
    #[serde(default)]
    pub media_width_fraction: Option<f64>,

    /// Media height limit as a fraction of the container height.
    #[serde(default)]
    pub media_max_height_fraction: Option<f64>,

    /// Frames before an unanswered asset gets the fallback box.
    #[serde(default)]
    pub asset_timeout_frames: Option<u32>,

    /// Keep at most this many time headers.
    #[serde(default)]
    pub max_headers: Option<usize>,

    /// Keep at most this many messages.
    #[serde(default)]
    pub max_messages: Option<usize>,

    /// Seed for the random insertion generator.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Vertical gap between entries.
    #[serde(default)]
    pub row_gap: Option<f64>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Settings of the chat list.
    pub list: ListConfig,
    /// Where the TUI writes its log.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            list: ListConfig::default(),
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Tunables handed to the chat list.
    pub fn list_config(&self) -> ListConfig {
        self.list.clone()
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/chatscroll/chatscroll.log` on Linux, the
/// platform state directory elsewhere, or `chatscroll.log` in the current
/// directory if none can be determined.
pub fn default_log_path() -> PathBuf {
    match dirs::state_dir() {
        Some(state_dir) => state_dir.join("chatscroll").join("chatscroll.log"),
        None => PathBuf::from("chatscroll.log"),
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if the file doesn't exist (use defaults).
///
/// # Errors
///
/// Returns error if the file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

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
/// Returns `None` if the config directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chatscroll").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `CHATSCROLL_CONFIG` environment variable
/// 3. Default path `~/.config/chatscroll/config.toml`
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

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if env_path.trim().is_empty() {
            return Err(ConfigError::InvalidPath(format!("{CONFIG_ENV} is empty")));
        }
        return load_config_file(PathBuf::from(env_path));
    }

    match default_config_path() {
        Some(default_path) => load_config_file(default_path),
        None => Ok(None),
    }
}

/// Merge config file into defaults to create resolved config.
///
/// Non-finite or negative numbers in the file are ignored in favor of the
/// default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    let d = &defaults.list;
    let list = ListConfig {
        bottom_tolerance: non_negative(config.bottom_tolerance).unwrap_or(d.bottom_tolerance),
        aspect_tolerance_percent: non_negative(config.aspect_tolerance_percent)
            .unwrap_or(d.aspect_tolerance_percent),
        media: MediaPolicy {
            max_width: non_negative(config.media_max_width).unwrap_or(d.media.max_width),
            width_fraction: non_negative(config.media_width_fraction)
                .unwrap_or(d.media.width_fraction),
            max_height_fraction: non_negative(config.media_max_height_fraction)
                .unwrap_or(d.media.max_height_fraction),
        },
        asset_timeout_frames: config
            .asset_timeout_frames
            .filter(|frames| *frames > 0)
            .unwrap_or(d.asset_timeout_frames),
        caps: EvictionCaps {
            max_headers: config.max_headers.or(d.caps.max_headers),
            max_messages: config.max_messages.or(d.caps.max_messages),
        },
        seed: config.seed.unwrap_or(d.seed),
        row_gap: non_negative(config.row_gap).unwrap_or(d.row_gap),
    };

    ResolvedConfig {
        list,
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

fn non_negative(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `CHATSCROLL_SEED`: override the seed (ignored unless it parses as `u64`)
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Some(seed) = std::env::var(SEED_ENV)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
    {
        config.list.seed = seed;
    }

    config
}

/// Apply CLI argument overrides to resolved config.
///
/// Only flags that were explicitly set override.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    seed_override: Option<u64>,
    max_headers_override: Option<usize>,
    max_messages_override: Option<usize>,
) -> ResolvedConfig {
    if let Some(seed) = seed_override {
        config.list.seed = seed;
    }

    if let Some(max_headers) = max_headers_override {
        config.list.caps.max_headers = Some(max_headers);
    }

    if let Some(max_messages) = max_messages_override {
        config.list.caps.max_messages = Some(max_messages);
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;

#[cfg(test)]
mod log_path_tests {
    use super::*;

    #[test]
    fn default_log_path_ends_with_chatscroll_log() {
        let path = default_log_path();
        assert!(
            path.to_string_lossy().ends_with("chatscroll.log"),
            "Default log path should end with 'chatscroll.log', got: {:?}",
            path
        );
    }

    #[test]
    fn config_file_log_path_overrides_default() {
        let custom_path = PathBuf::from("/custom/path/to/app.log");
        let config_file = ConfigFile {
            log_file_path: Some(custom_path.clone()),
            ..ConfigFile::default()
        };

        let resolved = merge_config(Some(config_file));
        assert_eq!(resolved.log_file_path, custom_path);
    }

    #[test]
    fn missing_config_file_log_path_uses_default() {
        let resolved = merge_config(Some(ConfigFile::default()));
        assert_eq!(resolved.log_file_path, default_log_path());
    }
}
