//! Bootstrap configuration loading and config file resolution
//!
//! Resolution priority for the config file path:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Platform config directory (`<config_dir>/moodlens/moodlens.toml`)
//!
//! A missing config file is not an error: a warning is logged and the
//! compiled defaults are used. A file that exists but does not parse is.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "MOODLENS_CONFIG";

/// Bootstrap configuration loaded from TOML file
///
/// Read once at startup. Live-loop settings seeded from `[live]` can be
/// changed at runtime through the control API; everything else requires
/// a restart.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TomlConfig {
    /// HTTP control server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Classifier endpoint used by the live loop
    #[serde(default = "default_classifier_url")]
    pub classifier_url: String,

    /// Classifier endpoint used by one-shot snapshot capture
    #[serde(default = "default_snapshot_url")]
    pub snapshot_url: String,

    /// Where the capture device drops encoded stills (file or directory)
    #[serde(default)]
    pub frame_path: Option<PathBuf>,

    /// Upper bound on a single classifier exchange
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Initial live-loop settings
    #[serde(default)]
    pub live: LiveSection,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[live]` table: initial cadence and gating settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LiveSection {
    /// Base delay between live inferences (ms)
    #[serde(default = "default_base_interval_ms")]
    pub base_interval_ms: u64,

    /// Adapt the delay to observed confidence
    #[serde(default = "default_true")]
    pub adaptive: bool,

    /// Commit gated moods to the recommendation consumer automatically
    #[serde(default = "default_true")]
    pub auto_apply: bool,

    /// Minimum raw confidence for auto-commit (0.35-0.90)
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_port() -> u16 {
    5731
}

fn default_classifier_url() -> String {
    "http://127.0.0.1:5000/api/camera/analyze".to_string()
}

fn default_snapshot_url() -> String {
    "http://127.0.0.1:5000/api/camera".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_base_interval_ms() -> u64 {
    1500
}

fn default_min_confidence() -> f64 {
    0.55
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            classifier_url: default_classifier_url(),
            snapshot_url: default_snapshot_url(),
            frame_path: None,
            request_timeout_ms: default_request_timeout_ms(),
            live: LiveSection::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LiveSection {
    fn default() -> Self {
        Self {
            base_interval_ms: default_base_interval_ms(),
            adaptive: true,
            auto_apply: true,
            min_confidence: default_min_confidence(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Resolve which config file to read, if any
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory, only if the file is there
    dirs::config_dir()
        .map(|d| d.join("moodlens").join("moodlens.toml"))
        .filter(|p| p.exists())
}

/// Load the bootstrap config, falling back to defaults when absent
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        info!("No config file found, using built-in defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(
            "Config file {} not found, using built-in defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}
