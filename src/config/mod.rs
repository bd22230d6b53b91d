//! Register configuration.
//!
//! Loaded from an optional `till.yaml` plus `TILL`-prefixed environment
//! variables. Every field has a default so a bare environment still runs.

use std::time::Duration;

use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "till.yaml";
/// Environment variable naming an alternate configuration file.
pub const CONFIG_ENV_VAR: &str = "TILL_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "TILL";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "TILL_LOG";

/// Errors from configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
}

/// Backend endpoint settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the POS backend.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 10,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Main register configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegisterConfig {
    /// Digit prefix marking scale-encoded barcodes. Empty disables scale
    /// decoding entirely.
    pub scale_prefix: String,
    /// Accept scanner input only; typed non-scale input is ignored.
    pub scanner_only_mode: bool,
    /// Quiet window before auto-processing typed input, in milliseconds.
    pub debounce_ms: u64,
    /// Backend endpoint settings.
    pub backend: BackendConfig,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            scale_prefix: String::new(),
            scanner_only_mode: false,
            debounce_ms: 500,
            backend: BackendConfig::default(),
        }
    }
}

impl RegisterConfig {
    /// Load configuration from file and environment.
    ///
    /// Sources in order of priority, later overrides earlier:
    /// 1. `till.yaml` in the current directory (if it exists)
    /// 2. File specified by the `path` argument (if provided)
    /// 3. File specified by `TILL_CONFIG` (if set)
    /// 4. Environment variables with the `TILL` prefix
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Initialize tracing with the `TILL_LOG` environment variable.
///
/// Defaults to "info" level if `TILL_LOG` is not set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_scale_decoding_disabled() {
        let config = RegisterConfig::default();
        assert!(config.scale_prefix.is_empty());
        assert!(!config.scanner_only_mode);
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert_eq!(config.backend.timeout(), Duration::from_secs(10));
    }
}
