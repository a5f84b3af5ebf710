//! Shared configuration for the verification bridge
//!
//! Configuration is loaded from a JSON file named by the
//! `VERIFY_BRIDGE_CONFIG` environment variable, or taken from defaults when
//! the variable is unset. Suites force initialization before their first
//! test so every check in a run sees the same settings.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::build_mode::BuildMode;
use crate::error::{log_bridge_error, BridgeError};

/// Environment variable naming the JSON config file.
pub const CONFIG_ENV_VAR: &str = "VERIFY_BRIDGE_CONFIG";

static CONFIG: OnceCell<BridgeConfig> = OnceCell::new();

/// Complete bridge configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub verify: VerifyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Verification dispatch settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Forces the failure policy regardless of the compilation profile
    #[serde(default)]
    pub build_mode: Option<BuildMode>,
}

/// Logging and trace settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Maximum level for the test subscriber (`error` .. `trace`)
    #[serde(default = "default_level")]
    pub level: String,
    /// Emit enter/leave records around traced test bodies
    #[serde(default = "default_trace_enter_leave")]
    pub trace_enter_leave: bool,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_trace_enter_leave() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            trace_enter_leave: default_trace_enter_leave(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a JSON file
    ///
    /// # Returns
    /// * `Ok(BridgeConfig)` - Loaded configuration
    /// * `Err(BridgeError::ConfigRead)` - File missing or unreadable
    /// * `Err(BridgeError::ConfigParse)` - Contents are not a valid config
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, BridgeError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| BridgeError::ConfigRead {
            path: path.to_path_buf(),
            details: err.to_string(),
        })?;
        let config = serde_json::from_str(&contents).map_err(|err| BridgeError::ConfigParse {
            path: path.to_path_buf(),
            details: err.to_string(),
        })?;
        log::info!("[Config] Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load configuration from `VERIFY_BRIDGE_CONFIG`, or defaults if unset.
    pub fn load() -> Result<Self, BridgeError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load_from_file(path),
            None => {
                log::info!("[Config] {} not set. Using defaults.", CONFIG_ENV_VAR);
                Ok(Self::default())
            }
        }
    }
}

/// Initialize the process-wide configuration if it is not already.
///
/// Idempotent: once a load succeeds every later call returns the same
/// instance. A failed load is not cached, so the next call retries.
pub fn ensure_initialized() -> Result<&'static BridgeConfig, BridgeError> {
    CONFIG.get_or_try_init(|| {
        BridgeConfig::load().map_err(|err| {
            log_bridge_error(&err, "ensure_initialized");
            err
        })
    })
}

/// The initialized configuration, or defaults when initialization has not
/// happened or cannot succeed.
pub fn current() -> BridgeConfig {
    match ensure_initialized() {
        Ok(config) => config.clone(),
        Err(_) => {
            log::warn!("[Config] Falling back to default configuration");
            BridgeConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "verify-bridge-{}-{}.json",
            name,
            std::process::id()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.verify.build_mode, None);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.trace_enter_leave);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let path = temp_config("partial", r#"{ "verify": { "build_mode": "release" } }"#);
        let config = BridgeConfig::load_from_file(&path).unwrap();
        assert_eq!(config.verify.build_mode, Some(BuildMode::Release));
        assert_eq!(config.logging, LoggingConfig::default());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = BridgeConfig::load_from_file("/nonexistent/verify-bridge.json").unwrap_err();
        assert!(matches!(err, BridgeError::ConfigRead { .. }));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let path = temp_config("invalid", "{ not json");
        let err = BridgeConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, BridgeError::ConfigParse { .. }));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_ensure_initialized_is_idempotent() {
        if std::env::var_os(CONFIG_ENV_VAR).is_some() {
            return;
        }
        let first = ensure_initialized().unwrap();
        let second = ensure_initialized().unwrap();
        assert!(std::ptr::eq(first, second));
    }
}
