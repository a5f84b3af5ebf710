// Bridge error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;
use std::path::PathBuf;

/// Bridge error code constants
///
/// Single source of truth for the numeric codes carried by [`BridgeError`].
///
/// Error code range: 3001-3004
pub struct BridgeErrorCodes {}

impl BridgeErrorCodes {
    /// Configuration file could not be read
    pub const CONFIG_READ: i32 = 3001;

    /// Configuration file contents are not valid JSON for `BridgeConfig`
    pub const CONFIG_PARSE: i32 = 3002;

    /// Mutex/RwLock was poisoned
    pub const LOCK_POISONED: i32 = 3003;

    /// A fixture setup or cleanup hook returned `false`
    pub const FIXTURE_HOOK: i32 = 3004;
}

/// Log a bridge error with structured context
///
/// Logs the numeric code, the component and the human-readable message.
/// The logging is non-blocking and will not panic on failure.
pub fn log_bridge_error(err: &BridgeError, context: &str) {
    error!(
        "Bridge error in {}: code={}, component=VerifyBridge, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised by the bridge's own plumbing
///
/// Verification failures are never represented here: those go to the
/// underlying test engine or terminate the process. These errors cover
/// configuration loading, lock poisoning and fixture hooks.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// Configuration file could not be read
    ConfigRead { path: PathBuf, details: String },

    /// Configuration file could not be parsed
    ConfigParse { path: PathBuf, details: String },

    /// Mutex/RwLock was poisoned
    LockPoisoned { component: String },

    /// A fixture hook reported failure
    FixtureHook { suite: String, hook: String },
}

impl ErrorCode for BridgeError {
    fn code(&self) -> i32 {
        match self {
            BridgeError::ConfigRead { .. } => BridgeErrorCodes::CONFIG_READ,
            BridgeError::ConfigParse { .. } => BridgeErrorCodes::CONFIG_PARSE,
            BridgeError::LockPoisoned { .. } => BridgeErrorCodes::LOCK_POISONED,
            BridgeError::FixtureHook { .. } => BridgeErrorCodes::FIXTURE_HOOK,
        }
    }

    fn message(&self) -> String {
        match self {
            BridgeError::ConfigRead { path, details } => {
                format!("Failed to read config file {:?}: {}", path, details)
            }
            BridgeError::ConfigParse { path, details } => {
                format!("Failed to parse config file {:?}: {}", path, details)
            }
            BridgeError::LockPoisoned { component } => {
                format!("Lock poisoned on {}", component)
            }
            BridgeError::FixtureHook { suite, hook } => {
                format!("Fixture hook {} failed in suite {}", hook, suite)
            }
        }
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BridgeError::{} (code {}): {}",
            self.variant_name(),
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for BridgeError {}

impl BridgeError {
    fn variant_name(&self) -> &'static str {
        match self {
            BridgeError::ConfigRead { .. } => "ConfigRead",
            BridgeError::ConfigParse { .. } => "ConfigParse",
            BridgeError::LockPoisoned { .. } => "LockPoisoned",
            BridgeError::FixtureHook { .. } => "FixtureHook",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_error_codes() {
        assert_eq!(
            BridgeError::ConfigRead {
                path: PathBuf::from("a.json"),
                details: "missing".to_string()
            }
            .code(),
            BridgeErrorCodes::CONFIG_READ
        );
        assert_eq!(
            BridgeError::ConfigParse {
                path: PathBuf::from("a.json"),
                details: "eof".to_string()
            }
            .code(),
            BridgeErrorCodes::CONFIG_PARSE
        );
        assert_eq!(
            BridgeError::LockPoisoned {
                component: "message_cache".to_string()
            }
            .code(),
            BridgeErrorCodes::LOCK_POISONED
        );
        assert_eq!(
            BridgeError::FixtureHook {
                suite: "HostSuite".to_string(),
                hook: "method_setup".to_string()
            }
            .code(),
            BridgeErrorCodes::FIXTURE_HOOK
        );
    }

    #[test]
    fn test_bridge_error_display() {
        let err = BridgeError::LockPoisoned {
            component: "verify_stats".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.starts_with("BridgeError::LockPoisoned (code 3003)"));
        assert!(rendered.contains("verify_stats"));

        let err = BridgeError::ConfigParse {
            path: PathBuf::from("bridge.json"),
            details: "expected value".to_string(),
        };
        assert!(err.message().contains("bridge.json"));
        assert!(err.message().contains("expected value"));

        let err = BridgeError::FixtureHook {
            suite: "HostSuite".to_string(),
            hook: "class_setup".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "BridgeError::FixtureHook (code 3004): Fixture hook class_setup failed in suite HostSuite"
        );
    }

    #[test]
    fn test_error_code_trait_object() {
        let err: &dyn ErrorCode = &BridgeError::LockPoisoned {
            component: "x".to_string(),
        };
        assert_eq!(err.code(), 3003);
    }
}
