//! Build-mode policy for failed verifications.
//!
//! A debug build treats a failed check as a coding defect and aborts on the
//! spot; any other build reports a recoverable failure to the test engine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::BridgeConfig;

cfg_if::cfg_if! {
    if #[cfg(debug_assertions)] {
        const COMPILED_MODE: BuildMode = BuildMode::Debug;
    } else {
        const COMPILED_MODE: BuildMode = BuildMode::Release;
    }
}

/// Severity policy applied when a verification condition is false.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BuildMode {
    /// Failures abort the process at the failure site.
    Debug,
    /// Failures are reported to the test engine and execution continues.
    Release,
}

impl BuildMode {
    /// Mode fixed by the compilation profile of this crate.
    pub const fn compiled() -> Self {
        COMPILED_MODE
    }

    /// Mode for a dispatcher built from `config`: the configured override if
    /// present, the compiled mode otherwise.
    pub fn resolve(config: &BridgeConfig) -> Self {
        config.verify.build_mode.unwrap_or_else(Self::compiled)
    }

    #[inline]
    pub fn is_debug(self) -> bool {
        self == BuildMode::Debug
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuildMode::Debug => "debug",
            BuildMode::Release => "release",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
