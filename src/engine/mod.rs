//! Underlying test-execution engine seam.
//!
//! The dispatcher never records failures itself; it hands them to a
//! [`TestEngine`]. [`LibtestEngine`] maps failures onto the standard test
//! harness, [`RecordingEngine`] keeps them in memory.

use std::fmt;
use std::panic::Location;

use serde::{Deserialize, Serialize};

mod libtest;
mod recording;

pub use libtest::LibtestEngine;
pub use recording::RecordingEngine;

/// Which engine primitive produced a failure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// "require true", with or without message
    Condition,
    /// "require operation raises error of kind E"
    Throws,
}

/// One recoverable failure reported to an engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailureReport {
    pub kind: FailureKind,
    pub expression: String,
    pub message: Option<String>,
    pub file: String,
    pub line: u32,
}

impl FailureReport {
    pub fn new(
        kind: FailureKind,
        expression: &str,
        message: Option<&str>,
        location: &Location<'_>,
    ) -> Self {
        Self {
            kind,
            expression: expression.to_string(),
            message: message.map(str::to_string),
            file: location.file().to_string(),
            line: location.line(),
        }
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            FailureKind::Condition => "check",
            FailureKind::Throws => "raise check",
        };
        write!(
            f,
            "{}:{}: {} failed: {}",
            self.file, self.line, what, self.expression
        )?;
        if let Some(message) = &self.message {
            write!(f, " [{}]", message)?;
        }
        Ok(())
    }
}

/// Primitives the bridge consumes from the test engine.
pub trait TestEngine: Send + Sync {
    /// Record a failure if `condition` is false.
    fn require(&self, condition: bool, expression: &str, location: &'static Location<'static>);

    /// Record a failure carrying `message` if `condition` is false.
    fn require_message(
        &self,
        condition: bool,
        expression: &str,
        message: &str,
        location: &'static Location<'static>,
    );

    /// Record that an operation did not raise the expected error kind.
    fn report_throws_failure(
        &self,
        expression: &str,
        detail: &str,
        location: &'static Location<'static>,
    );

    /// Forward an informational test message.
    fn test_message(&self, message: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_report_display() {
        let report = FailureReport {
            kind: FailureKind::Condition,
            expression: "1 == 2".to_string(),
            message: Some("mismatch".to_string()),
            file: "src/lib.rs".to_string(),
            line: 12,
        };
        assert_eq!(
            report.to_string(),
            "src/lib.rs:12: check failed: 1 == 2 [mismatch]"
        );

        let report = FailureReport {
            message: None,
            kind: FailureKind::Throws,
            ..report
        };
        assert_eq!(report.to_string(), "src/lib.rs:12: raise check failed: 1 == 2");
    }
}
