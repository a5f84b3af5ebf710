// Engine backed by the standard libtest harness: a failure panics, libtest
// marks the current test failed and keeps running the others.

use std::panic::Location;

use super::{FailureKind, FailureReport, TestEngine};
use crate::trace::TEST_TRACE_CATEGORY;

#[derive(Debug, Default, Clone, Copy)]
pub struct LibtestEngine;

impl LibtestEngine {
    pub fn new() -> Self {
        Self
    }

    fn fail(&self, report: FailureReport) -> ! {
        panic!("{}", report)
    }
}

impl TestEngine for LibtestEngine {
    fn require(&self, condition: bool, expression: &str, location: &'static Location<'static>) {
        if !condition {
            self.fail(FailureReport::new(
                FailureKind::Condition,
                expression,
                None,
                location,
            ));
        }
    }

    fn require_message(
        &self,
        condition: bool,
        expression: &str,
        message: &str,
        location: &'static Location<'static>,
    ) {
        if !condition {
            self.fail(FailureReport::new(
                FailureKind::Condition,
                expression,
                Some(message),
                location,
            ));
        }
    }

    fn report_throws_failure(
        &self,
        expression: &str,
        detail: &str,
        location: &'static Location<'static>,
    ) {
        self.fail(FailureReport::new(
            FailureKind::Throws,
            expression,
            Some(detail),
            location,
        ));
    }

    fn test_message(&self, message: &str) {
        tracing::info!(category = TEST_TRACE_CATEGORY, "{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_true_condition_returns() {
        LibtestEngine::new().require(true, "true", Location::caller());
        LibtestEngine::new().require_message(true, "true", "unused", Location::caller());
    }

    #[test]
    #[should_panic(expected = "check failed: 1 == 2 [mismatch]")]
    fn test_false_condition_fails_current_test() {
        LibtestEngine::new().require_message(false, "1 == 2", "mismatch", Location::caller());
    }

    #[test]
    #[should_panic(expected = "raise check failed")]
    fn test_throws_failure_fails_current_test() {
        LibtestEngine::new().report_throws_failure("op()", "no error raised", Location::caller());
    }
}
