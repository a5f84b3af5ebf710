// Engine that keeps failures and messages in memory and never unwinds.

use std::panic::Location;
use std::sync::{Mutex, PoisonError};

use super::{FailureKind, FailureReport, TestEngine};

#[derive(Debug, Default)]
pub struct RecordingEngine {
    failures: Mutex<Vec<FailureReport>>,
    messages: Mutex<Vec<String>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, report: FailureReport) {
        log::debug!("[RecordingEngine] {}", report);
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report);
    }

    pub fn failures(&self) -> Vec<FailureReport> {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn failure_count(&self) -> usize {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl TestEngine for RecordingEngine {
    fn require(&self, condition: bool, expression: &str, location: &'static Location<'static>) {
        if !condition {
            self.record(FailureReport::new(
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
            self.record(FailureReport::new(
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
        self.record(FailureReport::new(
            FailureKind::Throws,
            expression,
            Some(detail),
            location,
        ));
    }

    fn test_message(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_only_false_conditions() {
        let engine = RecordingEngine::new();
        engine.require(true, "ok", Location::caller());
        engine.require(false, "bad", Location::caller());
        engine.require_message(false, "worse", "why", Location::caller());

        let failures = engine.failures();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].expression, "bad");
        assert_eq!(failures[0].message, None);
        assert_eq!(failures[1].message.as_deref(), Some("why"));
        assert!(failures[1].file.ends_with("recording.rs"));
    }

    #[test]
    fn test_clear_resets_state() {
        let engine = RecordingEngine::new();
        engine.require(false, "bad", Location::caller());
        engine.test_message("hello");
        assert_eq!(engine.messages(), vec!["hello".to_string()]);
        engine.clear();
        assert_eq!(engine.failure_count(), 0);
        assert!(engine.messages().is_empty());
    }
}
