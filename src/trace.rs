//! Entry/exit tracing for test bodies.
//!
//! [`TestScope`] writes an "Enter test" record when created and a
//! "Leave test" record when dropped, so the exit record is emitted on every
//! way out of the scope, unwinding included.

use std::fmt;

use crate::config;

/// Trace category used for enter/leave records and test messages.
pub const TEST_TRACE_CATEGORY: &str = "Test";

/// Write an informational trace record under `category`.
pub fn write_info(category: &str, args: fmt::Arguments<'_>) {
    tracing::info!(category = category, "{}", args);
}

/// Fully qualified name of the enclosing function.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = __type_name_of(__here);
        name.strip_suffix("::__here").unwrap_or(name)
    }};
}

/// Guard emitting enter/leave records around a test body.
#[must_use = "the leave record is written when the scope is dropped"]
#[derive(Debug)]
pub struct TestScope {
    function: &'static str,
    enabled: bool,
}

impl TestScope {
    /// Enter `function`, honoring `logging.trace_enter_leave`.
    pub fn enter(function: &'static str) -> Self {
        Self::with_enabled(function, config::current().logging.trace_enter_leave)
    }

    pub fn with_enabled(function: &'static str, enabled: bool) -> Self {
        if enabled {
            write_info(TEST_TRACE_CATEGORY, format_args!("Enter test: {}", function));
        }
        Self { function, enabled }
    }

    pub fn function(&self) -> &'static str {
        self.function
    }
}

impl Drop for TestScope {
    fn drop(&mut self) {
        if self.enabled {
            write_info(
                TEST_TRACE_CATEGORY,
                format_args!("Leave test: {}", self.function),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::capture_records;

    #[test]
    fn test_function_name_names_enclosing_fn() {
        let name = function_name!();
        assert!(
            name.ends_with("trace::tests::test_function_name_names_enclosing_fn"),
            "unexpected name {name}"
        );
    }

    #[test]
    fn test_scope_writes_enter_and_leave() {
        let output = capture_records(|| {
            let scope = TestScope::with_enabled("suite::case", true);
            assert_eq!(scope.function(), "suite::case");
            write_info("Body", format_args!("inside"));
        });
        let enter = output.find("Enter test: suite::case").unwrap();
        let inside = output.find("inside").unwrap();
        let leave = output.find("Leave test: suite::case").unwrap();
        assert!(enter < inside && inside < leave, "{output}");
        assert!(output.contains("category="), "{output}");
    }

    #[test]
    fn test_scope_leaves_on_unwind() {
        let output = capture_records(|| {
            let result = std::panic::catch_unwind(|| {
                let _scope = TestScope::with_enabled("suite::unwinds", true);
                panic!("body failed");
            });
            assert!(result.is_err());
        });
        assert!(output.contains("Enter test: suite::unwinds"), "{output}");
        assert!(output.contains("Leave test: suite::unwinds"), "{output}");
    }

    #[test]
    fn test_disabled_scope_is_silent() {
        let output = capture_records(|| {
            let _scope = TestScope::with_enabled("suite::quiet", false);
        });
        assert!(!output.contains("suite::quiet"), "{output}");
    }
}
