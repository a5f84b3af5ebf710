//! Retrying calls interrupted by a signal.

use std::io;

use crate::trace;

/// Trace category for interrupted-call retries.
pub const RETRY_TRACE_CATEGORY: &str = "RetryOnEIntr";

/// Run `operation` until it returns anything other than an
/// [`io::ErrorKind::Interrupted`] error.
///
/// Each interrupted attempt writes an informational record under
/// [`RETRY_TRACE_CATEGORY`]. Any other error is returned unchanged; see
/// [`Verifier::retry_on_interrupt`] for the variant that also reports it as
/// a failed check.
///
/// [`Verifier::retry_on_interrupt`]: crate::dispatch::Verifier::retry_on_interrupt
pub fn retry_on_interrupt<T, F>(mut operation: F) -> io::Result<T>
where
    F: FnMut() -> io::Result<T>,
{
    let mut retries: u64 = 0;
    loop {
        match operation() {
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {
                retries += 1;
                trace::write_info(
                    RETRY_TRACE_CATEGORY,
                    format_args!("retry = {}, error = {}", retries, err),
                );
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::capture_records;

    fn interrupted() -> io::Error {
        io::Error::new(io::ErrorKind::Interrupted, "signal")
    }

    #[test]
    fn test_retries_until_success() {
        let mut calls = 0;
        let output = capture_records(|| {
            let value = retry_on_interrupt(|| {
                calls += 1;
                if calls < 3 {
                    Err(interrupted())
                } else {
                    Ok(calls * 10)
                }
            })
            .unwrap();
            assert_eq!(value, 30);
        });
        assert_eq!(calls, 3);
        assert_eq!(output.matches("retry = ").count(), 2, "{output}");
        assert!(output.contains("RetryOnEIntr"), "{output}");
        assert!(output.contains("retry = 2, error = signal"), "{output}");
    }

    #[test]
    fn test_other_errors_return_immediately() {
        let mut calls = 0;
        let err = retry_on_interrupt(|| -> io::Result<()> {
            calls += 1;
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        })
        .unwrap_err();
        assert_eq!(calls, 1);
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_first_success_is_silent() {
        let output = capture_records(|| {
            assert_eq!(retry_on_interrupt(|| Ok::<_, io::Error>("ok")).unwrap(), "ok");
        });
        assert!(!output.contains("retry"), "{output}");
    }
}
