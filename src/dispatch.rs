//! Verification dispatcher.
//!
//! Every check funnels into [`Verifier::verify_true`]: the optional wide
//! message is converted and cached, the condition is counted, and then the
//! build mode decides between aborting the process (debug) and reporting a
//! recoverable failure to the [`TestEngine`] (release). Raise checks skip the
//! build-mode branch and always report to the engine.

use std::any::{Any, TypeId};
use std::fmt;
use std::io;
use std::panic::{self, Location, UnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::build_mode::BuildMode;
use crate::config;
use crate::engine::{LibtestEngine, TestEngine};
use crate::message_cache::{self, to_wide, MessageCache};
use crate::retry;

mod predicates;
mod raises;

pub use predicates::{Nullable, Status};
pub use raises::Raised;

/// Dispatcher used by the `verify_*!` macros.
static GLOBAL_VERIFIER: Lazy<Verifier> = Lazy::new(|| {
    let config = config::current();
    let mode = BuildMode::resolve(&config);
    log::info!("[Verifier] Global verifier running in {} mode", mode);
    Verifier::new(mode, Arc::new(LibtestEngine::new()), message_cache::global())
});

/// Access the global verifier.
pub fn verifier() -> &'static Verifier {
    &GLOBAL_VERIFIER
}

/// Running totals for one verifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyStats {
    pub checks: u64,
    pub passed: u64,
    pub failed: u64,
}

/// Verification dispatcher bound to a build mode, an engine and a cache.
pub struct Verifier {
    mode: BuildMode,
    engine: Arc<dyn TestEngine>,
    cache: Arc<MessageCache>,
    // Separate from the cache lock; never held while the cache is written.
    stats: Mutex<VerifyStats>,
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier")
            .field("mode", &self.mode)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl Verifier {
    pub fn new(mode: BuildMode, engine: Arc<dyn TestEngine>, cache: Arc<MessageCache>) -> Self {
        Self {
            mode,
            engine,
            cache,
            stats: Mutex::new(VerifyStats::default()),
        }
    }

    /// Verifier with its own private message cache.
    pub fn with_engine(mode: BuildMode, engine: Arc<dyn TestEngine>) -> Self {
        Self::new(mode, engine, Arc::new(MessageCache::new()))
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn cache(&self) -> &MessageCache {
        &self.cache
    }

    pub fn stats(&self) -> VerifyStats {
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, passed: bool) {
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        stats.checks += 1;
        if passed {
            stats.passed += 1;
        } else {
            stats.failed += 1;
        }
    }

    fn coding_error(&self, expression: &str, location: &Location<'_>) -> ! {
        let message = self.cache.current_thread_message().unwrap_or_default();
        log::error!(
            "[CodingError] {}:{}: {} (last message: {:?})",
            location.file(),
            location.line(),
            expression,
            message
        );
        eprintln!(
            "coding error at {}:{}: {} {}",
            location.file(),
            location.line(),
            expression,
            message
        );
        std::process::abort()
    }

    /// Base check: pass when `condition` holds.
    ///
    /// Debug mode aborts the process on failure. Release mode reports to the
    /// engine, attaching the message when it converts to non-empty text.
    #[track_caller]
    pub fn verify_true(&self, condition: bool, expression: &str, message: Option<&[u16]>) {
        let location = Location::caller();
        let narrow = self.cache.convert_and_cache(message);
        self.record(condition);

        if self.mode.is_debug() {
            if !condition {
                self.coding_error(expression, location);
            }
            return;
        }

        if narrow.is_empty() {
            self.engine.require(condition, expression, location);
        } else {
            self.engine
                .require_message(condition, expression, &narrow, location);
        }
    }

    #[track_caller]
    pub fn verify_false(&self, condition: bool, expression: &str, message: Option<&[u16]>) {
        self.verify_true(!condition, expression, message);
    }

    #[track_caller]
    pub fn verify_equal<A, B>(&self, left: &A, right: &B, expression: &str, message: Option<&[u16]>)
    where
        A: PartialEq<B> + ?Sized,
        B: ?Sized,
    {
        self.verify_true(left == right, expression, message);
    }

    #[track_caller]
    pub fn verify_not_equal<A, B>(
        &self,
        left: &A,
        right: &B,
        expression: &str,
        message: Option<&[u16]>,
    ) where
        A: PartialEq<B> + ?Sized,
        B: ?Sized,
    {
        self.verify_true(left != right, expression, message);
    }

    /// Equality check with a generated message naming both operands.
    ///
    /// Takes already-evaluated operands by reference, so each is computed
    /// once and stays usable after the check.
    #[track_caller]
    pub fn verify_equal2<A, B>(
        &self,
        left: &A,
        right: &B,
        left_source: &str,
        right_source: &str,
    ) where
        A: PartialEq<B> + fmt::Debug + ?Sized,
        B: fmt::Debug + ?Sized,
    {
        let message = to_wide(&format!(
            "verify_are_equal({}={:?}, {}={:?})",
            left_source, left, right_source, right
        ));
        let expression = format!("{} == {}", left_source, right_source);
        self.verify_equal(left, right, &expression, Some(&message));
    }

    #[track_caller]
    pub fn verify_not_equal2<A, B>(
        &self,
        left: &A,
        right: &B,
        left_source: &str,
        right_source: &str,
    ) where
        A: PartialEq<B> + fmt::Debug + ?Sized,
        B: fmt::Debug + ?Sized,
    {
        let message = to_wide(&format!(
            "verify_are_not_equal({}={:?}, {}={:?})",
            left_source, left, right_source, right
        ));
        let expression = format!("{} != {}", left_source, right_source);
        self.verify_not_equal(left, right, &expression, Some(&message));
    }

    #[track_caller]
    pub fn verify_null<P>(&self, value: &P, expression: &str, message: Option<&[u16]>)
    where
        P: Nullable + ?Sized,
    {
        self.verify_true(value.is_null_ref(), expression, message);
    }

    #[track_caller]
    pub fn verify_not_null<P>(&self, value: &P, expression: &str, message: Option<&[u16]>)
    where
        P: Nullable + ?Sized,
    {
        self.verify_true(!value.is_null_ref(), expression, message);
    }

    #[track_caller]
    pub fn verify_succeeded<S>(&self, status: &S, expression: &str, message: Option<&[u16]>)
    where
        S: Status + ?Sized,
    {
        self.verify_true(status.succeeded(), expression, message);
    }

    #[track_caller]
    pub fn verify_failed<S>(&self, status: &S, expression: &str, message: Option<&[u16]>)
    where
        S: Status + ?Sized,
    {
        self.verify_true(!status.succeeded(), expression, message);
    }

    /// Unconditional failure for paths that must not be reached.
    #[track_caller]
    pub fn verify_fail(&self, message: Option<&[u16]>) {
        self.verify_true(false, "verify_fail", message);
    }

    #[track_caller]
    pub fn verify_true_fmt(&self, condition: bool, expression: &str, args: fmt::Arguments<'_>) {
        let message = to_wide(&args.to_string());
        self.verify_true(condition, expression, Some(&message));
    }

    #[track_caller]
    pub fn verify_false_fmt(&self, condition: bool, expression: &str, args: fmt::Arguments<'_>) {
        let message = to_wide(&args.to_string());
        self.verify_false(condition, expression, Some(&message));
    }

    #[track_caller]
    pub fn verify_equal_fmt<A, B>(
        &self,
        left: &A,
        right: &B,
        expression: &str,
        args: fmt::Arguments<'_>,
    ) where
        A: PartialEq<B> + ?Sized,
        B: ?Sized,
    {
        let message = to_wide(&args.to_string());
        self.verify_equal(left, right, expression, Some(&message));
    }

    #[track_caller]
    pub fn verify_fail_fmt(&self, args: fmt::Arguments<'_>) {
        let message = to_wide(&args.to_string());
        self.verify_fail(Some(&message));
    }

    /// Pass when `operation` returns an error whose kind equals `expected`.
    ///
    /// Always reported to the engine, whatever the build mode.
    #[track_caller]
    pub fn verify_throws<T, E, F>(&self, operation: F, expected: E::Kind, expression: &str)
    where
        F: FnOnce() -> Result<T, E>,
        E: Raised,
    {
        let location = Location::caller();
        let detail = match operation() {
            Ok(_) => Some(format!(
                "expected error of kind {:?}, but the operation succeeded",
                expected
            )),
            Err(err) => {
                let actual = err.kind();
                if actual == expected {
                    None
                } else {
                    Some(format!(
                        "expected error of kind {:?}, got {:?}",
                        expected, actual
                    ))
                }
            }
        };
        self.finish_raise_check(detail, expression, location);
    }

    /// Pass when `operation` panics with a payload of type `P`.
    ///
    /// `&'static str` and `String` both name a panic message: `panic!` picks
    /// between them depending on whether the format string needs runtime
    /// arguments, so either expectation accepts either payload.
    #[track_caller]
    pub fn verify_panics<P, F>(&self, operation: F, expression: &str)
    where
        P: Any,
        F: FnOnce() + UnwindSafe,
    {
        let location = Location::caller();
        let detail = match panic::catch_unwind(operation) {
            Ok(()) => Some(format!(
                "expected panic with {}, but the operation returned",
                std::any::type_name::<P>()
            )),
            Err(payload) if payload_matches::<P>(payload.as_ref()) => None,
            Err(payload) => Some(format!(
                "expected panic with {}, got {}",
                std::any::type_name::<P>(),
                describe_payload(payload.as_ref())
            )),
        };
        self.finish_raise_check(detail, expression, location);
    }

    /// Retry `operation` across interrupted attempts; any other error is an
    /// invariant violation and fails the check under the build-mode policy.
    #[track_caller]
    pub fn retry_on_interrupt<T, F>(&self, operation: F, expression: &str) -> io::Result<T>
    where
        F: FnMut() -> io::Result<T>,
    {
        let result = retry::retry_on_interrupt(operation);
        match &result {
            Ok(_) => self.verify_true(true, expression, None),
            Err(err) => {
                let message = to_wide(&format!(
                    "{} failed with {:?}: {}",
                    expression,
                    err.kind(),
                    err
                ));
                self.verify_true(false, expression, Some(&message));
            }
        }
        result
    }

    fn finish_raise_check(
        &self,
        detail: Option<String>,
        expression: &str,
        location: &'static Location<'static>,
    ) {
        self.record(detail.is_none());
        if let Some(detail) = detail {
            self.engine.report_throws_failure(expression, &detail, location);
        }
    }

    /// Convert a wide message and forward it to the engine's message sink.
    pub fn test_message(&self, message: Option<&[u16]>) {
        let narrow = self.cache.convert_and_cache(message);
        self.engine.test_message(&narrow);
    }

    pub fn test_message_fmt(&self, args: fmt::Arguments<'_>) {
        let message = to_wide(&args.to_string());
        self.test_message(Some(&message));
    }
}

fn is_panic_message(payload: &(dyn Any + Send)) -> bool {
    payload.is::<&'static str>() || payload.is::<String>()
}

fn payload_matches<P: Any>(payload: &(dyn Any + Send)) -> bool {
    if payload.is::<P>() {
        return true;
    }
    let expected = TypeId::of::<P>();
    let expects_message =
        expected == TypeId::of::<&'static str>() || expected == TypeId::of::<String>();
    expects_message && is_panic_message(payload)
}

fn describe_payload(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        format!("panic {:?}", text)
    } else if let Some(text) = payload.downcast_ref::<String>() {
        format!("panic {:?}", text)
    } else {
        "panic with an unrecognized payload".to_string()
    }
}
