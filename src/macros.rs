//! Verification, message and suite macros.
//!
//! The `verify_*!` macros route through the global [`Verifier`]; the source
//! text of each condition becomes the reported expression. Message arguments
//! are UTF-16 text: anything that is `AsRef<[u16]>`, typically built with
//! [`wide!`].
//!
//! [`Verifier`]: crate::dispatch::Verifier

/// UTF-16 encoding of a string, for message arguments.
#[macro_export]
macro_rules! wide {
    ($text:expr) => {
        $crate::message_cache::to_wide($text)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __wide_arg {
    () => {
        ::std::option::Option::None
    };
    ($msg:expr) => {
        ::std::option::Option::Some(::std::convert::AsRef::<[u16]>::as_ref(&$msg))
    };
}

#[macro_export]
macro_rules! verify_is_true {
    ($cond:expr $(, $msg:expr)? $(,)?) => {
        $crate::dispatch::verifier().verify_true(
            $cond,
            stringify!($cond),
            $crate::__wide_arg!($($msg)?),
        )
    };
}

#[macro_export]
macro_rules! verify_is_false {
    ($cond:expr $(, $msg:expr)? $(,)?) => {
        $crate::dispatch::verifier().verify_false(
            $cond,
            concat!("!(", stringify!($cond), ")"),
            $crate::__wide_arg!($($msg)?),
        )
    };
}

#[macro_export]
macro_rules! verify_are_equal {
    ($left:expr, $right:expr $(, $msg:expr)? $(,)?) => {
        $crate::dispatch::verifier().verify_equal(
            &$left,
            &$right,
            concat!(stringify!($left), " == ", stringify!($right)),
            $crate::__wide_arg!($($msg)?),
        )
    };
}

#[macro_export]
macro_rules! verify_are_not_equal {
    ($left:expr, $right:expr $(, $msg:expr)? $(,)?) => {
        $crate::dispatch::verifier().verify_not_equal(
            &$left,
            &$right,
            concat!(stringify!($left), " != ", stringify!($right)),
            $crate::__wide_arg!($($msg)?),
        )
    };
}

/// Equality check that evaluates each operand once and reports both values.
///
/// Operands are borrowed, so non-`Copy` values stay usable afterwards.
#[macro_export]
macro_rules! verify_are_equal2 {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left, right) => $crate::dispatch::verifier().verify_equal2(
                left,
                right,
                stringify!($left),
                stringify!($right),
            ),
        }
    };
}

#[macro_export]
macro_rules! verify_are_not_equal2 {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left, right) => $crate::dispatch::verifier().verify_not_equal2(
                left,
                right,
                stringify!($left),
                stringify!($right),
            ),
        }
    };
}

#[macro_export]
macro_rules! verify_is_null {
    ($value:expr $(, $msg:expr)? $(,)?) => {
        $crate::dispatch::verifier().verify_null(
            &$value,
            concat!(stringify!($value), " is null"),
            $crate::__wide_arg!($($msg)?),
        )
    };
}

#[macro_export]
macro_rules! verify_is_not_null {
    ($value:expr $(, $msg:expr)? $(,)?) => {
        $crate::dispatch::verifier().verify_not_null(
            &$value,
            concat!(stringify!($value), " is not null"),
            $crate::__wide_arg!($($msg)?),
        )
    };
}

#[macro_export]
macro_rules! verify_succeeded {
    ($status:expr $(, $msg:expr)? $(,)?) => {
        $crate::dispatch::verifier().verify_succeeded(
            &$status,
            concat!(stringify!($status), " succeeded"),
            $crate::__wide_arg!($($msg)?),
        )
    };
}

#[macro_export]
macro_rules! verify_failed {
    ($status:expr $(, $msg:expr)? $(,)?) => {
        $crate::dispatch::verifier().verify_failed(
            &$status,
            concat!(stringify!($status), " failed"),
            $crate::__wide_arg!($($msg)?),
        )
    };
}

#[macro_export]
macro_rules! verify_fail {
    ($($msg:expr)? $(,)?) => {
        $crate::dispatch::verifier().verify_fail($crate::__wide_arg!($($msg)?))
    };
}

/// Pass when `$operation` evaluates to an `Err` whose kind is `$kind`.
#[macro_export]
macro_rules! verify_throws {
    ($operation:expr, $kind:expr $(,)?) => {
        $crate::dispatch::verifier().verify_throws(|| $operation, $kind, stringify!($operation))
    };
}

/// Pass when `$operation` panics with a payload of type `$payload`.
#[macro_export]
macro_rules! verify_panics {
    ($operation:expr, $payload:ty $(,)?) => {
        $crate::dispatch::verifier().verify_panics::<$payload, _>(
            ::std::panic::AssertUnwindSafe(|| {
                let _ = $operation;
            }),
            stringify!($operation),
        )
    };
}

/// Evaluate `$operation` until it stops failing with
/// `io::ErrorKind::Interrupted`. Any other error fails the check.
#[macro_export]
macro_rules! retry_on_interrupt {
    ($operation:expr $(,)?) => {
        $crate::dispatch::verifier().retry_on_interrupt(|| $operation, stringify!($operation))
    };
}

#[macro_export]
macro_rules! verify_is_true_fmt {
    ($cond:expr, $($arg:tt)+) => {
        $crate::dispatch::verifier().verify_true_fmt(
            $cond,
            stringify!($cond),
            format_args!($($arg)+),
        )
    };
}

#[macro_export]
macro_rules! verify_is_false_fmt {
    ($cond:expr, $($arg:tt)+) => {
        $crate::dispatch::verifier().verify_false_fmt(
            $cond,
            concat!("!(", stringify!($cond), ")"),
            format_args!($($arg)+),
        )
    };
}

#[macro_export]
macro_rules! verify_are_equal_fmt {
    ($left:expr, $right:expr, $($arg:tt)+) => {
        $crate::dispatch::verifier().verify_equal_fmt(
            &$left,
            &$right,
            concat!(stringify!($left), " == ", stringify!($right)),
            format_args!($($arg)+),
        )
    };
}

#[macro_export]
macro_rules! verify_fail_fmt {
    ($($arg:tt)+) => {
        $crate::dispatch::verifier().verify_fail_fmt(format_args!($($arg)+))
    };
}

/// Convert a UTF-16 message and forward it to the engine's message sink.
#[macro_export]
macro_rules! test_wmessage {
    ($msg:expr $(,)?) => {
        $crate::dispatch::verifier().test_message($crate::__wide_arg!($msg))
    };
}

#[macro_export]
macro_rules! test_wmessage_fmt {
    ($($arg:tt)+) => {
        $crate::dispatch::verifier().test_message_fmt(format_args!($($arg)+))
    };
}

/// Declare a suite in the current module.
///
/// Defines `TRACE_TYPE` (the suite's trace category) and `suite_context()`,
/// which registers the suite on first call. [`traced_test!`] calls it before
/// each test body; a registration error fails that test.
#[macro_export]
macro_rules! test_suite {
    ($suite:ident) => {
        #[allow(dead_code)]
        pub const TRACE_TYPE: &str = stringify!($suite);

        #[allow(dead_code)]
        pub fn suite_context() -> ::std::sync::Arc<$crate::suite::SuiteContext> {
            match $crate::suite::register_suite(TRACE_TYPE) {
                Ok(context) => context,
                Err(err) => panic!("suite {} setup failed: {}", TRACE_TYPE, err),
            }
        }
    };
}

/// Declare a suite whose tests each receive a fresh `$fixture`.
///
/// `$fixture` implements [`FixtureHooks`]. Besides what [`test_suite!`]
/// defines, this adds `setup_fixture()`, which runs class setup once and
/// method setup per call, and `cleanup_suite()`, which runs class cleanup.
///
/// [`FixtureHooks`]: crate::suite::FixtureHooks
#[macro_export]
macro_rules! fixture_test_suite {
    ($suite:ident, $fixture:ty) => {
        $crate::test_suite!($suite);

        #[allow(dead_code)]
        pub type SuiteFixture = $fixture;

        static CLASS_FIXTURE: $crate::suite::ClassFixture = $crate::suite::ClassFixture::new();

        #[allow(dead_code)]
        pub fn setup_fixture() -> $crate::suite::FixtureGuard<SuiteFixture> {
            match $crate::suite::FixtureGuard::setup(TRACE_TYPE, &CLASS_FIXTURE) {
                Ok(guard) => guard,
                Err(err) => panic!("suite {} fixture setup failed: {}", TRACE_TYPE, err),
            }
        }

        #[allow(dead_code)]
        pub fn cleanup_suite() -> ::std::result::Result<(), $crate::BridgeError> {
            CLASS_FIXTURE.cleanup::<SuiteFixture>(TRACE_TYPE)
        }
    };
}

/// Define a `#[test]` that registers the enclosing suite and traces
/// entry/exit around `$body`. The `fn name(fixture)` form binds
/// `&mut` a fresh suite fixture; its method cleanup runs after the leave
/// record.
///
/// Installs the test-writer subscriber first, so the enter/leave records
/// land in the captured test output.
#[macro_export]
macro_rules! traced_test {
    ($(#[$meta:meta])* fn $name:ident() $body:block) => {
        $(#[$meta])*
        #[test]
        fn $name() {
            $crate::logging::init_test_logging();
            let _suite = suite_context();
            let _scope = $crate::trace::TestScope::enter($crate::function_name!());
            $body
        }
    };
    ($(#[$meta:meta])* fn $name:ident($fixture:ident) $body:block) => {
        $(#[$meta])*
        #[test]
        fn $name() {
            $crate::logging::init_test_logging();
            let _suite = suite_context();
            let mut guard = setup_fixture();
            #[allow(unused_variables)]
            let $fixture: &mut SuiteFixture = &mut guard;
            let _scope = $crate::trace::TestScope::enter($crate::function_name!());
            $body
        }
    };
}
