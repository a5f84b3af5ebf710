//! Traced tests install a subscriber before their body runs.
//!
//! Kept in its own test binary so no other test installs the global
//! subscriber first.

use tracing::level_filters::LevelFilter;
use verify_bridge::verify_is_true;

verify_bridge::test_suite!(TraceOutputSuite);

verify_bridge::traced_test! {
    fn traced_test_installs_subscriber() {
        assert!(tracing::dispatcher::has_been_set());
        if std::env::var_os("VERIFY_BRIDGE_CONFIG").is_none() {
            assert!(LevelFilter::current() >= LevelFilter::INFO);
        }
        verify_is_true!(true);
    }
}
