// Verify Bridge - verification vocabulary on top of the Rust test harness
// Thread-keyed diagnostic messages, build-mode failure policy, suite tracing

// Module declarations
pub mod build_mode;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod logging;
mod macros;
pub mod message_cache;
pub mod retry;
pub mod suite;
pub mod trace;

// Re-exports for convenience
pub use build_mode::BuildMode;
pub use dispatch::{verifier, Nullable, Raised, Status, Verifier, VerifyStats};
pub use engine::{FailureKind, FailureReport, LibtestEngine, RecordingEngine, TestEngine};
pub use error::{BridgeError, ErrorCode};
pub use message_cache::{to_wide, MessageCache};
pub use suite::{register_suite, ClassFixture, FixtureGuard, FixtureHooks, SuiteContext};
pub use trace::{TestScope, TEST_TRACE_CATEGORY};
