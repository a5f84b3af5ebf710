//! Suite registration and fixture hooks.
//!
//! Registering a suite forces the shared configuration to load before the
//! suite's first test and binds the suite's name as its trace category.
//! Registration happens once per suite name; later calls return the same
//! context.
//!
//! Fixture suites add [`FixtureHooks`]: class setup runs once before the
//! suite's first fixture test, method setup and cleanup wrap every fixture
//! test, and a hook returning `false` fails the test that triggered it.

use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard};

use once_cell::sync::Lazy;

use crate::config::{self, BridgeConfig};
use crate::error::{log_bridge_error, BridgeError};
use crate::trace;

static REGISTRY: Lazy<Mutex<HashMap<&'static str, Arc<SuiteContext>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Per-suite state shared by every test in the suite.
#[derive(Debug)]
pub struct SuiteContext {
    name: &'static str,
    config: &'static BridgeConfig,
}

impl SuiteContext {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Trace category bound to this suite.
    pub fn trace_category(&self) -> &'static str {
        self.name
    }

    pub fn config(&self) -> &'static BridgeConfig {
        self.config
    }

    /// Write an informational record under the suite's trace category.
    pub fn trace_info(&self, args: fmt::Arguments<'_>) {
        trace::write_info(self.trace_category(), args);
    }
}

/// Register `name`, initializing shared configuration on first use.
///
/// Configuration errors are returned as they are; the registration is not
/// recorded, so a later call retries.
pub fn register_suite(name: &'static str) -> Result<Arc<SuiteContext>, BridgeError> {
    let mut registry = REGISTRY.lock().map_err(|_| {
        let err = BridgeError::LockPoisoned {
            component: "suite_registry".to_string(),
        };
        log_bridge_error(&err, "register_suite");
        err
    })?;

    if let Some(context) = registry.get(name) {
        return Ok(Arc::clone(context));
    }

    let config = config::ensure_initialized()?;
    let context = Arc::new(SuiteContext { name, config });
    registry.insert(name, Arc::clone(&context));
    log::info!("[Suite] Registered {}", name);
    Ok(context)
}

/// Whether `name` has completed registration.
pub fn is_registered(name: &str) -> bool {
    REGISTRY
        .lock()
        .map(|registry| registry.contains_key(name))
        .unwrap_or(false)
}

/// Setup and cleanup hooks for a suite fixture.
///
/// Every hook defaults to success, so `impl FixtureHooks for MyFixture {}`
/// gives a fixture that is only default-constructed per test.
pub trait FixtureHooks: Default {
    /// Runs once, before the first fixture test of the suite.
    fn class_setup() -> bool {
        true
    }

    /// Runs from the suite's `cleanup_suite()` after a successful class setup.
    fn class_cleanup() -> bool {
        true
    }

    fn method_setup(&mut self) -> bool {
        true
    }

    fn method_cleanup(&mut self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClassState {
    Pending,
    Ready,
    Failed,
}

/// Class-level hook state for one fixture suite.
#[derive(Debug)]
pub struct ClassFixture {
    state: Mutex<ClassState>,
}

impl Default for ClassFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassFixture {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(ClassState::Pending),
        }
    }

    fn lock(&self, suite: &str) -> Result<MutexGuard<'_, ClassState>, BridgeError> {
        self.state.lock().map_err(|_| {
            let err = BridgeError::LockPoisoned {
                component: format!("class_fixture:{}", suite),
            };
            log_bridge_error(&err, "class_fixture");
            err
        })
    }

    /// Run `F::class_setup` unless it already ran; a stored failure is
    /// returned to every later caller.
    pub fn setup<F: FixtureHooks>(&self, suite: &'static str) -> Result<(), BridgeError> {
        let mut state = self.lock(suite)?;
        if *state == ClassState::Pending {
            let ok = F::class_setup();
            trace::write_info(suite, format_args!("class_setup returned {}", ok));
            *state = if ok {
                ClassState::Ready
            } else {
                ClassState::Failed
            };
        }
        match *state {
            ClassState::Failed => Err(hook_failed(suite, "class_setup")),
            _ => Ok(()),
        }
    }

    /// Run `F::class_cleanup` if class setup succeeded. The suite returns to
    /// its pending state, so a later fixture test sets it up again.
    pub fn cleanup<F: FixtureHooks>(&self, suite: &'static str) -> Result<(), BridgeError> {
        let mut state = self.lock(suite)?;
        let was_ready = *state == ClassState::Ready;
        *state = ClassState::Pending;
        drop(state);

        if was_ready && !F::class_cleanup() {
            return Err(hook_failed(suite, "class_cleanup"));
        }
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.state
            .lock()
            .map(|state| *state == ClassState::Ready)
            .unwrap_or(false)
    }
}

fn hook_failed(suite: &str, hook: &str) -> BridgeError {
    let err = BridgeError::FixtureHook {
        suite: suite.to_string(),
        hook: hook.to_string(),
    };
    log_bridge_error(&err, "fixture_hook");
    err
}

/// A per-test fixture whose method cleanup runs on drop.
///
/// A failing cleanup panics, failing the test, unless the thread is already
/// unwinding from a failed body; then it is only logged.
#[derive(Debug)]
pub struct FixtureGuard<F: FixtureHooks> {
    suite: &'static str,
    fixture: F,
}

impl<F: FixtureHooks> FixtureGuard<F> {
    /// Ensure class setup, then build a fresh fixture and run its method setup.
    pub fn setup(suite: &'static str, class: &ClassFixture) -> Result<Self, BridgeError> {
        class.setup::<F>(suite)?;
        let mut fixture = F::default();
        if !fixture.method_setup() {
            return Err(hook_failed(suite, "method_setup"));
        }
        Ok(Self { suite, fixture })
    }
}

impl<F: FixtureHooks> Deref for FixtureGuard<F> {
    type Target = F;

    fn deref(&self) -> &F {
        &self.fixture
    }
}

impl<F: FixtureHooks> DerefMut for FixtureGuard<F> {
    fn deref_mut(&mut self) -> &mut F {
        &mut self.fixture
    }
}

impl<F: FixtureHooks> Drop for FixtureGuard<F> {
    fn drop(&mut self) {
        if self.fixture.method_cleanup() {
            return;
        }
        let err = hook_failed(self.suite, "method_cleanup");
        if !std::thread::panicking() {
            panic!("{}", err);
        }
    }
}
