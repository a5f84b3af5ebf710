use std::io;

use clap::ValueEnum;
use verify_bridge::message_cache::to_wide;
use verify_bridge::Verifier;

/// Canned verification sequences exercised by the probe.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum Scenario {
    /// Every check passes.
    Pass,
    /// `verify_true(false)` without a message.
    FalseNoMessage,
    /// `verify_true(1 == 2, "mismatch")`, then one more passing check.
    Mismatch,
    /// Failing check whose message is not valid UTF-16.
    MalformedMessage,
    /// Operation raises the expected error kind.
    ThrowsMatch,
    /// Operation raises a different error kind.
    ThrowsMismatch,
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

fn not_found() -> Result<(), io::Error> {
    Err(io::Error::new(io::ErrorKind::NotFound, "probe file missing"))
}

pub fn run(verifier: &Verifier, scenario: Scenario) {
    match scenario {
        Scenario::Pass => {
            verifier.verify_true(true, "true", None);
            verifier.verify_equal(&2, &2, "2 == 2", Some(&to_wide("two")));
            verifier.verify_not_null(&Some("host"), "Some(\"host\")", None);
        }
        Scenario::FalseNoMessage => {
            verifier.verify_true(false, "false", None);
        }
        Scenario::Mismatch => {
            verifier.verify_true(1 == 2, "1 == 2", Some(&to_wide("mismatch")));
            verifier.test_message(Some(&to_wide("after mismatch")));
            verifier.verify_true(true, "true", None);
        }
        Scenario::MalformedMessage => {
            verifier.verify_true(false, "false", Some(&[0x0041u16, 0xDC00]));
        }
        Scenario::ThrowsMatch => {
            verifier.verify_throws(not_found, io::ErrorKind::NotFound, "not_found()");
        }
        Scenario::ThrowsMismatch => {
            verifier.verify_throws(not_found, io::ErrorKind::PermissionDenied, "not_found()");
        }
    }
}
