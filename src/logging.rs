//! Tracing subscriber setup for test processes.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::OnceCell;
use tracing::Level;

use crate::config;

static INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sink {
    TestWriter,
    Stderr,
}

/// Install a fmt subscriber writing through the libtest capture writer.
///
/// Runs once per process. The level comes from `logging.level`; an
/// unparsable level falls back to `info`. If another global subscriber is
/// already installed it is left in place.
pub fn init_test_logging() {
    init_once(Sink::TestWriter);
}

/// Same as [`init_test_logging`], writing to stderr so stdout stays free
/// for command output.
pub fn init_stderr_logging() {
    init_once(Sink::Stderr);
}

fn init_once(sink: Sink) {
    INIT.get_or_init(|| {
        let configured = config::current().logging.level;
        let level = configured.parse::<Level>().unwrap_or_else(|_| {
            log::warn!("[Logging] Unknown level {:?}, using info", configured);
            Level::INFO
        });
        let builder = tracing_subscriber::fmt().with_max_level(level);
        let installed = match sink {
            Sink::TestWriter => builder.with_test_writer().try_init(),
            Sink::Stderr => builder.with_writer(io::stderr).try_init(),
        };
        if installed.is_err() {
            log::debug!("[Logging] Global subscriber already installed");
        }
    });
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return everything it traced.
pub fn capture_records<F: FnOnce()>(f: F) -> String {
    let buffer = SharedBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .without_time()
        .with_max_level(Level::TRACE)
        .finish();
    tracing::subscriber::with_default(subscriber, f);

    let bytes = buffer
        .0
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    String::from_utf8_lossy(&bytes).into_owned()
}
