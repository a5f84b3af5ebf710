//! Per-thread diagnostic message cache.
//!
//! Verification calls hand in UTF-16 diagnostic text. The text is converted
//! to a `String` outside any lock, then stored under the calling thread's key
//! so companion helpers on the same thread can read back the last message
//! without converting again. One entry per thread, last writer wins.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;

/// Substituted for wide text that is not valid UTF-16.
pub const MALFORMED_MESSAGE_PLACEHOLDER: &str = "<malformed diagnostic message>";

/// Process-wide cache shared by the global verifier.
static GLOBAL_CACHE: Lazy<Arc<MessageCache>> = Lazy::new(|| Arc::new(MessageCache::new()));

/// Source of thread keys; never reused within a process.
static NEXT_THREAD_KEY: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_KEY: u64 = NEXT_THREAD_KEY.fetch_add(1, Ordering::Relaxed);
}

/// Access the process-wide message cache.
pub fn global() -> Arc<MessageCache> {
    Arc::clone(&GLOBAL_CACHE)
}

/// Key identifying the calling thread in a [`MessageCache`].
pub fn current_thread_key() -> u64 {
    THREAD_KEY.with(|key| *key)
}

/// Encode text as UTF-16 code units.
pub fn to_wide(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

/// Decode UTF-16 diagnostic text, stopping at the first NUL.
///
/// Malformed input yields [`MALFORMED_MESSAGE_PLACEHOLDER`]; this path is
/// diagnostic-only and must not fail.
pub fn narrow(wide: &[u16]) -> String {
    let end = wide.iter().position(|&unit| unit == 0).unwrap_or(wide.len());
    match String::from_utf16(&wide[..end]) {
        Ok(text) => text,
        Err(err) => {
            log::warn!("[MessageCache] Undecodable diagnostic message: {}", err);
            MALFORMED_MESSAGE_PLACEHOLDER.to_string()
        }
    }
}

/// Thread-keyed store of the last narrow diagnostic message.
#[derive(Debug, Default)]
pub struct MessageCache {
    entries: RwLock<HashMap<u64, String>>,
    writes: AtomicU64,
}

impl MessageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert `message` and cache it for the calling thread.
    ///
    /// Absent input returns an empty string without touching the lock.
    pub fn convert_and_cache(&self, message: Option<&[u16]>) -> String {
        let Some(wide) = message else {
            return String::new();
        };
        let converted = narrow(wide);
        self.store(current_thread_key(), converted.clone());
        converted
    }

    fn store(&self, key: u64, message: String) {
        // A panic on another thread must not take diagnostics down with it.
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, message);
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Last message cached by the calling thread.
    pub fn current_thread_message(&self) -> Option<String> {
        self.entry(current_thread_key())
    }

    pub fn entry(&self, thread_key: u64) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&thread_key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of exclusive acquisitions performed so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;

    #[test]
    fn test_absent_message_skips_cache() {
        let cache = MessageCache::new();
        assert_eq!(cache.convert_and_cache(None), "");
        assert_eq!(cache.write_count(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.current_thread_message(), None);
    }

    #[test]
    fn test_converts_and_stores_for_current_thread() {
        let cache = MessageCache::new();
        let wide = to_wide("mismatch: héllo ✓");
        assert_eq!(cache.convert_and_cache(Some(&wide)), "mismatch: héllo ✓");
        assert_eq!(
            cache.current_thread_message().as_deref(),
            Some("mismatch: héllo ✓")
        );
        assert_eq!(cache.write_count(), 1);
    }

    #[test]
    fn test_second_write_overwrites_first() {
        let cache = MessageCache::new();
        cache.convert_and_cache(Some(&to_wide("first")));
        cache.convert_and_cache(Some(&to_wide("second")));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.current_thread_message().as_deref(), Some("second"));
    }

    #[test]
    fn test_write_does_not_touch_other_threads() {
        let cache = MessageCache::new();
        let other_key = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    cache.convert_and_cache(Some(&to_wide("other")));
                    current_thread_key()
                })
                .join()
                .unwrap()
        });
        cache.convert_and_cache(Some(&to_wide("mine")));
        cache.convert_and_cache(Some(&to_wide("mine again")));

        assert_eq!(cache.entry(other_key).as_deref(), Some("other"));
        assert_eq!(cache.current_thread_message().as_deref(), Some("mine again"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_concurrent_threads_keep_their_own_entries() {
        const THREADS: usize = 16;
        let cache = MessageCache::new();
        let barrier = Barrier::new(THREADS);

        let keys: Vec<(u64, String)> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|index| {
                    let cache = &cache;
                    let barrier = &barrier;
                    scope.spawn(move || {
                        let message = format!("thread {}", index);
                        barrier.wait();
                        for _ in 0..50 {
                            cache.convert_and_cache(Some(&to_wide(&message)));
                        }
                        (current_thread_key(), message)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(cache.len(), THREADS);
        for (key, message) in keys {
            assert_eq!(cache.entry(key), Some(message));
        }
    }

    #[test]
    fn test_stops_at_nul_terminator() {
        let mut wide = to_wide("abc");
        wide.push(0);
        wide.extend(to_wide("ignored"));
        assert_eq!(narrow(&wide), "abc");
    }

    #[test]
    fn test_malformed_input_uses_placeholder() {
        let cache = MessageCache::new();
        // Lone high surrogate.
        let wide: [u16; 3] = [0x0061, 0xD800, 0x0062];
        assert_eq!(
            cache.convert_and_cache(Some(&wide)),
            MALFORMED_MESSAGE_PLACEHOLDER
        );
        assert_eq!(
            cache.current_thread_message().as_deref(),
            Some(MALFORMED_MESSAGE_PLACEHOLDER)
        );
    }

    #[test]
    fn test_thread_keys_are_distinct() {
        let here = current_thread_key();
        let there = std::thread::spawn(current_thread_key).join().unwrap();
        assert_ne!(here, there);
        assert_eq!(here, current_thread_key());
    }
}
