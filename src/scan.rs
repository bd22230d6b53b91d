//! Scan input handling.
//!
//! Typed search and hardware scanners share one input box. This module
//! classifies barcode-looking input and debounces the auto-lookup so a
//! scanner's keystroke burst fires a single resolution instead of one per
//! character.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Minimum length for input to be considered a barcode candidate.
const MIN_BARCODE_LEN: usize = 8;

/// Default quiet window before auto-processing typed input.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// True when the input could plausibly be a barcode rather than a search
/// term: alphanumeric only and at least eight characters.
pub fn looks_like_barcode(input: &str) -> bool {
    input.len() >= MIN_BARCODE_LEN && input.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Debounces auto-barcode detection over a shared input box.
///
/// Each keystroke supersedes the previous pending query; only the query
/// that survives the quiet window untouched is handed back for resolution.
pub struct ScanDebouncer {
    window: Duration,
    generation: AtomicU64,
}

impl ScanDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            generation: AtomicU64::new(0),
        }
    }

    /// Register a keystroke and wait out the quiet window.
    ///
    /// Resolves to the query once the window elapses with no newer
    /// keystroke, or to `None` when superseded.
    pub async fn debounce(&self, query: String) -> Option<String> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.window).await;
        (self.generation.load(Ordering::SeqCst) == generation).then_some(query)
    }

    /// Drop any pending query, e.g. when the Enter key already committed
    /// the input.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
