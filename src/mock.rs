//! Mock Machine Translator for testing
//!
//! This module provides a deterministic, model-free translator for exercising the
//! reconciliation engine without loading a model or touching the network.
//!
//! # Example
//!
//! ```ignore
//! use incremental_mt::{MachineTranslator, MockTranslator, MockMode};
//!
//! let mock = MockTranslator::new(MockMode::Suffix);
//! let result = mock.translate("hello", "en", "de").unwrap();
//! assert_eq!(result, "hello_de");
//! ```

use crate::error::{MtError, MtResult};
use crate::translator::MachineTranslator;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append locale suffix: "hello world" → "hello world_de"
    /// Every change of source text changes the last output token
    Suffix,

    /// Use predefined mappings for realistic translations
    /// (text, target_locale) → translation, falling back to Suffix
    Mappings(HashMap<(String, String), String>),

    /// Reverse word order (simulates verb-final target languages)
    Reorder,

    /// Simulate oracle errors
    Error(String),

    /// Return nothing, whatever the input
    Empty,

    /// No-op: return input unchanged
    NoOp,
}

/// Mock translator that simulates various translation scenarios
///
/// Counts its invocations. The counter is shared between clones, so a test can keep
/// a handle from [`MockTranslator::call_counter`] after moving the mock into an engine.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    /// Simulated inference time
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl MockTranslator {
    /// Create a new MockTranslator with the given mode
    pub fn new(mode: MockMode) -> Self {
        Self::with_delay(mode, 0)
    }

    /// Create a MockTranslator that blocks for `delay_ms` on every call
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            mode,
            delay: Duration::from_millis(delay_ms),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Build a mapping mock from `(source text, translation)` pairs for one target
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mock = MockTranslator::from_pairs("de", [("hello", "hallo")]);
    /// ```
    pub fn from_pairs<'a>(
        target_locale: &str,
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let map = pairs
            .into_iter()
            .map(|(text, translation)| {
                (
                    (text.to_string(), target_locale.to_string()),
                    translation.to_string(),
                )
            })
            .collect();
        Self::new(MockMode::Mappings(map))
    }

    /// Number of times `translate` has been called on this mock or any clone of it
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Shared handle to the invocation counter
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    fn apply_translation(&self, text: &str, target: &str) -> MtResult<String> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::Reorder => {
                let words: Vec<&str> = text.split_whitespace().rev().collect();
                Ok(words.join(" "))
            }
            MockMode::Error(msg) => Err(MtError::TranslationError(msg.clone())),
            MockMode::Empty => Ok(String::new()),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

impl MachineTranslator for MockTranslator {
    fn translate(&self, text: &str, _source_locale: &str, target_locale: &str) -> MtResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.apply_translation(text, target_locale)
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}
