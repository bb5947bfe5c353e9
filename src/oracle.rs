//! Translation oracle adapter
//!
//! Binds a translator to the engine's language pair and enforces the contract the
//! reconciliation controller relies on: blank input never reaches the oracle, and blank
//! output for non-blank input is a failure rather than an "empty translation".

use crate::error::{MtError, MtResult};
use crate::translator::{LanguagePair, MachineTranslator};
use std::sync::Arc;
use std::time::Instant;

pub struct OracleAdapter {
    translator: Arc<dyn MachineTranslator>,
    pair: LanguagePair,
    calls: usize,
}

impl OracleAdapter {
    pub fn new(translator: Arc<dyn MachineTranslator>, pair: LanguagePair) -> Self {
        Self {
            translator,
            pair,
            calls: 0,
        }
    }

    /// Translate the assembled source text
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The translation; empty only when `text` is blank
    /// * `Err(MtError)` - The oracle failed or returned nothing for non-blank input
    pub fn translate(&mut self, text: &str) -> MtResult<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        self.calls += 1;
        let started = Instant::now();
        let translation = self
            .translator
            .translate(text, self.pair.source(), self.pair.target())?;

        tracing::debug!(
            provider = self.translator.provider_name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            source = text,
            translation = translation.as_str(),
            "oracle call"
        );

        if translation.trim().is_empty() {
            return Err(MtError::TranslationError(format!(
                "{} returned an empty translation for non-empty input",
                self.translator.provider_name()
            )));
        }

        Ok(translation)
    }

    /// Number of calls forwarded to the oracle so far
    pub fn call_count(&self) -> usize {
        self.calls
    }

    pub fn language_pair(&self) -> &LanguagePair {
        &self.pair
    }

    pub fn provider_name(&self) -> &str {
        self.translator.provider_name()
    }
}

impl std::fmt::Debug for OracleAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleAdapter")
            .field("provider", &self.translator.provider_name())
            .field("pair", &self.pair)
            .field("calls", &self.calls)
            .finish()
    }
}
