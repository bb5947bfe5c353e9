//! Deadline wrapper for blocking translators
//!
//! Oracle calls cannot be interrupted. `TimeoutTranslator` runs each call on its own
//! thread and stops waiting once the deadline passes; the abandoned call keeps running
//! and its result is dropped.

use crate::error::{MtError, MtResult};
use crate::translator::MachineTranslator;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

/// Fails any translation that takes longer than `timeout`
#[derive(Clone)]
pub struct TimeoutTranslator {
    inner: Arc<dyn MachineTranslator>,
    timeout: Duration,
    name: String,
}

impl TimeoutTranslator {
    pub fn new(inner: Arc<dyn MachineTranslator>, timeout: Duration) -> Self {
        let name = format!("{} (timeout {}ms)", inner.provider_name(), timeout.as_millis());
        Self {
            inner,
            timeout,
            name,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl std::fmt::Debug for TimeoutTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeoutTranslator")
            .field("inner", &self.inner.provider_name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl MachineTranslator for TimeoutTranslator {
    fn translate(&self, text: &str, source_locale: &str, target_locale: &str) -> MtResult<String> {
        let (sender, receiver) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let (text, source, target) = (
            text.to_string(),
            source_locale.to_string(),
            target_locale.to_string(),
        );

        std::thread::Builder::new()
            .name("oracle-call".to_string())
            .spawn(move || {
                // The receiver is gone once the caller gave up.
                let _ = sender.send(inner.translate(&text, &source, &target));
            })
            .map_err(|e| MtError::Other(format!("Failed to spawn oracle thread: {}", e)))?;

        match receiver.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    provider = self.inner.provider_name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "oracle call abandoned"
                );
                Err(MtError::OracleTimeout(self.timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(MtError::TranslationError(format!(
                "{} panicked during translation",
                self.inner.provider_name()
            ))),
        }
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}
