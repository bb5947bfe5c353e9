//! Reconciliation controller
//!
//! `IncrementalTranslator` is the pipeline stage itself. For every inbound batch it
//!
//! 1. applies ADD / REVOKE / COMMIT operations to the input buffer
//! 2. assembles the source text and stops early if nothing changed and the utterance
//!    is not being finalized
//! 3. asks the oracle for a translation (at most once per batch) and stops early if
//!    the translation is unchanged and the utterance is not being finalized
//! 4. diffs the translation against the emitted tokens and stages revokes and adds
//! 5. on finalization, stages a commit for every live token and clears all state
//!
//! The outbound batch is ordered revokes, then adds, then commits.
//!
//! # Example
//!
//! ```ignore
//! use incremental_mt::*;
//! use std::sync::Arc;
//!
//! let pair = LanguagePair::new("en", "de")?;
//! let mut engine = IncrementalTranslator::new(
//!     pair,
//!     FinalizationPolicy::OperationBased,
//!     Arc::new(MockTranslator::new(MockMode::Suffix)),
//! );
//!
//! let out = engine.process_update(UpdateMessage::from_unit(Fragment::new(1, "hello"), UpdateType::Add))?;
//! // out: [("hello_de", add)]
//! ```

use crate::assembler::{CommitOutcome, InputBuffer};
use crate::config::EngineConfig;
use crate::data::{Fragment, FragmentId, OutputToken, UpdateMessage, UpdateType};
use crate::diff::diff;
use crate::error::MtResult;
use crate::finalization::{FinalizationPolicy, FinalizationTracker};
use crate::oracle::OracleAdapter;
use crate::timeout::TimeoutTranslator;
use crate::translator::{LanguagePair, MachineTranslator};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle of one utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No live input and nothing emitted for the current utterance
    Idle,
    /// An utterance is in progress
    Accumulating,
}

/// Incremental translation stage
///
/// Owns every buffer exclusively. Batches must be fed one at a time; a host that
/// receives batches on several threads has to serialise access to the instance.
#[derive(Debug)]
pub struct IncrementalTranslator {
    oracle: OracleAdapter,
    tracker: FinalizationTracker,
    input: InputBuffer,
    /// Live tokens downstream currently believes in
    output: Vec<OutputToken>,
    /// Source text of the last oracle pass
    latest_text: String,
    /// Translation the output buffer currently renders
    latest_translation: String,
    latest_fragment: Option<FragmentId>,
    next_token_id: FragmentId,
}

impl IncrementalTranslator {
    pub fn new(
        pair: LanguagePair,
        policy: FinalizationPolicy,
        translator: Arc<dyn MachineTranslator>,
    ) -> Self {
        info!(
            pair = %pair,
            model = pair.model_name(),
            provider = translator.provider_name(),
            policy = %policy,
            "incremental translator ready"
        );
        Self {
            oracle: OracleAdapter::new(translator, pair),
            tracker: FinalizationTracker::new(policy),
            input: InputBuffer::new(),
            output: Vec::new(),
            latest_text: String::new(),
            latest_translation: String::new(),
            latest_fragment: None,
            next_token_id: 0,
        }
    }

    /// Build an engine from configuration
    ///
    /// Fails before any processing when the language pair is unsupported. A configured
    /// oracle timeout wraps `translator` in a [`TimeoutTranslator`].
    pub fn from_config(
        config: &EngineConfig,
        translator: Arc<dyn MachineTranslator>,
    ) -> MtResult<Self> {
        let pair = config.language_pair()?;
        let translator: Arc<dyn MachineTranslator> = match config.oracle_timeout()? {
            Some(timeout) => Arc::new(TimeoutTranslator::new(translator, timeout)),
            None => translator,
        };
        Ok(Self::new(pair, config.finalization, translator))
    }

    /// Run one reconciliation pass for an inbound batch
    ///
    /// # Returns
    ///
    /// * `Ok(Some(message))` - Revokes, adds and commits to forward downstream
    /// * `Ok(None)` - Nothing changed downstream
    /// * `Err(MtError)` - The oracle failed; no output was changed, the input operations
    ///   remain applied and a pending finalization is kept for the next pass
    pub fn process_update(
        &mut self,
        message: UpdateMessage<Fragment>,
    ) -> MtResult<Option<UpdateMessage<OutputToken>>> {
        for (fragment, update_type) in message {
            self.apply(fragment, update_type);
        }

        let finalizing = self.tracker.is_final();
        let current_text = self.input.text();
        if !finalizing && current_text == self.latest_text {
            debug!("source text unchanged, skipping oracle");
            return Ok(None);
        }

        let translation = self.oracle.translate(&current_text)?;
        self.latest_text = current_text;

        let mut outbound = UpdateMessage::new();
        if translation != self.latest_translation {
            let patch = diff(&self.output, &translation);
            debug!(
                retained = patch.retained.len(),
                revoked = patch.revoked.len(),
                added = patch.added.len(),
                "translation revised"
            );

            for token in patch.revoked {
                outbound.add_unit(token, UpdateType::Revoke);
            }
            let mut live = patch.retained;
            for word in patch.added {
                let token = self.mint_token(word);
                outbound.add_unit(token.clone(), UpdateType::Add);
                live.push(token);
            }
            self.output = live;
            self.latest_translation = translation;
        } else if !finalizing {
            debug!("translation unchanged");
            return Ok(None);
        }

        if finalizing {
            info!(
                source = self.latest_text.as_str(),
                translation = self.latest_translation.as_str(),
                tokens = self.output.len(),
                "utterance finalized"
            );
            for mut token in std::mem::take(&mut self.output) {
                token.committed = true;
                outbound.add_unit(token, UpdateType::Commit);
            }
            self.reset();
        }

        Ok((!outbound.is_empty()).then_some(outbound))
    }

    /// Drop every buffer and start a fresh utterance
    ///
    /// Token ids keep counting so identities stay unique across utterances.
    pub fn reset(&mut self) {
        self.input.clear();
        self.output.clear();
        self.latest_text.clear();
        self.latest_translation.clear();
        self.latest_fragment = None;
        self.tracker.reset();
    }

    fn apply(&mut self, mut fragment: Fragment, update_type: UpdateType) {
        let policy = self.tracker.policy();
        let applied = match update_type {
            UpdateType::Add => {
                if policy == FinalizationPolicy::OperationBased {
                    // Only a COMMIT operation may commit under this policy.
                    fragment.committed = false;
                }
                if self.state() == EngineState::Idle {
                    debug!(fragment = fragment.id, "utterance started");
                }
                let id = fragment.id;
                let added = self.input.add(fragment.clone());
                if added {
                    self.latest_fragment = Some(id);
                } else {
                    warn!(fragment = id, "ignoring ADD of a fragment that is already live");
                }
                added
            }
            UpdateType::Revoke => {
                let revoked = self.input.revoke(fragment.id);
                if !revoked {
                    warn!(fragment = fragment.id, "ignoring REVOKE of unknown fragment");
                }
                revoked
            }
            UpdateType::Commit => match policy {
                FinalizationPolicy::OperationBased => match self.input.commit(fragment.id) {
                    CommitOutcome::Committed => true,
                    CommitOutcome::AlreadyCommitted => {
                        warn!(fragment = fragment.id, "ignoring repeated COMMIT");
                        false
                    }
                    CommitOutcome::Unknown => {
                        warn!(fragment = fragment.id, "ignoring COMMIT of unknown fragment");
                        false
                    }
                },
                FinalizationPolicy::FlagBased => {
                    debug!(fragment = fragment.id, "COMMIT ignored under flag policy");
                    false
                }
            },
        };
        self.tracker.observe(update_type, &fragment, applied);
    }

    fn mint_token(&mut self, text: String) -> OutputToken {
        let token = OutputToken::new(self.next_token_id, self.latest_fragment, text);
        self.next_token_id += 1;
        token
    }

    pub fn state(&self) -> EngineState {
        if self.input.is_empty() && self.output.is_empty() {
            EngineState::Idle
        } else {
            EngineState::Accumulating
        }
    }

    /// Assembled source text of the live input fragments
    pub fn current_text(&self) -> String {
        self.input.text()
    }

    /// Live output tokens, in order
    pub fn output_tokens(&self) -> &[OutputToken] {
        &self.output
    }

    pub fn latest_translation(&self) -> &str {
        &self.latest_translation
    }

    /// Number of oracle calls made by this engine
    pub fn oracle_calls(&self) -> usize {
        self.oracle.call_count()
    }

    pub fn language_pair(&self) -> &LanguagePair {
        self.oracle.language_pair()
    }

    pub fn policy(&self) -> FinalizationPolicy {
        self.tracker.policy()
    }
}
