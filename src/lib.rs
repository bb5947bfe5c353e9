//! Incremental machine translation
//!
//! This crate turns a live, revisable stream of source-text fragments into a live
//! stream of translated tokens, revising already emitted tokens as little as possible.
//! Each inbound batch of ADD / REVOKE / COMMIT operations triggers at most one call
//! into an expensive, blocking translation oracle, and only when the source text
//! actually changed or the utterance is being finalized.
//!
//! # Workflow Example
//!
//! ```ignore
//! use incremental_mt::{
//!     EngineConfig, Fragment, IncrementalTranslator, MockMode, MockTranslator,
//!     UpdateMessage, UpdateType,
//! };
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Validate configuration and pick the oracle
//!     let config = EngineConfig::default(); // en → de, operation-based finalization
//!     let oracle = Arc::new(MockTranslator::new(MockMode::Suffix));
//!     let mut engine = IncrementalTranslator::from_config(&config, oracle)?;
//!
//!     // 2. Feed upstream batches as they arrive
//!     let batch = UpdateMessage::from_unit(Fragment::new(1, "hello"), UpdateType::Add);
//!     if let Some(out) = engine.process_update(batch)? {
//!         // 3. Forward revokes, adds and commits downstream, in order
//!         println!("{}", serde_json::to_string(&out)?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod assembler;
pub mod config;
pub mod controller;
pub mod data;
pub mod diff;
pub mod error;
pub mod finalization;
pub mod google_translate;
pub mod mock;
pub mod oracle;
pub mod timeout;
pub mod translator;

// Integration tests (only available during testing)
#[cfg(test)]
mod integration_tests;

// Re-export main types for convenient access
pub use assembler::{CommitOutcome, InputBuffer, assemble};
pub use config::{EngineConfig, load_config_from_file, load_config_from_str};
pub use controller::{EngineState, IncrementalTranslator};
pub use data::{Fragment, FragmentId, OutputToken, UpdateMessage, UpdateType};
pub use diff::{TokenDiff, diff, tokenize};
pub use error::{MtError, MtResult};
pub use finalization::{FinalizationPolicy, FinalizationTracker};
pub use google_translate::GoogleTranslateProvider;
pub use mock::{MockMode, MockTranslator};
pub use oracle::OracleAdapter;
pub use timeout::TimeoutTranslator;
pub use translator::{LanguagePair, MachineTranslator, normalize_locale, validate_locale};
