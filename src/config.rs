//! Engine configuration
//!
//! Configuration is a small JSON document; every field is optional:
//!
//! ```json
//! {
//!     "source_language": "en",
//!     "target_language": "de",
//!     "finalization": "operation",
//!     "oracle_timeout_ms": 2000
//! }
//! ```

use crate::error::{MtError, MtResult};
use crate::finalization::FinalizationPolicy;
use crate::translator::LanguagePair;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub source_language: String,
    pub target_language: String,
    pub finalization: FinalizationPolicy,
    /// Give up on an oracle call after this many milliseconds; no limit when absent
    pub oracle_timeout_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            source_language: "en".to_string(),
            target_language: "de".to_string(),
            finalization: FinalizationPolicy::default(),
            oracle_timeout_ms: None,
        }
    }
}

impl EngineConfig {
    /// Validate the configured languages against the supported pairs
    pub fn language_pair(&self) -> MtResult<LanguagePair> {
        LanguagePair::new(&self.source_language, &self.target_language)
    }

    pub fn oracle_timeout(&self) -> MtResult<Option<Duration>> {
        match self.oracle_timeout_ms {
            Some(0) => Err(MtError::ConfigError(
                "oracle_timeout_ms must be greater than zero".to_string(),
            )),
            Some(ms) => Ok(Some(Duration::from_millis(ms))),
            None => Ok(None),
        }
    }
}

/// Parse a configuration from a JSON string
pub fn load_config_from_str(content: &str) -> MtResult<EngineConfig> {
    Ok(serde_json::from_str(content)?)
}

/// Load configuration from a JSON file
///
/// # Errors
/// - File not found or unreadable
/// - Invalid JSON or unknown fields
pub fn load_config_from_file(path: &Path) -> MtResult<EngineConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        MtError::ConfigError(format!("Failed to read file '{}': {}", path.display(), e))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        MtError::ConfigError(format!(
            "Failed to parse JSON from '{}': {}",
            path.display(),
            e
        ))
    })
}
