use std::time::Duration;

/// Error types for the incremental translation engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MtError {
    /// Configuration could not be loaded or a provider could not be set up
    ConfigError(String),
    /// The (source, target) pair is not served by any known model
    UnsupportedLanguagePair(String, String),
    /// Malformed locale code
    InvalidLocale(String),
    /// The oracle raised or returned unusable output
    TranslationError(String),
    /// The oracle did not answer within the configured time
    OracleTimeout(Duration),
    /// Transport failure talking to a remote oracle
    NetworkError(String),
    /// General error with context
    Other(String),
}

impl MtError {
    /// True for every error raised while producing a translation.
    ///
    /// These are fatal for the current reconciliation pass only; configuration
    /// errors are fatal for the whole engine.
    pub fn is_oracle_failure(&self) -> bool {
        matches!(
            self,
            MtError::TranslationError(_) | MtError::OracleTimeout(_) | MtError::NetworkError(_)
        )
    }
}

impl std::fmt::Display for MtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MtError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            MtError::UnsupportedLanguagePair(source, target) => {
                write!(f, "Cannot translate from {} to {}", source, target)
            }
            MtError::InvalidLocale(msg) => write!(f, "Invalid locale: {}", msg),
            MtError::TranslationError(msg) => write!(f, "Translation error: {}", msg),
            MtError::OracleTimeout(after) => {
                write!(f, "Translation timed out after {}ms", after.as_millis())
            }
            MtError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            MtError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for MtError {}

impl From<reqwest::Error> for MtError {
    fn from(err: reqwest::Error) -> Self {
        MtError::NetworkError(err.to_string())
    }
}

impl From<serde_json::Error> for MtError {
    fn from(err: serde_json::Error) -> Self {
        MtError::ConfigError(format!("Invalid JSON: {}", err))
    }
}

impl From<std::io::Error> for MtError {
    fn from(err: std::io::Error) -> Self {
        MtError::ConfigError(err.to_string())
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;
