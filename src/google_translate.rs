//! Google Translate API provider
//!
//! This module integrates with Google Translate API v2 as a remote translation
//! oracle. Requests are blocking: the engine waits for the answer before it accepts
//! the next batch.
//!
//! # Authentication
//!
//! The provider loads the API key from the `GOOGLE_TRANSLATE_API_KEY`
//! environment variable. Obtain a key from:
//! https://console.cloud.google.com/
//!
//! # Example
//!
//! ```ignore
//! use incremental_mt::{GoogleTranslateProvider, MachineTranslator};
//!
//! let provider = GoogleTranslateProvider::from_env()?;
//! let result = provider.translate("Hello, world!", "en", "fr")?;
//! println!("{}", result);
//! ```

use crate::error::{MtError, MtResult};
use crate::translator::{MachineTranslator, normalize_locale};
use serde_json::{Value, json};
use std::time::Duration;

/// Google Translate API v2 provider
#[derive(Clone)]
pub struct GoogleTranslateProvider {
    /// API key for authentication
    api_key: String,
    client: reqwest::blocking::Client,
    /// Base URL for Google Translate API
    base_url: String,
}

impl GoogleTranslateProvider {
    /// Maximum characters per string (30KB per Google Translate API limits)
    const MAX_CHARS_PER_STRING: usize = 30_000;

    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a new GoogleTranslateProvider with an explicit API key
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - New provider instance
    /// * `Err(MtError)` - If API key is empty or HTTP client creation fails
    pub fn new(api_key: String) -> MtResult<Self> {
        if api_key.trim().is_empty() {
            return Err(MtError::ConfigError("API key cannot be empty".to_string()));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            client,
            base_url: "https://translation.googleapis.com/language/translate/v2".to_string(),
        })
    }

    /// Create a GoogleTranslateProvider from the `GOOGLE_TRANSLATE_API_KEY` environment variable
    pub fn from_env() -> MtResult<Self> {
        let api_key = std::env::var("GOOGLE_TRANSLATE_API_KEY").map_err(|_| {
            MtError::ConfigError(
                "GOOGLE_TRANSLATE_API_KEY environment variable not set".to_string(),
            )
        })?;

        Self::new(api_key)
    }

    /// JSON body of a v2 translation request
    fn request_body(text: &str, source_locale: &str, target_locale: &str) -> MtResult<Value> {
        Ok(json!({
            "q": [text],
            "source": normalize_locale(source_locale)?,
            "target": normalize_locale(target_locale)?,
            "format": "text"
        }))
    }

    /// Extract `data.translations[*].translatedText` from a v2 response
    fn parse_translations(json: &Value) -> MtResult<Vec<String>> {
        let translations = json["data"]["translations"].as_array().ok_or_else(|| {
            MtError::TranslationError(
                "Invalid API response: missing 'data.translations' array".to_string(),
            )
        })?;

        translations
            .iter()
            .map(|t| {
                t["translatedText"]
                    .as_str()
                    .map(|s| s.to_string())
                    .ok_or_else(|| {
                        MtError::TranslationError(
                            "Invalid API response: missing 'translatedText' field".to_string(),
                        )
                    })
            })
            .collect()
    }
}

impl std::fmt::Debug for GoogleTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslateProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl MachineTranslator for GoogleTranslateProvider {
    fn translate(&self, text: &str, source_locale: &str, target_locale: &str) -> MtResult<String> {
        let body = Self::request_body(text, source_locale, target_locale)?;

        if text.is_empty() {
            return Ok(String::new());
        }

        if text.len() > Self::MAX_CHARS_PER_STRING {
            return Err(MtError::TranslationError(format!(
                "Text exceeds maximum length of {} characters",
                Self::MAX_CHARS_PER_STRING
            )));
        }

        let url = format!("{}?key={}", self.base_url, self.api_key);
        let response = self.client.post(&url).json(&body).send()?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(if status.is_client_error() {
                MtError::ConfigError(format!("API client error ({}): {}", status, error_text))
            } else {
                MtError::TranslationError(format!("API server error ({}): {}", status, error_text))
            });
        }

        let json: Value = response.json().map_err(|e| {
            MtError::TranslationError(format!("Failed to parse API response: {}", e))
        })?;

        Self::parse_translations(&json)?
            .into_iter()
            .next()
            .ok_or_else(|| MtError::TranslationError("API returned no translations".to_string()))
    }

    fn provider_name(&self) -> &str {
        "Google Translate"
    }
}
