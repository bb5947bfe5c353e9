//! Translation oracle trait and language pair selection
//!
//! This module defines the `MachineTranslator` trait, the boundary between the
//! reconciliation engine and whatever actually produces translations (a remote API,
//! a local model, or the deterministic mock used in tests).
//!
//! # Example
//!
//! ```ignore
//! use incremental_mt::{LanguagePair, MachineTranslator, MockMode, MockTranslator};
//!
//! let pair = LanguagePair::new("en", "de")?;
//! let mock = MockTranslator::new(MockMode::Suffix);
//! let result = mock.translate("hello", pair.source(), pair.target())?;
//! assert_eq!(result, "hello_de");
//! ```

use crate::error::{MtError, MtResult};
use icu_locale::Locale;
use std::sync::Arc;

/// Synchronous translation oracle
///
/// Calls block the caller until the translation is available. Implementations must be
/// free of observable side effects: the same input is expected to yield the same output.
pub trait MachineTranslator: Send + Sync {
    /// Translate `text` from `source_locale` to `target_locale`
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The translated text
    /// * `Err(MtError)` - If translation fails
    fn translate(&self, text: &str, source_locale: &str, target_locale: &str) -> MtResult<String>;

    /// Name of this provider, used in logs
    fn provider_name(&self) -> &str;
}

impl<T: MachineTranslator + ?Sized> MachineTranslator for Arc<T> {
    fn translate(&self, text: &str, source_locale: &str, target_locale: &str) -> MtResult<String> {
        (**self).translate(text, source_locale, target_locale)
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }
}

impl<T: MachineTranslator + ?Sized> MachineTranslator for Box<T> {
    fn translate(&self, text: &str, source_locale: &str, target_locale: &str) -> MtResult<String> {
        (**self).translate(text, source_locale, target_locale)
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }
}

/// Directed pairs with a dedicated opus-mt model
const SUPPORTED_PAIRS: &[(&str, &str, &str)] = &[
    ("en", "fr", "Helsinki-NLP/opus-mt-en-fr"),
    ("fr", "en", "Helsinki-NLP/opus-mt-fr-en"),
    ("en", "de", "Helsinki-NLP/opus-mt-en-de"),
    ("de", "en", "Helsinki-NLP/opus-mt-de-en"),
    ("es", "en", "Helsinki-NLP/opus-mt-es-en"),
    ("en", "es", "Helsinki-NLP/opus-mt-en-es"),
    ("fr", "de", "Helsinki-NLP/opus-mt-fr-de"),
    ("de", "fr", "Helsinki-NLP/opus-mt-de-fr"),
];

/// A validated (source, target) language pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    source: String,
    target: String,
    model: &'static str,
}

impl LanguagePair {
    /// Validate a pair against the supported table
    ///
    /// Locale codes are reduced to their language subtag first, so `en-US` → `de-AT`
    /// selects the `en` → `de` model.
    ///
    /// # Returns
    ///
    /// * `Ok(LanguagePair)` - The pair is supported
    /// * `Err(MtError::InvalidLocale)` - A code is malformed
    /// * `Err(MtError::UnsupportedLanguagePair)` - Both codes are valid but no model serves them
    pub fn new(source_locale: &str, target_locale: &str) -> MtResult<Self> {
        let source = normalize_locale(source_locale)?;
        let target = normalize_locale(target_locale)?;

        let model = SUPPORTED_PAIRS
            .iter()
            .find(|&&(s, t, _)| s == source && t == target)
            .map(|&(_, _, model)| model);

        match model {
            Some(model) => Ok(Self {
                source,
                target,
                model,
            }),
            None => Err(MtError::UnsupportedLanguagePair(source, target)),
        }
    }

    /// Every supported pair, in table order
    pub fn supported() -> Vec<LanguagePair> {
        SUPPORTED_PAIRS
            .iter()
            .map(|&(source, target, model)| LanguagePair {
                source: source.to_string(),
                target: target.to_string(),
                model,
            })
            .collect()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Name of the model serving this pair
    pub fn model_name(&self) -> &'static str {
        self.model
    }
}

impl std::fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.source, self.target)
    }
}

/// Normalize a locale code by stripping region and script information
///
/// - `en-US` → `en`
/// - `zh-Hans` → `zh`
/// - `de_DE` → `de`
/// - `EN` → `en`
pub fn normalize_locale(locale: &str) -> MtResult<String> {
    validate_locale(locale)?;

    let parsed: Locale = locale.replace('_', "-").parse().map_err(|e| {
        MtError::InvalidLocale(format!("Cannot parse locale '{}': {:?}", locale, e))
    })?;

    Ok(parsed.id.language.as_str().to_string())
}

/// Validate that a locale code is in acceptable format
///
/// Checks that the locale code contains only alphanumeric characters,
/// hyphens, and underscores.
pub fn validate_locale(locale: &str) -> MtResult<()> {
    if locale.is_empty() {
        return Err(MtError::InvalidLocale("Locale code is empty".to_string()));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(MtError::InvalidLocale(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}
