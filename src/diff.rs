//! Token diff engine
//!
//! Compares the tokens already emitted downstream with a fresh translation and works out
//! the smallest prefix-preserving patch:
//!
//! 1. Split the new translation on whitespace
//! 2. Walk old tokens and new words in lockstep from position 0
//! 3. While texts match, the old token is retained (not re-emitted)
//! 4. At the first mismatch, or when either side runs out, every remaining old token is
//!    revoked and every remaining new word is added
//!
//! There is no re-synchronisation after a mismatch: one changed word invalidates the
//! whole tail. This keeps the diff a single O(n) pass.
//!
//! # Example
//!
//! ```ignore
//! // old: [A, B, C]   new: "A B D"
//! // retained: [A, B]   revoked: [C]   added: ["D"]
//! ```

use crate::data::OutputToken;

/// Result of diffing emitted tokens against a new translation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenDiff {
    /// Old tokens whose text and position are unchanged, in order
    pub retained: Vec<OutputToken>,
    /// Old tokens past the first mismatch, marked revoked, in order
    pub revoked: Vec<OutputToken>,
    /// New words past the first mismatch, in order
    pub added: Vec<String>,
}

impl TokenDiff {
    /// True when applying this diff changes nothing downstream
    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty() && self.added.is_empty()
    }
}

/// Split a translation into whitespace-delimited tokens
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Diff `old_tokens` against `new_text`
///
/// Blank `new_text` tokenizes to nothing, so every old token is revoked.
pub fn diff(old_tokens: &[OutputToken], new_text: &str) -> TokenDiff {
    let new_words = tokenize(new_text);

    let common = old_tokens
        .iter()
        .zip(new_words.iter())
        .take_while(|(old, new)| old.text == **new)
        .count();

    let retained = old_tokens[..common].to_vec();
    let revoked = old_tokens[common..]
        .iter()
        .cloned()
        .map(|mut token| {
            token.revoked = true;
            token
        })
        .collect();
    let added = new_words[common..]
        .iter()
        .map(|word| word.to_string())
        .collect();

    TokenDiff {
        retained,
        revoked,
        added,
    }
}
