//! Core data structures exchanged with neighbouring pipeline stages
//!
//! Inbound messages carry [`Fragment`]s of source text, outbound messages carry
//! [`OutputToken`]s of translated text. Both travel inside an [`UpdateMessage`], an
//! ordered list of units paired with the operation to apply to them.

use serde::{Deserialize, Serialize};

/// Identity assigned to a unit by whoever created it
pub type FragmentId = u64;

/// Operation applied to a unit by the receiving stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateType {
    Add,
    Revoke,
    Commit,
}

/// A unit of incoming source text
///
/// Identity comes from the upstream stage; this engine never invents fragment ids.
///
/// # Example
///
/// ```ignore
/// Fragment { id: 7, text: "hello".to_string(), committed: false }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub id: FragmentId,
    pub text: String,
    /// Set by upstream on the last fragment of an utterance. Only consulted by the
    /// flag-based finalization policy; COMMIT operations set it as well.
    #[serde(default)]
    pub committed: bool,
}

impl Fragment {
    pub fn new(id: FragmentId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            committed: false,
        }
    }

    /// A fragment that marks the end of its utterance
    pub fn terminal(id: FragmentId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            committed: true,
        }
    }
}

/// A single whitespace-delimited token of emitted translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputToken {
    /// Identity minted by the controller, unique for the lifetime of the engine
    pub id: FragmentId,
    /// The most recently added input fragment at the time this token was produced
    pub grounded_in: Option<FragmentId>,
    pub text: String,
    #[serde(default)]
    pub committed: bool,
    #[serde(default)]
    pub revoked: bool,
}

impl OutputToken {
    pub fn new(id: FragmentId, grounded_in: Option<FragmentId>, text: impl Into<String>) -> Self {
        Self {
            id,
            grounded_in,
            text: text.into(),
            committed: false,
            revoked: false,
        }
    }
}

/// Ordered batch of `(unit, operation)` pairs
///
/// Serialized as a plain JSON array of `[unit, "add" | "revoke" | "commit"]` pairs.
/// Consumers apply the pairs in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdateMessage<T> {
    updates: Vec<(T, UpdateType)>,
}

impl<T> Default for UpdateMessage<T> {
    fn default() -> Self {
        Self {
            updates: Vec::new(),
        }
    }
}

impl<T> UpdateMessage<T> {
    /// Create an empty message
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a message holding a single update
    pub fn from_unit(unit: T, update_type: UpdateType) -> Self {
        Self {
            updates: vec![(unit, update_type)],
        }
    }

    /// Append an update to the end of the message
    pub fn add_unit(&mut self, unit: T, update_type: UpdateType) {
        self.updates.push((unit, update_type));
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(T, UpdateType)> {
        self.updates.iter()
    }

    /// All units carried with the given operation, in message order
    pub fn units_of(&self, update_type: UpdateType) -> Vec<&T> {
        self.updates
            .iter()
            .filter(|(_, ut)| *ut == update_type)
            .map(|(unit, _)| unit)
            .collect()
    }
}

impl<T> FromIterator<(T, UpdateType)> for UpdateMessage<T> {
    fn from_iter<I: IntoIterator<Item = (T, UpdateType)>>(iter: I) -> Self {
        Self {
            updates: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for UpdateMessage<T> {
    type Item = (T, UpdateType);
    type IntoIter = std::vec::IntoIter<(T, UpdateType)>;

    fn into_iter(self) -> Self::IntoIter {
        self.updates.into_iter()
    }
}

impl UpdateMessage<OutputToken> {
    /// Texts of the units carried with the given operation
    pub fn texts_of(&self, update_type: UpdateType) -> Vec<&str> {
        self.units_of(update_type)
            .into_iter()
            .map(|token| token.text.as_str())
            .collect()
    }
}
