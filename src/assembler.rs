//! Input buffer and text assembly
//!
//! The input buffer holds the live fragments of the current utterance in the order
//! they were added. Revoked fragments are removed outright, nothing is tombstoned.

use crate::data::{Fragment, FragmentId};

/// Join live fragment texts in buffer order, separated by single spaces
///
/// # Example
///
/// ```ignore
/// let text = assemble(&[Fragment::new(1, "hello"), Fragment::new(2, "world")]);
/// assert_eq!(text, "hello world");
/// ```
pub fn assemble(buffer: &[Fragment]) -> String {
    buffer
        .iter()
        .map(|fragment| fragment.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Result of committing a fragment in the input buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The fragment was live and is now committed
    Committed,
    /// The fragment had been committed before
    AlreadyCommitted,
    /// No live fragment with that id
    Unknown,
}

/// Ordered live fragments of the current utterance
#[derive(Debug, Clone, Default)]
pub struct InputBuffer {
    fragments: Vec<Fragment>,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment
    ///
    /// Returns `false` without touching the buffer when a fragment with the same id is
    /// already live.
    pub fn add(&mut self, fragment: Fragment) -> bool {
        if self.contains(fragment.id) {
            return false;
        }
        self.fragments.push(fragment);
        true
    }

    /// Remove a fragment; `false` if it was not live
    pub fn revoke(&mut self, id: FragmentId) -> bool {
        match self.fragments.iter().position(|f| f.id == id) {
            Some(index) => {
                self.fragments.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn commit(&mut self, id: FragmentId) -> CommitOutcome {
        match self.fragments.iter_mut().find(|f| f.id == id) {
            Some(fragment) if fragment.committed => CommitOutcome::AlreadyCommitted,
            Some(fragment) => {
                fragment.committed = true;
                CommitOutcome::Committed
            }
            None => CommitOutcome::Unknown,
        }
    }

    pub fn contains(&self, id: FragmentId) -> bool {
        self.fragments.iter().any(|f| f.id == id)
    }

    /// Assembled source text of the live fragments
    pub fn text(&self) -> String {
        assemble(&self.fragments)
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn clear(&mut self) {
        self.fragments.clear();
    }
}
