//! Finalization tracking
//!
//! Decides when the current utterance is complete. Two policies are available; the
//! operation-based one is the default because the trigger is explicit in the stream.
//!
//! - **OperationBased**: a COMMIT operation that newly commits a live input fragment
//! - **FlagBased**: an ADD operation whose fragment carries the terminal `committed` flag
//!
//! Once triggered, finalization stays pending until the controller completes a
//! reconciliation pass and calls [`FinalizationTracker::reset`]. A failed oracle call in
//! between does not lose the pending commit.

use crate::data::{Fragment, UpdateType};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which inbound signal ends an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FinalizationPolicy {
    #[default]
    #[serde(rename = "operation")]
    OperationBased,
    #[serde(rename = "flag")]
    FlagBased,
}

impl FromStr for FinalizationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operation" => Ok(FinalizationPolicy::OperationBased),
            "flag" => Ok(FinalizationPolicy::FlagBased),
            other => Err(format!(
                "Unknown finalization policy '{}' (expected 'operation' or 'flag')",
                other
            )),
        }
    }
}

impl std::fmt::Display for FinalizationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinalizationPolicy::OperationBased => write!(f, "operation"),
            FinalizationPolicy::FlagBased => write!(f, "flag"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FinalizationTracker {
    policy: FinalizationPolicy,
    pending: bool,
}

impl FinalizationTracker {
    pub fn new(policy: FinalizationPolicy) -> Self {
        Self {
            policy,
            pending: false,
        }
    }

    /// Record an inbound update
    ///
    /// `applied` tells whether the input buffer accepted the update; redundant
    /// updates (duplicate ADD, repeated COMMIT) never trigger finalization.
    pub fn observe(&mut self, update_type: UpdateType, fragment: &Fragment, applied: bool) {
        if !applied {
            return;
        }
        let triggers = match (self.policy, update_type) {
            (FinalizationPolicy::OperationBased, UpdateType::Commit) => true,
            (FinalizationPolicy::FlagBased, UpdateType::Add) => fragment.committed,
            _ => false,
        };
        if triggers && !self.pending {
            tracing::debug!(policy = %self.policy, fragment = fragment.id, "finalization pending");
            self.pending = true;
        }
    }

    /// Whether the next reconciliation pass must finalize the utterance
    pub fn is_final(&self) -> bool {
        self.pending
    }

    /// Clear the pending finalization once it has been carried out
    pub fn reset(&mut self) {
        self.pending = false;
    }

    pub fn policy(&self) -> FinalizationPolicy {
        self.policy
    }
}
