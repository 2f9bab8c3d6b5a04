//! Write-once memo table for resolved targets.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use super::{BuildFailure, Outputs};
use crate::target::TargetId;

/// Result of resolving one target, shared by every consumer.
pub type Outcome = Result<Arc<Outputs>, BuildFailure>;

/// Outcomes keyed by target content address.
///
/// An entry is written once per distinct target and never replaced or
/// invalidated for the lifetime of the cache, which is one build run.
#[derive(Debug, Default)]
pub struct MemoCache {
    entries: HashMap<TargetId, Outcome>,
}

impl MemoCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored outcome for `id`, if any.
    #[must_use]
    pub fn get(&self, id: &TargetId) -> Option<&Outcome> {
        self.entries.get(id)
    }

    /// Store `outcome` unless `id` already has one, returning whichever
    /// outcome is now recorded.
    pub fn insert(&mut self, id: TargetId, outcome: Outcome) -> Outcome {
        match self.entries.entry(id) {
            Entry::Occupied(existing) => {
                tracing::debug!(id = %existing.key(), "memo entry already recorded");
                existing.get().clone()
            }
            Entry::Vacant(slot) => slot.insert(outcome).clone(),
        }
    }

    /// Number of recorded targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
