//! Operation log with merge-on-record and history compaction.

use crate::entity::EntityType;
use crate::error::{ProtocolError, ProtocolResult};
use crate::merge::{merge, MergeDecision};
use crate::operation::{Mutation, Operation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Number of synced operations kept for diagnostics by default.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// What recording a change did to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A new pending operation was appended.
    Appended,
    /// The change was folded into the entity's pending operation.
    Merged,
    /// The pending operation was dropped (create followed by delete).
    Discarded,
    /// The change had no effect (delete after a pending delete).
    Unchanged,
}

/// The ordered log of synced and unsynced operations.
///
/// # Invariants
///
/// - At most one unsynced operation per `(entity_type, entity_id)`
/// - Synced operations are never modified, only compacted away
/// - Insertion order is preserved; merges rewrite an entry in place
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationLog {
    entries: Vec<Operation>,
}

impl OperationLog {
    /// Creates a new empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a change for one entity.
    ///
    /// `in_flight` holds the IDs of operations currently being pushed; a
    /// pending create among them is treated as already delivered when
    /// merging. Every rewrite gives the operation a fresh ID, so a push
    /// that was in flight during the rewrite does not acknowledge it.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::EmptyEntityId`] for a blank entity ID
    /// - [`ProtocolError::EntityDeleted`] for an update after a pending delete
    ///
    /// The log is unchanged when an error is returned.
    pub fn record(
        &mut self,
        entity_type: EntityType,
        entity_id: &str,
        mutation: Mutation,
        now: u64,
        in_flight: &HashSet<String>,
    ) -> ProtocolResult<RecordOutcome> {
        if entity_id.trim().is_empty() {
            return Err(ProtocolError::EmptyEntityId);
        }

        let Some(index) = self.pending_index(entity_type, entity_id) else {
            self.entries
                .push(Operation::new(entity_type, entity_id, mutation, now));
            return Ok(RecordOutcome::Appended);
        };

        let existing = &mut self.entries[index];
        let shipped = in_flight.contains(&existing.id);

        match merge(existing.kind, mutation, shipped) {
            MergeDecision::Replace { kind, payload } => {
                existing.id = Operation::generate_id(entity_type, entity_id, now);
                existing.kind = kind;
                existing.payload = payload;
                existing.recorded_at = now;
                Ok(RecordOutcome::Merged)
            }
            MergeDecision::Remove => {
                self.entries.remove(index);
                Ok(RecordOutcome::Discarded)
            }
            MergeDecision::Keep => Ok(RecordOutcome::Unchanged),
            MergeDecision::Reject => Err(ProtocolError::EntityDeleted {
                entity_type,
                entity_id: entity_id.to_string(),
            }),
        }
    }

    fn pending_index(&self, entity_type: EntityType, entity_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|op| !op.synced && op.targets(entity_type, entity_id))
    }

    /// Returns the pending operation for an entity, if any.
    pub fn pending_for(&self, entity_type: EntityType, entity_id: &str) -> Option<&Operation> {
        self.pending_index(entity_type, entity_id)
            .map(|i| &self.entries[i])
    }

    /// Returns pending (unsynced) operations in recording order.
    pub fn pending(&self) -> impl Iterator<Item = &Operation> {
        self.entries.iter().filter(|op| !op.synced)
    }

    /// Returns the number of pending operations.
    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }

    /// Returns the number of synced operations kept as history.
    pub fn synced_count(&self) -> usize {
        self.entries.iter().filter(|op| op.synced).count()
    }

    /// Marks the given operations as synced.
    ///
    /// Only operations whose ID is still present are marked; an operation
    /// rewritten since it was sent carries a new ID and stays pending.
    /// Returns the number of operations marked.
    pub fn mark_synced(&mut self, ids: &HashSet<String>) -> usize {
        let mut marked = 0;
        for op in self.entries.iter_mut() {
            if !op.synced && ids.contains(&op.id) {
                op.synced = true;
                marked += 1;
            }
        }
        marked
    }

    /// Bounds synced history to the `history_limit` most recent entries.
    ///
    /// Unsynced operations are always kept. Survivors keep their order.
    /// Returns the number of operations removed.
    pub fn compact(&mut self, history_limit: usize) -> usize {
        let synced = self.synced_count();
        if synced <= history_limit {
            return 0;
        }

        let mut excess = synced - history_limit;
        let removed = excess;
        self.entries.retain(|op| {
            if op.synced && excess > 0 {
                excess -= 1;
                false
            } else {
                true
            }
        });
        removed
    }

    /// Restores the one-pending-per-entity invariant on a loaded log.
    ///
    /// When several unsynced operations exist for one entity only the
    /// latest in log order is kept. Returns the number of entries dropped.
    pub fn repair(&mut self) -> usize {
        let mut seen = HashSet::new();
        let before = self.entries.len();

        let mut kept: Vec<Operation> = Vec::with_capacity(before);
        for op in self.entries.drain(..).rev() {
            if op.synced || seen.insert((op.entity_type, op.entity_id.clone())) {
                kept.push(op);
            }
        }
        kept.reverse();
        self.entries = kept;

        before - self.entries.len()
    }

    /// Returns all entries, synced and unsynced.
    pub fn entries(&self) -> &[Operation] {
        &self.entries
    }

    /// Returns the total number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clears all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
