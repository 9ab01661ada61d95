//! # Undo/Redo History
//!
//! Bounded log of whole-state snapshots with a movable cursor.
//!
//! ## Design
//!
//! - Each entry stores the state immediately before and after one change
//! - `cursor` counts applied entries: undo returns `entries[cursor - 1].before`,
//!   redo returns `entries[cursor].after`
//! - Saving after one or more undos discards the abandoned redo branch
//! - When the log exceeds `max_entries` the oldest entry is evicted
//! - Batches group several changes into one entry
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = HistoryManager::new(50);
//! history.save_state(before, after, "add", "Add text component");
//!
//! if let Some(state) = history.undo() {
//!     restore(state.clone());
//! }
//! ```

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::state::BuilderState;

/// One undoable unit of change
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub action: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub before_state: BuilderState,
    pub after_state: BuilderState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total: usize,
    /// Number of applied entries
    pub current: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

#[derive(Debug, Clone)]
struct PendingBatch {
    before: BuilderState,
    action: String,
    description: String,
}

#[derive(Debug)]
pub struct HistoryManager {
    entries: VecDeque<HistoryEntry>,
    cursor: usize,
    max_entries: usize,
    next_id: u64,
    batch: Option<PendingBatch>,
    batch_depth: usize,
}

impl HistoryManager {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            max_entries: max_entries.max(1),
            next_id: 0,
            batch: None,
            batch_depth: 0,
        }
    }

    /// Record a change. Returns false when absorbed by an open batch.
    pub fn save_state(
        &mut self,
        before: BuilderState,
        after: BuilderState,
        action: impl Into<String>,
        description: impl Into<String>,
    ) -> bool {
        if self.is_batching() {
            return false;
        }

        self.push(before, after, action.into(), description.into());
        true
    }

    fn push(&mut self, before: BuilderState, after: BuilderState, action: String, description: String) {
        self.entries.truncate(self.cursor);

        self.next_id += 1;
        self.entries.push_back(HistoryEntry {
            id: format!("history-{}", self.next_id),
            action,
            description,
            timestamp: Utc::now(),
            before_state: before,
            after_state: after,
        });
        self.cursor = self.entries.len();

        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
            self.cursor -= 1;
        }

        debug!(entries = self.entries.len(), cursor = self.cursor, "Saved history entry");
    }

    /// Step back. Returns the state to restore, or None if there is nothing to undo.
    pub fn undo(&mut self) -> Option<&BuilderState> {
        if !self.can_undo() {
            return None;
        }

        self.cursor -= 1;
        self.entries.get(self.cursor).map(|entry| &entry.before_state)
    }

    /// Step forward. Returns the state to restore, or None if there is nothing to redo.
    pub fn redo(&mut self) -> Option<&BuilderState> {
        if !self.can_redo() {
            return None;
        }

        self.cursor += 1;
        self.entries.get(self.cursor - 1).map(|entry| &entry.after_state)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0 && !self.is_batching()
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len() && !self.is_batching()
    }

    /// The most recently applied entry
    pub fn current_entry(&self) -> Option<&HistoryEntry> {
        self.cursor.checked_sub(1).and_then(|index| self.entries.get(index))
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
        self.batch = None;
        self.batch_depth = 0;
    }

    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            total: self.entries.len(),
            current: self.cursor,
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }

    /// Description of the entry the next undo reverts
    pub fn undo_description(&self) -> Option<&str> {
        self.current_entry().map(|entry| entry.description.as_str())
    }

    /// Description of the entry the next redo reapplies
    pub fn redo_description(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(|entry| entry.description.as_str())
    }

    /// Start grouping changes into one entry
    ///
    /// Nested calls only deepen the batch; the outermost `before` wins.
    pub fn begin_batch(&mut self, before: BuilderState, action: impl Into<String>, description: impl Into<String>) {
        self.batch_depth += 1;
        if self.batch.is_none() {
            self.batch = Some(PendingBatch {
                before,
                action: action.into(),
                description: description.into(),
            });
        }
    }

    /// Close one batch level. The outermost close records the entry.
    ///
    /// Returns true if an entry was recorded; a batch that changed nothing records none.
    pub fn end_batch(&mut self, after: BuilderState) -> bool {
        if self.batch_depth == 0 {
            return false;
        }

        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return false;
        }

        match self.batch.take() {
            Some(batch) if batch.before != after => {
                self.push(batch.before, after, batch.action, batch.description);
                true
            }
            _ => false,
        }
    }

    /// Abandon the open batch at every level. Returns its `before` state.
    pub fn discard_batch(&mut self) -> Option<BuilderState> {
        self.batch_depth = 0;
        self.batch.take().map(|batch| batch.before)
    }

    pub fn is_batching(&self) -> bool {
        self.batch.is_some()
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(50)
    }
}
