//! # Selection
//!
//! Ordered, duplicate-free list of selected node ids. The first entry is the
//! active node.

use serde::{Deserialize, Serialize};

use crate::events::BuilderEvent;
use crate::store::ComponentStore;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionModel {
    selected: Vec<String>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection, or extend it when `append` is set
    ///
    /// Ids that are not in the store are skipped. Returns true if the selection changed.
    pub fn select<I, S>(&mut self, ids: I, append: bool, store: &ComponentStore) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let previous = self.selected.clone();

        if !append {
            self.selected.clear();
        }
        for id in ids {
            let id = id.as_ref();
            if store.contains(id) && !self.contains(id) {
                self.selected.push(id.to_string());
            }
        }

        previous != self.selected
    }

    /// Returns true if anything was selected
    pub fn clear(&mut self) -> bool {
        let changed = !self.selected.is_empty();
        self.selected.clear();
        changed
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn active(&self) -> Option<&str> {
        self.selected.first().map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selected.iter().any(|selected| selected == id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Drop removed ids. Returns true if the selection changed.
    pub fn prune(&mut self, removed: &[String]) -> bool {
        let before = self.selected.len();
        self.selected.retain(|id| !removed.contains(id));
        before != self.selected.len()
    }

    /// React to a store event. Returns true if the selection changed.
    pub fn observe(&mut self, event: &BuilderEvent) -> bool {
        match event {
            BuilderEvent::NodeRemoved { removed_ids, .. } => self.prune(removed_ids),
            BuilderEvent::TreeCleared => self.clear(),
            _ => false,
        }
    }

    /// Event describing the current selection
    pub fn changed_event(&self) -> BuilderEvent {
        BuilderEvent::SelectionChanged {
            selected: self.selected.clone(),
            active: self.active().map(str::to_string),
        }
    }
}
