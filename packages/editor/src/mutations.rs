//! # Structural Mutations
//!
//! Every change to the component forest goes through a [`Mutation`].
//!
//! ## Mutation Semantics
//!
//! ### AddNode
//! - Inserts the node and its whole subtree
//! - Missing ids are generated before validation
//! - Fails if the parent is absent or any id is already taken
//!
//! ### RemoveNode
//! - Removes the node and all descendants
//! - Removing an absent id fails and leaves the forest unchanged
//!
//! ### UpdateNode
//! - Shallow merge: each field in the patch replaces the stored field wholesale
//! - The merged node must still pass the structural checks
//!
//! ### MoveNode
//! - Atomic relocation under a new parent (or to the root list)
//! - Fails if it would create a cycle
//!
//! Validation happens before the store is touched, so a failed mutation never
//! leaves a partial change behind.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wb_common::{ComponentMetadata, ComponentNode, Events, IdGenerator, Props, Styles};
use wb_linter::ValidationEngine;

use crate::store::ComponentStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Mutation {
    /// Insert a node (and its children) under `parent_id`, or as a root
    #[serde(rename_all = "camelCase")]
    AddNode {
        node: ComponentNode,
        parent_id: Option<String>,
        index: Option<usize>,
    },

    /// Remove a node and every descendant
    #[serde(rename_all = "camelCase")]
    RemoveNode { node_id: String },

    /// Shallow-merge fields into a node
    #[serde(rename_all = "camelCase")]
    UpdateNode { node_id: String, patch: NodePatch },

    /// Move a node to a new parent (None = root list) at index
    #[serde(rename_all = "camelCase")]
    MoveNode {
        node_id: String,
        new_parent_id: Option<String>,
        index: usize,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Duplicate component ID: {0}")]
    DuplicateId(String),

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
}

/// Partial node fields for [`Mutation::UpdateNode`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Props>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ComponentMetadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<Styles>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Events>,
}

impl NodePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn component_type(mut self, component_type: impl Into<String>) -> Self {
        self.component_type = Some(component_type.into());
        self
    }

    pub fn props(mut self, props: Props) -> Self {
        self.props = Some(props);
        self
    }

    pub fn metadata(mut self, metadata: ComponentMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn styles(mut self, styles: Styles) -> Self {
        self.styles = Some(styles);
        self
    }

    pub fn events(mut self, events: Events) -> Self {
        self.events = Some(events);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &NodePatch::default()
    }
}

/// What a successfully applied mutation changed
#[derive(Debug, Clone, PartialEq)]
pub enum MutationResult {
    /// The finalized node, ids assigned
    Added { node: ComponentNode },
    Removed { id: String, removed_ids: Vec<String> },
    Updated { node: ComponentNode },
    Moved {
        id: String,
        parent_id: Option<String>,
        index: usize,
    },
}

impl Mutation {
    /// Apply mutation to the store with validation
    pub fn apply(
        &self,
        store: &mut ComponentStore,
        ids: &mut IdGenerator,
        engine: &ValidationEngine,
    ) -> Result<MutationResult, MutationError> {
        match self {
            Mutation::AddNode { node, parent_id, index } => {
                if let Some(parent_id) = parent_id {
                    if !store.contains(parent_id) {
                        return Err(MutationError::ParentNotFound(parent_id.clone()));
                    }
                }

                let mut node = node.clone();
                store.assign_ids(&mut node, ids);
                check_structure(engine, &node)?;

                let id = store.add(node, parent_id.as_deref(), *index)?;
                let node = store
                    .tree(&id)
                    .ok_or_else(|| MutationError::NodeNotFound(id.clone()))?;
                Ok(MutationResult::Added { node })
            }

            Mutation::RemoveNode { node_id } => {
                let removed_ids = store.remove(node_id)?;
                Ok(MutationResult::Removed {
                    id: node_id.clone(),
                    removed_ids,
                })
            }

            Mutation::UpdateNode { node_id, patch } => {
                let preview = store.preview_update(node_id, patch)?;
                check_structure(engine, &preview)?;

                store.update(node_id, patch)?;
                Ok(MutationResult::Updated { node: preview })
            }

            Mutation::MoveNode { node_id, new_parent_id, index } => {
                let index = store.move_node(node_id, new_parent_id.as_deref(), *index)?;
                Ok(MutationResult::Moved {
                    id: node_id.clone(),
                    parent_id: new_parent_id.clone(),
                    index,
                })
            }
        }
    }

    /// Validate without applying
    pub fn validate(&self, store: &ComponentStore) -> Result<(), MutationError> {
        match self {
            Mutation::AddNode { parent_id, .. } => match parent_id {
                Some(parent_id) if !store.contains(parent_id) => {
                    Err(MutationError::ParentNotFound(parent_id.clone()))
                }
                _ => Ok(()),
            },

            Mutation::RemoveNode { node_id } | Mutation::UpdateNode { node_id, .. } => {
                if store.contains(node_id) {
                    Ok(())
                } else {
                    Err(MutationError::NodeNotFound(node_id.clone()))
                }
            }

            Mutation::MoveNode { node_id, new_parent_id, .. } => {
                store.check_move(node_id, new_parent_id.as_deref())
            }
        }
    }

    /// Short action label used for history entries
    pub fn action(&self) -> &'static str {
        match self {
            Mutation::AddNode { .. } => "add",
            Mutation::RemoveNode { .. } => "remove",
            Mutation::UpdateNode { .. } => "update",
            Mutation::MoveNode { .. } => "move",
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Mutation::AddNode { node, .. } => format!("Add {} component", node.component_type),
            Mutation::RemoveNode { node_id } => format!("Remove component {}", node_id),
            Mutation::UpdateNode { node_id, .. } => format!("Update component {}", node_id),
            Mutation::MoveNode { node_id, .. } => format!("Move component {}", node_id),
        }
    }
}

fn check_structure(engine: &ValidationEngine, node: &ComponentNode) -> Result<(), MutationError> {
    match engine.structural_errors(node).into_iter().next() {
        Some(diagnostic) => Err(MutationError::InvalidStructure(diagnostic.message)),
        None => Ok(()),
    }
}
