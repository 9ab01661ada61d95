//! # Component Store
//!
//! Arena of nodes keyed by id. Parents hold ordered child ids and every child
//! holds a back-reference to its parent, so node data lives in exactly one
//! place. Roots keep their own ordered list.
//!
//! The nested [`ComponentNode`] form is materialized on demand by
//! [`ComponentStore::tree`] and [`ComponentStore::forest`].

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use wb_common::{ComponentMetadata, ComponentNode, Events, IdGenerator, Props, Styles};

use crate::mutations::{MutationError, NodePatch};

/// A node as kept in the arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredNode {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: String,
    pub props: Props,
    pub children: Vec<String>,
    pub parent: Option<String>,
    pub metadata: Option<ComponentMetadata>,
    pub styles: Option<Styles>,
    pub events: Option<Events>,
}

impl StoredNode {
    /// The node without its children
    pub fn to_component(&self) -> ComponentNode {
        ComponentNode {
            id: self.id.clone(),
            component_type: self.component_type.clone(),
            props: self.props.clone(),
            children: Vec::new(),
            metadata: self.metadata.clone(),
            styles: self.styles.clone(),
            events: self.events.clone(),
        }
    }

    fn apply_patch(&mut self, patch: &NodePatch) {
        if let Some(component_type) = &patch.component_type {
            self.component_type = component_type.clone();
        }
        if let Some(props) = &patch.props {
            self.props = props.clone();
        }
        if let Some(metadata) = &patch.metadata {
            self.metadata = Some(metadata.clone());
        }
        if let Some(styles) = &patch.styles {
            self.styles = Some(styles.clone());
        }
        if let Some(events) = &patch.events {
            self.events = Some(events.clone());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentStore {
    nodes: HashMap<String, StoredNode>,
    roots: Vec<String>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill every empty id in the subtree with a fresh one
    ///
    /// Generated ids skip anything already in the store or in the subtree.
    pub fn assign_ids(&self, node: &mut ComponentNode, ids: &mut IdGenerator) {
        self.assign_forest_ids(std::slice::from_mut(node), ids);
    }

    /// [`ComponentStore::assign_ids`] across several trees at once
    pub fn assign_forest_ids(&self, nodes: &mut [ComponentNode], ids: &mut IdGenerator) {
        let mut taken: HashSet<String> = nodes
            .iter()
            .flat_map(ComponentNode::ids)
            .filter(|id| !id.is_empty())
            .collect();
        for node in nodes {
            self.assign_ids_inner(node, ids, &mut taken);
        }
    }

    fn assign_ids_inner(&self, node: &mut ComponentNode, ids: &mut IdGenerator, taken: &mut HashSet<String>) {
        if node.id.is_empty() {
            let id = ids.new_id_where(|id| self.contains(id) || taken.contains(id));
            taken.insert(id.clone());
            node.id = id;
        }
        for child in &mut node.children {
            self.assign_ids_inner(child, ids, taken);
        }
    }

    /// Insert a node and its subtree. Returns the id of `node`.
    ///
    /// `index` defaults to append and is clamped to the sibling count.
    pub fn add(
        &mut self,
        node: ComponentNode,
        parent_id: Option<&str>,
        index: Option<usize>,
    ) -> Result<String, MutationError> {
        self.check_insertable(&node, parent_id)?;

        let id = self.insert_subtree(node, parent_id.map(str::to_string));
        let siblings = match parent_id {
            Some(parent_id) => match self.nodes.get_mut(parent_id) {
                Some(parent) => &mut parent.children,
                None => return Err(MutationError::ParentNotFound(parent_id.to_string())),
            },
            None => &mut self.roots,
        };
        let index = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(index, id.clone());

        Ok(id)
    }

    fn check_insertable(&self, node: &ComponentNode, parent_id: Option<&str>) -> Result<(), MutationError> {
        if let Some(parent_id) = parent_id {
            if !self.contains(parent_id) {
                return Err(MutationError::ParentNotFound(parent_id.to_string()));
            }
        }

        self.check_ids_available(std::slice::from_ref(node))
    }

    /// Every id in `nodes` must be non-empty, unused by the store and unique
    pub fn check_ids_available(&self, nodes: &[ComponentNode]) -> Result<(), MutationError> {
        let mut seen = HashSet::new();
        for id in nodes.iter().flat_map(ComponentNode::ids) {
            if id.is_empty() {
                return Err(MutationError::InvalidStructure("Component must have an ID".to_string()));
            }
            if self.contains(&id) || !seen.insert(id.clone()) {
                return Err(MutationError::DuplicateId(id));
            }
        }

        Ok(())
    }

    fn insert_subtree(&mut self, node: ComponentNode, parent: Option<String>) -> String {
        let ComponentNode {
            id,
            component_type,
            props,
            children,
            metadata,
            styles,
            events,
        } = node;

        let children = children
            .into_iter()
            .map(|child| self.insert_subtree(child, Some(id.clone())))
            .collect();

        self.nodes.insert(
            id.clone(),
            StoredNode {
                id: id.clone(),
                component_type,
                props,
                children,
                parent,
                metadata,
                styles,
                events,
            },
        );
        id
    }

    /// Remove a node and all descendants. Returns every removed id, pre-order.
    pub fn remove(&mut self, id: &str) -> Result<Vec<String>, MutationError> {
        if !self.contains(id) {
            return Err(MutationError::NodeNotFound(id.to_string()));
        }

        let mut removed = vec![id.to_string()];
        removed.extend(self.descendants(id));

        self.detach(id);
        for removed_id in &removed {
            self.nodes.remove(removed_id);
        }

        Ok(removed)
    }

    /// Shallow-merge `patch` into the node
    pub fn update(&mut self, id: &str, patch: &NodePatch) -> Result<(), MutationError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;
        node.apply_patch(patch);
        Ok(())
    }

    /// The materialized node as it would look after `update`
    pub fn preview_update(&self, id: &str, patch: &NodePatch) -> Result<ComponentNode, MutationError> {
        let stored = self
            .nodes
            .get(id)
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;

        let mut merged = stored.clone();
        merged.apply_patch(patch);

        let mut node = merged.to_component();
        node.children = stored.children.iter().filter_map(|child| self.tree(child)).collect();
        Ok(node)
    }

    /// Move a node under `new_parent_id` (None = root list). Returns the final index.
    pub fn move_node(
        &mut self,
        id: &str,
        new_parent_id: Option<&str>,
        index: usize,
    ) -> Result<usize, MutationError> {
        self.check_move(id, new_parent_id)?;

        self.detach(id);
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = new_parent_id.map(str::to_string);
        }

        let siblings = match new_parent_id {
            Some(parent_id) => match self.nodes.get_mut(parent_id) {
                Some(parent) => &mut parent.children,
                None => return Err(MutationError::ParentNotFound(parent_id.to_string())),
            },
            None => &mut self.roots,
        };
        let index = index.min(siblings.len());
        siblings.insert(index, id.to_string());

        Ok(index)
    }

    pub fn check_move(&self, id: &str, new_parent_id: Option<&str>) -> Result<(), MutationError> {
        if !self.contains(id) {
            return Err(MutationError::NodeNotFound(id.to_string()));
        }

        let Some(parent_id) = new_parent_id else {
            return Ok(());
        };
        if !self.contains(parent_id) {
            return Err(MutationError::ParentNotFound(parent_id.to_string()));
        }

        // Walk up from the new parent; meeting `id` means it would become its own ancestor
        let mut cursor = Some(parent_id);
        while let Some(current) = cursor {
            if current == id {
                return Err(MutationError::CycleDetected);
            }
            cursor = self.parent_of(current);
        }

        Ok(())
    }

    fn detach(&mut self, id: &str) {
        let parent = self.nodes.get(id).and_then(|node| node.parent.clone());
        let siblings = match parent {
            Some(parent) => match self.nodes.get_mut(&parent) {
                Some(parent) => &mut parent.children,
                None => return,
            },
            None => &mut self.roots,
        };
        siblings.retain(|sibling| sibling != id);
    }

    pub fn get(&self, id: &str) -> Option<&StoredNode> {
        self.nodes.get(id)
    }

    /// Every node, depth-first in root order
    pub fn get_all(&self) -> Vec<&StoredNode> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            self.collect(root, &mut out);
        }
        out
    }

    fn collect<'a>(&'a self, id: &str, out: &mut Vec<&'a StoredNode>) {
        if let Some(node) = self.nodes.get(id) {
            out.push(node);
            for child in &node.children {
                self.collect(child, out);
            }
        }
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.nodes.get(id).and_then(|node| node.parent.as_deref())
    }

    pub fn children_of(&self, id: &str) -> &[String] {
        self.nodes.get(id).map_or(&[], |node| node.children.as_slice())
    }

    /// Position among siblings (or among roots)
    pub fn position_of(&self, id: &str) -> Option<usize> {
        let siblings = match self.parent_of(id) {
            Some(parent) => self.children_of(parent),
            None => self.roots.as_slice(),
        };
        siblings.iter().position(|sibling| sibling == id)
    }

    /// Every descendant id (excluding `id` itself), pre-order
    pub fn descendants(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack: Vec<&str> = self.children_of(id).iter().rev().map(String::as_str).collect();
        while let Some(current) = stack.pop() {
            out.push(current.to_string());
            stack.extend(self.children_of(current).iter().rev().map(String::as_str));
        }
        out
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Materialize the subtree rooted at `id`
    pub fn tree(&self, id: &str) -> Option<ComponentNode> {
        let stored = self.nodes.get(id)?;
        let mut node = stored.to_component();
        node.children = stored.children.iter().filter_map(|child| self.tree(child)).collect();
        Some(node)
    }

    /// Materialize every root
    pub fn forest(&self) -> Vec<ComponentNode> {
        self.roots.iter().filter_map(|root| self.tree(root)).collect()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
    }

    /// Check that the arena and the parent/child links agree
    ///
    /// Every node must be reachable from exactly one root through exactly one
    /// parent, and every back-reference must match its parent's child list.
    pub fn verify_integrity(&self) -> Result<(), String> {
        let mut reached = HashSet::new();

        for root in &self.roots {
            match self.nodes.get(root) {
                Some(node) if node.parent.is_some() => {
                    return Err(format!("Root {} has a parent", root));
                }
                Some(_) => {}
                None => return Err(format!("Root {} is not in the index", root)),
            }
            if !reached.insert(root.as_str()) {
                return Err(format!("Root {} listed twice", root));
            }
            for id in self.descendants(root) {
                let Some(node) = self.nodes.get(&id) else {
                    return Err(format!("Child {} is not in the index", id));
                };
                let parent = node.parent.as_deref().unwrap_or_default();
                if !self.children_of(parent).contains(&id) {
                    return Err(format!("Node {} is not listed by its parent {}", id, parent));
                }
                if !reached.insert(node.id.as_str()) {
                    return Err(format!("Node {} reachable twice", id));
                }
            }
        }

        if reached.len() != self.nodes.len() {
            return Err(format!(
                "{} node(s) unreachable from any root",
                self.nodes.len() - reached.len()
            ));
        }

        Ok(())
    }
}
