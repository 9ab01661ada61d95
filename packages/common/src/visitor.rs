use crate::component::ComponentNode;

/// Visitor pattern for traversing component trees immutably
///
/// The default implementation walks the entire subtree in child order.
/// Override `visit_node` and call [`walk_node`] to keep descending.
pub trait Visitor: Sized {
    fn visit_node(&mut self, node: &ComponentNode) {
        walk_node(self, node);
    }

    fn visit_forest(&mut self, nodes: &[ComponentNode]) {
        for node in nodes {
            self.visit_node(node);
        }
    }
}

/// Mutable visitor pattern for transforming component trees
pub trait VisitorMut: Sized {
    fn visit_node_mut(&mut self, node: &mut ComponentNode) {
        walk_node_mut(self, node);
    }

    fn visit_forest_mut(&mut self, nodes: &mut [ComponentNode]) {
        for node in nodes {
            self.visit_node_mut(node);
        }
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &ComponentNode) {
    for child in &node.children {
        visitor.visit_node(child);
    }
}

pub fn walk_node_mut<V: VisitorMut>(visitor: &mut V, node: &mut ComponentNode) {
    for child in &mut node.children {
        visitor.visit_node_mut(child);
    }
}
