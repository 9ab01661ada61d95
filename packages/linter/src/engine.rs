use std::collections::HashSet;

use tracing::debug;
use wb_common::{ComponentNode, IdCollector, Visitor};

use crate::diagnostic::{codes, Diagnostic, ValidationResult};
use crate::rules::{RuleRegistry, ValidationRule};

/// Validation engine for component trees
///
/// Every node gets the structural checks (id, type, metadata). The rule
/// registered for the node's type runs next, then the engine recurses into
/// the children in order.
#[derive(Debug, Default)]
pub struct ValidationEngine {
    registry: RuleRegistry,
}

impl ValidationEngine {
    /// Engine with the built-in rules
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: RuleRegistry) -> Self {
        Self { registry }
    }

    /// Validate a node and its subtree
    pub fn validate_component(&self, node: &ComponentNode) -> ValidationResult {
        let mut diagnostics = Vec::new();
        self.collect(node, &mut diagnostics);
        ValidationResult::from_diagnostics(diagnostics)
    }

    /// Validate several root trees and check ids for duplicates
    ///
    /// The duplicate check covers every id reachable from the given roots.
    pub fn validate_forest(&self, nodes: &[ComponentNode]) -> ValidationResult {
        let mut result = ValidationResult::default();

        for node in nodes {
            result.merge(self.validate_component(node));
        }

        let mut collector = IdCollector::default();
        collector.visit_forest(nodes);

        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for id in &collector.ids {
            if id.is_empty() {
                continue;
            }
            if !seen.insert(id.as_str()) && reported.insert(id.as_str()) {
                result.push(Diagnostic {
                    node_id: Some(id.clone()),
                    ..Diagnostic::error(
                        codes::DUPLICATE_ID,
                        format!("Duplicate component ID: {}", id),
                        &ComponentNode::default(),
                    )
                });
            }
        }

        debug!(
            roots = nodes.len(),
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "Validated forest"
        );

        result
    }

    /// Structural errors only, for the whole subtree
    pub fn structural_errors(&self, node: &ComponentNode) -> Vec<Diagnostic> {
        let mut errors = structural_diagnostics(node);
        for child in &node.children {
            errors.extend(self.structural_errors(child));
        }
        errors
    }

    /// Register a rule for a component type, replacing any previous one
    pub fn register_rule(&mut self, component_type: impl Into<String>, rule: impl ValidationRule + 'static) {
        let component_type = component_type.into();
        debug!(component_type = %component_type, rule = rule.name(), "Registering validation rule");
        self.registry.register(component_type, Box::new(rule));
    }

    pub fn remove_rule(&mut self, component_type: &str) -> bool {
        self.registry.remove(component_type).is_some()
    }

    /// Component types with a registered rule
    pub fn list_rules(&self) -> Vec<&str> {
        self.registry.types()
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    fn collect(&self, node: &ComponentNode, diagnostics: &mut Vec<Diagnostic>) {
        diagnostics.extend(structural_diagnostics(node));

        if let Some(rule) = self.registry.get(&node.component_type) {
            diagnostics.extend(rule.validate(node));
        }

        for child in &node.children {
            self.collect(child, diagnostics);
        }
    }
}

fn structural_diagnostics(node: &ComponentNode) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if node.id.is_empty() {
        diagnostics.push(Diagnostic::error(codes::MISSING_ID, "Component must have an ID", node));
    }

    if node.component_type.is_empty() {
        diagnostics.push(Diagnostic::error(codes::MISSING_TYPE, "Component must have a type", node));
    }

    if node.metadata.is_none() {
        diagnostics.push(Diagnostic::error(
            codes::MISSING_METADATA,
            "Component must have metadata",
            node,
        ));
    }

    diagnostics
}
