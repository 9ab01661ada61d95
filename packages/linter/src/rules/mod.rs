mod button;
mod form;
mod image;
mod text;

pub use button::ButtonRule;
pub use form::FormRule;
pub use image::ImageRule;
pub use text::TextRule;

use std::collections::HashMap;

use crate::diagnostic::Diagnostic;
use wb_common::ComponentNode;

/// Trait for implementing per-type validation rules
pub trait ValidationRule {
    /// Unique identifier for this rule
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str {
        ""
    }

    /// Check a single node. Children are visited by the engine.
    fn validate(&self, node: &ComponentNode) -> Vec<Diagnostic>;
}

/// Adapter turning a closure into a [`ValidationRule`]
pub struct FnRule<F> {
    name: String,
    check: F,
}

impl<F> ValidationRule for FnRule<F>
where
    F: Fn(&ComponentNode) -> Vec<Diagnostic>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, node: &ComponentNode) -> Vec<Diagnostic> {
        (self.check)(node)
    }
}

/// Build a rule from a closure
pub fn rule_fn<F>(name: impl Into<String>, check: F) -> FnRule<F>
where
    F: Fn(&ComponentNode) -> Vec<Diagnostic>,
{
    FnRule {
        name: name.into(),
        check,
    }
}

/// Registry mapping a component type to its rule
///
/// At most one rule per type; registering again replaces the previous rule.
pub struct RuleRegistry {
    rules: HashMap<String, Box<dyn ValidationRule>>,
}

impl RuleRegistry {
    /// Create a new registry with all built-in rules
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("text", Box::new(TextRule));
        registry.register("image", Box::new(ImageRule));
        registry.register("button", Box::new(ButtonRule));
        registry.register("form", Box::new(FormRule));
        registry
    }

    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        component_type: impl Into<String>,
        rule: Box<dyn ValidationRule>,
    ) -> Option<Box<dyn ValidationRule>> {
        self.rules.insert(component_type.into(), rule)
    }

    pub fn remove(&mut self, component_type: &str) -> Option<Box<dyn ValidationRule>> {
        self.rules.remove(component_type)
    }

    pub fn get(&self, component_type: &str) -> Option<&dyn ValidationRule> {
        self.rules.get(component_type).map(|rule| rule.as_ref())
    }

    /// Registered component types, sorted
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("types", &self.types())
            .finish()
    }
}
