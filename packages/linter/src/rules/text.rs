use crate::diagnostic::{codes, Diagnostic};
use crate::rules::ValidationRule;
use wb_common::ComponentNode;

pub struct TextRule;

impl ValidationRule for TextRule {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Text components should have content"
    }

    fn validate(&self, node: &ComponentNode) -> Vec<Diagnostic> {
        if node.has_prop("content") {
            return Vec::new();
        }

        vec![Diagnostic::warning(codes::EMPTY_TEXT, "Text component has no content", node)
            .with_suggestion("Add text content to make the component visible")]
    }
}
