use crate::diagnostic::{codes, Diagnostic};
use crate::rules::ValidationRule;
use wb_common::ComponentNode;

pub struct FormRule;

impl ValidationRule for FormRule {
    fn name(&self) -> &str {
        "form"
    }

    fn description(&self) -> &str {
        "Forms should contain at least one field"
    }

    fn validate(&self, node: &ComponentNode) -> Vec<Diagnostic> {
        if !node.children.is_empty() {
            return Vec::new();
        }

        vec![Diagnostic::warning(codes::EMPTY_FORM, "Form has no input fields", node)
            .with_suggestion("Add form inputs or other form elements")]
    }
}
