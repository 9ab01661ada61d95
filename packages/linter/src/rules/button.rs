use crate::diagnostic::{codes, Diagnostic};
use crate::rules::ValidationRule;
use wb_common::ComponentNode;

/// Buttons should have a label or child content
pub struct ButtonRule;

impl ValidationRule for ButtonRule {
    fn name(&self) -> &str {
        "button"
    }

    fn description(&self) -> &str {
        "Buttons should have text or child elements"
    }

    fn validate(&self, node: &ComponentNode) -> Vec<Diagnostic> {
        if node.has_prop("text") || node.has_prop("children") || !node.children.is_empty() {
            return Vec::new();
        }

        vec![Diagnostic::warning(codes::EMPTY_BUTTON, "Button has no text or content", node)
            .with_suggestion("Add button text or child elements")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_button_warns() {
        let diagnostics = ButtonRule.validate(&ComponentNode::new("button"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, codes::EMPTY_BUTTON);
        assert!(!diagnostics[0].is_error());
    }

    #[test]
    fn test_button_with_child_content() {
        let node = ComponentNode::new("button").with_child(ComponentNode::new("text"));
        assert!(ButtonRule.validate(&node).is_empty());
    }

    #[test]
    fn test_blank_text_still_warns() {
        let node = ComponentNode::new("button").with_prop("text", "");
        assert_eq!(ButtonRule.validate(&node).len(), 1);
    }
}
