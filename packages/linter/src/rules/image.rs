use crate::diagnostic::{codes, Diagnostic};
use crate::rules::ValidationRule;
use wb_common::ComponentNode;

/// Images need a source and should carry alt text
pub struct ImageRule;

impl ValidationRule for ImageRule {
    fn name(&self) -> &str {
        "image"
    }

    fn description(&self) -> &str {
        "Image components require `src` and should have `alt` text"
    }

    fn validate(&self, node: &ComponentNode) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        if !node.has_prop("src") {
            diagnostics.push(Diagnostic::error(
                codes::MISSING_IMAGE_SRC,
                "Image component must have a src attribute",
                node,
            ));
        }

        if !node.has_prop("alt") {
            diagnostics.push(
                Diagnostic::warning(
                    codes::MISSING_ALT_TEXT,
                    "Image should have alt text for accessibility",
                    node,
                )
                .with_suggestion("Add descriptive alt text for screen readers"),
            );
        }

        diagnostics
    }
}
