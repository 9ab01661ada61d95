use serde::{Deserialize, Serialize};
use wb_common::ComponentNode;

/// Diagnostic codes emitted by the built-in checks
pub mod codes {
    pub const MISSING_ID: &str = "MISSING_ID";
    pub const MISSING_TYPE: &str = "MISSING_TYPE";
    pub const MISSING_METADATA: &str = "MISSING_METADATA";
    pub const DUPLICATE_ID: &str = "DUPLICATE_ID";
    pub const EMPTY_TEXT: &str = "EMPTY_TEXT";
    pub const MISSING_IMAGE_SRC: &str = "MISSING_IMAGE_SRC";
    pub const MISSING_ALT_TEXT: &str = "MISSING_ALT_TEXT";
    pub const EMPTY_BUTTON: &str = "EMPTY_BUTTON";
    pub const EMPTY_FORM: &str = "EMPTY_FORM";

    /// Codes that make a node unusable by the store
    pub const STRUCTURAL: [&str; 3] = [MISSING_ID, MISSING_TYPE, MISSING_METADATA];
}

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Info,
}

/// A single finding about a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub level: DiagnosticLevel,

    /// Machine-readable code (e.g. `MISSING_IMAGE_SRC`)
    pub code: String,

    pub message: String,

    /// Id of the offending node, if it has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn error(code: impl Into<String>, message: impl Into<String>, node: &ComponentNode) -> Self {
        Self::new(DiagnosticLevel::Error, code, message, node)
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>, node: &ComponentNode) -> Self {
        Self::new(DiagnosticLevel::Warning, code, message, node)
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>, node: &ComponentNode) -> Self {
        Self::new(DiagnosticLevel::Info, code, message, node)
    }

    fn new(
        level: DiagnosticLevel,
        code: impl Into<String>,
        message: impl Into<String>,
        node: &ComponentNode,
    ) -> Self {
        Self {
            level,
            code: code.into(),
            message: message.into(),
            node_id: (!node.id.is_empty()).then(|| node.id.clone()),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == DiagnosticLevel::Error
    }

    pub fn is_structural(&self) -> bool {
        codes::STRUCTURAL.contains(&self.code.as_str())
    }
}

/// Outcome of validating one node, a subtree or a forest
///
/// `valid` is false as soon as any error-level diagnostic is present.
/// Warnings and info diagnostics are advisory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl ValidationResult {
    pub fn from_diagnostics(diagnostics: impl IntoIterator<Item = Diagnostic>) -> Self {
        let mut result = Self::default();
        for diagnostic in diagnostics {
            result.push(diagnostic);
        }
        result
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            self.valid = false;
            self.errors.push(diagnostic);
        } else {
            self.warnings.push(diagnostic);
        }
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.valid &= other.valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn has_error(&self, code: &str) -> bool {
        self.errors.iter().any(|d| d.code == code)
    }

    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|d| d.code == code)
    }

    pub fn structural_errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter().filter(|d| d.is_structural())
    }
}
