//! # Component Validation
//!
//! Per-type rule registry and the engine that runs it over component trees.
//! Errors block export; warnings and info diagnostics are advisory.

mod diagnostic;
mod engine;
mod rules;

pub use diagnostic::{codes, Diagnostic, DiagnosticLevel, ValidationResult};
pub use engine::ValidationEngine;
pub use rules::{rule_fn, ButtonRule, FnRule, FormRule, ImageRule, RuleRegistry, TextRule, ValidationRule};
