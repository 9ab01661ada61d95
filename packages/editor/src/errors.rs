//! Error types for the builder

use thiserror::Error;
use wb_common::CommonError;
use wb_linter::Diagnostic;

#[derive(Error, Debug)]
pub enum BuilderError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Common(#[from] CommonError),

    #[error("Unsupported {direction} format: {format}")]
    UnsupportedFormat {
        direction: &'static str,
        format: String,
    },

    #[error("Validation failed with {} error(s)", errors.len())]
    ValidationFailed { errors: Vec<Diagnostic> },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Plugin '{id}' failed: {message}")]
    Plugin { id: String, message: String },

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Export failed: {0}")]
    Export(anyhow::Error),

    #[error("Import failed: {0}")]
    Import(anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl BuilderError {
    pub fn plugin(id: impl Into<String>, message: impl std::fmt::Display) -> Self {
        BuilderError::Plugin {
            id: id.into(),
            message: message.to_string(),
        }
    }
}
