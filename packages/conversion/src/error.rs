//! Error types for conversion

use thiserror::Error;
use vellum_model::{ModelError, Position};
use vellum_schema::{SchemaError, SchemaViolation};
use vellum_view::ViewError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Schema violation: {0}")]
    Violation(#[from] SchemaViolation),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("View error: {0}")]
    View(#[from] ViewError),

    #[error("Model position {0} has no view mapping")]
    Unmapped(Position),

    #[error("Unknown root: {0}")]
    UnknownRoot(String),

    #[error("Converter failed: {0}")]
    Converter(String),
}

impl From<String> for ConversionError {
    fn from(message: String) -> Self {
        ConversionError::Converter(message)
    }
}

impl From<&str> for ConversionError {
    fn from(message: &str) -> Self {
        ConversionError::Converter(message.to_string())
    }
}
