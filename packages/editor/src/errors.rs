//! Error types for the editor

use thiserror::Error;
use vellum_conversion::ConversionError;
use vellum_model::ModelError;
use vellum_schema::SchemaError;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Feature '{name}' failed to initialize: {source}")]
    Feature {
        name: &'static str,
        #[source]
        source: ConversionError,
    },

    #[error("Invalid view fragment: {0}")]
    Fragment(#[from] serde_json::Error),

    #[error("Unknown root: {0}")]
    UnknownRoot(String),

    #[error("Editor needs at least one root")]
    NoRoots,
}
