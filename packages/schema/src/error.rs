//! Error types for the schema

use thiserror::Error;

/// Setup-time registration failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Type '{name}' is already registered with base '{existing}', cannot re-register with base '{requested}'")]
    DuplicateType {
        name: String,
        existing: String,
        requested: String,
    },

    #[error("Conflicting rule for '{name}' inside '{inside}': {detail}")]
    ConflictingRule {
        name: String,
        inside: String,
        detail: String,
    },

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Schema is sealed; types and rules can only be registered during setup")]
    Sealed,
}

/// Reasons a model item fails validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("'{name}' is missing required attribute '{attribute}'")]
    MissingAttribute { name: String, attribute: String },

    #[error("Attribute '{attribute}' is not allowed on '{name}'")]
    AttributeNotAllowed { name: String, attribute: String },

    #[error("'{child}' is not allowed inside '{parent}'")]
    NotAllowedInside { child: String, parent: String },
}
