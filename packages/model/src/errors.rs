//! Error types for the model

use crate::position::Position;
use thiserror::Error;
use vellum_schema::SchemaViolation;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Unknown root: {0}")]
    UnknownRoot(String),

    #[error("Root already exists: {0}")]
    DuplicateRoot(String),

    #[error("Invalid position: {0}")]
    InvalidPosition(Position),

    #[error("Node not found at {0}")]
    NodeNotFound(Position),

    #[error("Node at {0} cannot have children")]
    NotAContainer(Position),

    #[error("Cannot remove {count} node(s) at {position}")]
    InvalidRange { position: Position, count: usize },

    #[error("Schema violation: {0}")]
    Schema(#[from] SchemaViolation),
}
