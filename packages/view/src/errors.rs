//! Error types for the view

use crate::document::ViewPosition;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("Unknown view root: {0}")]
    UnknownRoot(String),

    #[error("View root already exists: {0}")]
    DuplicateRoot(String),

    #[error("Invalid view position: {0}")]
    InvalidPosition(ViewPosition),

    #[error("No view element at {0}")]
    ElementNotFound(ViewPosition),
}
