use thiserror::Error;

/// Common error type shared by the vellum crates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    #[error("Invalid priority: {0}")]
    InvalidPriority(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}
