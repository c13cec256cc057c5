//! # Vellum Schema
//!
//! Declares which element types exist in the document model, which attributes
//! they carry and where they may appear.
//!
//! ## Lifecycle
//!
//! ```text
//! register_type / allow / require_attributes / mark_object   (setup phase)
//!                          ↓
//!                        seal()
//!                          ↓
//!          is_valid / can_contain / check_in_context          (read-only)
//! ```
//!
//! The registry is fail-closed: a type with no `allow` rule for a context is
//! rejected there.

mod error;
mod registry;

pub use error::{SchemaError, SchemaViolation};
pub use registry::{Rule, SchemaEntry, SchemaItem, SchemaRegistry, BLOCK, INLINE, ROOT, TEXT};
