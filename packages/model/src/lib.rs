//! # Vellum Model
//!
//! The abstract, schema-governed document tree.
//!
//! ## Editing Flow
//!
//! ```text
//! Batch [Operation, ...]
//!        ↓  validate each operation against the staged tree + schema
//! staged ModelDocument
//!        ↓  commit only if every operation passed
//! AppliedBatch { changes, selection_changed }
//!        ↓
//! conversion (vellum-conversion)
//! ```
//!
//! A node lives in exactly one place: children are owned by value, so moving
//! a node means removing it and inserting it again.

mod batch;
mod change;
mod document;
mod errors;
mod node;
mod operations;
mod position;
pub mod visitor;

pub use batch::Batch;
pub use change::{AppliedBatch, Change};
pub use document::{ModelDocument, MAIN_ROOT};
pub use errors::ModelError;
pub use node::{Attributes, ModelNode};
pub use operations::Operation;
pub use position::{Position, Selection};
pub use visitor::Visitor;
