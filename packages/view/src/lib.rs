//! # Vellum View
//!
//! The rendered-side tree kept in sync with the model by conversion.
//!
//! View nodes hold no state of their own: they are rebuilt whenever their
//! source model range is converted again. A downstream render adapter
//! consumes the finished [`ViewDocument`]; the data pipeline serializes view
//! fragments with [`html::stringify`].

mod document;
mod errors;
pub mod html;
mod node;

pub use document::{ViewDocument, ViewPosition, ViewSelection};
pub use errors::ViewError;
pub use node::{ViewElement, ViewNode, WidgetMarker, CONTENT_EDITABLE, WIDGET_CLASS};
