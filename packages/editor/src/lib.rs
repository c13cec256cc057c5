//! # Vellum Editor
//!
//! Editor facade over the model, the schema and both conversion pipelines.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ setup: EditorBuilder                        │
//! │  - features register schema + converters    │
//! │  - schema sealed, roots created             │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editing: Editor::apply / change             │
//! │  - batch validated and committed atomically │
//! │  - changes converted into the live view     │
//! │  - selection projected (range or widget)    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ data: set_data / get_data                   │
//! │  - view fragment → model (schema-gated)     │
//! │  - model → HTML                             │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vellum_editor::{EditorBuilder, EditorConfig};
//!
//! let mut editor = EditorBuilder::new(EditorConfig::default())
//!     .with_features(vellum_features::standard_features())
//!     .build()?;
//!
//! editor.set_data_json("main", r#"[{ "type": "element", "name": "p" }]"#)?;
//! let html = editor.get_data("main")?;
//! ```

mod builder;
mod config;
mod editor;
mod errors;

pub use builder::EditorBuilder;
pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use editor::Editor;
pub use errors::EditorError;
