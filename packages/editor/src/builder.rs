//! # Editor Setup
//!
//! ```text
//! EditorConfig + [Feature, ...]
//!        ↓  init each feature (required features first, once per name)
//! SchemaRegistry (sealed) + editing/data converters
//!        ↓  create roots
//! Editor
//! ```
//!
//! Any setup failure aborts `build()`; there is no partially set up editor.

use crate::config::EditorConfig;
use crate::editor::Editor;
use crate::EditorError;
use std::collections::BTreeSet;
use tracing::{debug, info};
use vellum_conversion::{DataController, EditingController, Feature, FeatureContext};
use vellum_model::ModelDocument;
use vellum_schema::SchemaRegistry;

pub struct EditorBuilder {
    config: EditorConfig,
    features: Vec<Box<dyn Feature>>,
}

impl EditorBuilder {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            features: Vec::new(),
        }
    }

    pub fn with_feature(mut self, feature: impl Feature + 'static) -> Self {
        self.features.push(Box::new(feature));
        self
    }

    pub fn with_features(mut self, features: Vec<Box<dyn Feature>>) -> Self {
        self.features.extend(features);
        self
    }

    pub fn build(self) -> Result<Editor, EditorError> {
        if self.config.roots.is_empty() {
            return Err(EditorError::NoRoots);
        }

        let mut schema = SchemaRegistry::new();
        let mut editing = EditingController::new();
        let mut data = DataController::new();
        editing
            .widgets_mut()
            .set_fallback_label(&self.config.fake_selection_label);

        let mut initialized = Vec::new();
        {
            let mut context = FeatureContext {
                schema: &mut schema,
                editing: &mut editing,
                data: &mut data,
            };
            let mut seen = BTreeSet::new();
            for feature in &self.features {
                init_feature(feature.as_ref(), &mut context, &mut seen, &mut initialized)?;
            }
        }
        schema.seal();

        let model = ModelDocument::with_roots(&self.config.roots)?;
        for root in &self.config.roots {
            editing.create_root(root)?;
        }

        info!(features = ?initialized, roots = ?self.config.roots, "Editor ready");
        Ok(Editor::new(self.config, schema, model, editing, data, initialized))
    }
}

fn init_feature(
    feature: &dyn Feature,
    context: &mut FeatureContext<'_>,
    seen: &mut BTreeSet<&'static str>,
    initialized: &mut Vec<&'static str>,
) -> Result<(), EditorError> {
    let name = feature.name();
    if !seen.insert(name) {
        return Ok(());
    }

    for required in feature.requires() {
        init_feature(required.as_ref(), context, seen, initialized)?;
    }

    debug!(feature = name, "Initializing feature");
    feature
        .init(context)
        .map_err(|source| EditorError::Feature { name, source })?;
    initialized.push(name);
    Ok(())
}
