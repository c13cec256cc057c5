use crate::config::EditorConfig;
use crate::EditorError;
use tracing::{debug, info};
use vellum_conversion::{ConversionReport, ConversionResult, DataController, EditingController};
use vellum_model::{Batch, ModelDocument, Position, Selection};
use vellum_schema::{SchemaRegistry, ROOT};
use vellum_view::{ViewDocument, ViewNode};

/// A configured editor: sealed schema, model, live editing view and data pipeline
pub struct Editor {
    config: EditorConfig,
    schema: SchemaRegistry,
    model: ModelDocument,
    editing: EditingController,
    data: DataController,
    features: Vec<&'static str>,
}

impl Editor {
    pub(crate) fn new(
        config: EditorConfig,
        schema: SchemaRegistry,
        model: ModelDocument,
        editing: EditingController,
        data: DataController,
        features: Vec<&'static str>,
    ) -> Self {
        Self {
            config,
            schema,
            model,
            editing,
            data,
            features,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    pub fn model(&self) -> &ModelDocument {
        &self.model
    }

    /// The live editing view
    pub fn view(&self) -> &ViewDocument {
        self.editing.view()
    }

    pub fn editing(&self) -> &EditingController {
        &self.editing
    }

    /// Names of the initialized features, in setup order
    pub fn features(&self) -> &[&'static str] {
        &self.features
    }

    /// Apply a batch and convert its changes into the editing view.
    ///
    /// A rejected batch leaves both the model and the view untouched.
    pub fn apply(&mut self, batch: &Batch) -> Result<ConversionReport, EditorError> {
        let applied = self.model.apply(batch, &self.schema)?;
        if applied.is_noop() {
            return Ok(ConversionReport::default());
        }
        Ok(self.editing.convert(&self.model, &self.schema, &applied))
    }

    /// Build a batch in a closure and apply it
    pub fn change<F>(&mut self, build: F) -> Result<ConversionReport, EditorError>
    where
        F: FnOnce(&mut Batch),
    {
        let mut batch = Batch::new();
        build(&mut batch);
        self.apply(&batch)
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) -> Result<ConversionReport, EditorError> {
        self.change(|batch| {
            match selection {
                Some(selection) => batch.set_selection(selection),
                None => batch.clear_selection(),
            };
        })
    }

    /// Replace the content of `root` with a view fragment.
    ///
    /// Unrecognized parts of the fragment are left out and listed in the result.
    pub fn set_data(&mut self, root: &str, fragment: &[ViewNode]) -> Result<ConversionResult, EditorError> {
        let existing = self
            .model
            .root(root)
            .ok_or_else(|| EditorError::UnknownRoot(root.to_string()))?
            .children()
            .len();

        let mut result = self.data.to_model(fragment, &self.schema, ROOT);

        let start = Position::new(root, vec![0]);
        let mut batch = Batch::new().with_description(format!("set data of {}", root));
        if existing > 0 {
            batch.remove(start.clone(), existing);
        }
        if !result.nodes.is_empty() {
            batch.insert_nodes(start, result.nodes.clone());
        }

        let report = self.apply(&batch)?;
        result.report.merge(report);

        if !result.unrecognized.is_empty() {
            info!(root, unrecognized = result.unrecognized.len(), "Parts of the loaded data were left out");
        }
        Ok(result)
    }

    /// [`Editor::set_data`] from a JSON array of view nodes
    pub fn set_data_json(&mut self, root: &str, json: &str) -> Result<ConversionResult, EditorError> {
        let fragment: Vec<ViewNode> = serde_json::from_str(json)?;
        debug!(root, nodes = fragment.len(), "Parsed view fragment");
        self.set_data(root, &fragment)
    }

    /// Serialize `root` to HTML through the data pipeline
    pub fn get_data(&self, root: &str) -> Result<String, EditorError> {
        Ok(self.data.stringify(&self.model, &self.schema, root)?)
    }

    /// Data view of `root` (no widgets, no selection)
    pub fn to_data_view(&self, root: &str) -> Result<Vec<ViewNode>, EditorError> {
        let (fragment, _) = self.data.to_view(&self.model, &self.schema, root)?;
        Ok(fragment)
    }
}
