//! Conversion pipelines.
//!
//! The editing pipeline keeps a live view in sync with the model, widgets
//! and fake selection included. The data pipeline is stateless: it renders
//! a model root to a detached fragment (or HTML) and parses external
//! fragments back into model nodes.

use crate::dispatcher::Dispatcher;
use crate::mapper::Mapper;
use crate::model_to_view::{self, ModelConversionApi, ModelToViewDispatcher};
use crate::report::ConversionReport;
use crate::selection::SelectionProjector;
use crate::view_to_model::{self, ConversionResult, ViewConversionApi, ViewToModelDispatcher};
use crate::widget::WidgetRegistry;
use crate::ConversionError;
use std::rc::Rc;
use tracing::{debug, instrument};
use vellum_model::{AppliedBatch, ModelDocument, Position, Selection};
use vellum_schema::SchemaRegistry;
use vellum_view::{html, ViewDocument, ViewNode};

pub struct EditingController {
    dispatcher: ModelToViewDispatcher,
    view: ViewDocument,
    mapper: Mapper,
    widgets: WidgetRegistry,
    projector: Rc<SelectionProjector>,
}

impl Default for EditingController {
    fn default() -> Self {
        let mut dispatcher = Dispatcher::new("editing");
        model_to_view::register_defaults(&mut dispatcher);
        model_to_view::register_range_selection(&mut dispatcher);

        Self {
            dispatcher,
            view: ViewDocument::new(),
            mapper: Mapper::new(),
            widgets: WidgetRegistry::new(),
            projector: Rc::new(SelectionProjector::new()),
        }
    }
}

impl EditingController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_root(&mut self, name: &str) -> Result<(), ConversionError> {
        self.view.create_root(name)?;
        self.mapper.create_root(name);
        Ok(())
    }

    pub fn dispatcher(&self) -> &ModelToViewDispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut ModelToViewDispatcher {
        &mut self.dispatcher
    }

    pub fn view(&self) -> &ViewDocument {
        &self.view
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    pub fn widgets(&self) -> &WidgetRegistry {
        &self.widgets
    }

    pub fn widgets_mut(&mut self) -> &mut WidgetRegistry {
        &mut self.widgets
    }

    pub fn projector(&self) -> &SelectionProjector {
        &self.projector
    }

    /// Convert one committed batch, then re-render the selection.
    ///
    /// The selection is re-rendered after any content change as well, since
    /// the view positions it maps to may have moved.
    #[instrument(level = "debug", skip_all, fields(changes = applied.changes.len(), version = applied.version))]
    pub fn convert(
        &mut self,
        model: &ModelDocument,
        schema: &SchemaRegistry,
        applied: &AppliedBatch,
    ) -> ConversionReport {
        let projector = Rc::clone(&self.projector);
        let mut api = ModelConversionApi::new(
            &self.dispatcher,
            &mut self.view,
            &mut self.mapper,
            model,
            schema,
            &self.widgets,
        );

        api.convert_changes(&applied.changes);
        if applied.selection_changed || !applied.changes.is_empty() {
            projector.project(model.selection().cloned(), |selection| api.convert_selection(selection));
        }

        let report = api.into_report();
        debug!(fired = report.fired, misses = report.misses.len(), faults = report.faults.len(), "Converted batch");
        report
    }

    /// Re-render the selection without any model change
    pub fn project_selection(
        &mut self,
        model: &ModelDocument,
        schema: &SchemaRegistry,
        selection: Option<Selection>,
    ) -> ConversionReport {
        let projector = Rc::clone(&self.projector);
        let mut api = ModelConversionApi::new(
            &self.dispatcher,
            &mut self.view,
            &mut self.mapper,
            model,
            schema,
            &self.widgets,
        );
        projector.project(selection, |selection| api.convert_selection(selection));
        api.into_report()
    }

    /// Throw away the view of `root` and convert it again from the model
    #[instrument(level = "debug", skip(self, model, schema))]
    pub fn reload_root(
        &mut self,
        model: &ModelDocument,
        schema: &SchemaRegistry,
        root: &str,
    ) -> Result<ConversionReport, ConversionError> {
        let node = model
            .root(root)
            .ok_or_else(|| ConversionError::UnknownRoot(root.to_string()))?;

        self.view.clear_root(root)?;
        self.mapper.create_root(root);

        let mut api = ModelConversionApi::new(
            &self.dispatcher,
            &mut self.view,
            &mut self.mapper,
            model,
            schema,
            &self.widgets,
        );
        api.convert_insert(&Position::new(root, vec![0]), node.children());
        api.convert_selection(model.selection().cloned());
        Ok(api.into_report())
    }
}

/// Stateless data pipeline for loading and saving content
pub struct DataController {
    model_to_view: ModelToViewDispatcher,
    view_to_model: ViewToModelDispatcher,
    widgets: WidgetRegistry,
}

impl Default for DataController {
    fn default() -> Self {
        let mut model_to_view = Dispatcher::new("data");
        model_to_view::register_defaults(&mut model_to_view);
        let mut view_to_model = Dispatcher::new("data");
        view_to_model::register_defaults(&mut view_to_model);

        Self {
            model_to_view,
            view_to_model,
            widgets: WidgetRegistry::new(),
        }
    }
}

impl DataController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model_to_view(&self) -> &ModelToViewDispatcher {
        &self.model_to_view
    }

    pub fn model_to_view_mut(&mut self) -> &mut ModelToViewDispatcher {
        &mut self.model_to_view
    }

    pub fn view_to_model(&self) -> &ViewToModelDispatcher {
        &self.view_to_model
    }

    pub fn view_to_model_mut(&mut self) -> &mut ViewToModelDispatcher {
        &mut self.view_to_model
    }

    /// Render the content of a model root as a detached view fragment
    #[instrument(level = "debug", skip(self, model, schema))]
    pub fn to_view(
        &self,
        model: &ModelDocument,
        schema: &SchemaRegistry,
        root: &str,
    ) -> Result<(Vec<ViewNode>, ConversionReport), ConversionError> {
        let node = model
            .root(root)
            .ok_or_else(|| ConversionError::UnknownRoot(root.to_string()))?;

        let mut view = ViewDocument::new();
        view.create_root(root)?;
        let mut mapper = Mapper::new();
        mapper.create_root(root);

        let mut api = ModelConversionApi::new(&self.model_to_view, &mut view, &mut mapper, model, schema, &self.widgets);
        api.convert_insert(&Position::new(root, vec![0]), node.children());
        let report = api.into_report();

        let fragment = view.clear_root(root)?;
        Ok((fragment, report))
    }

    /// Serialize the content of a model root to HTML
    pub fn stringify(
        &self,
        model: &ModelDocument,
        schema: &SchemaRegistry,
        root: &str,
    ) -> Result<String, ConversionError> {
        let (fragment, _) = self.to_view(model, schema, root)?;
        Ok(html::stringify(&fragment))
    }

    /// Convert an external fragment into model nodes allowed in `context`
    #[instrument(level = "debug", skip(self, fragment, schema), fields(nodes = fragment.len()))]
    pub fn to_model(&self, fragment: &[ViewNode], schema: &SchemaRegistry, context: &str) -> ConversionResult {
        let mut api = ViewConversionApi::new(&self.view_to_model, schema, context);
        let nodes = api.convert_fragment(fragment);
        let result = api.finish(nodes);
        debug!(
            produced = result.nodes.len(),
            unrecognized = result.unrecognized.len(),
            "Converted view fragment"
        );
        result
    }
}
