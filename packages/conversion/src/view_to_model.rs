//! # View → Model
//!
//! Converts externally supplied view fragments (loaded or pasted content)
//! into model nodes. Element converters convert their children through
//! [`ViewConversionApi::convert_children`], which fires nested events with
//! the new element as schema context.
//!
//! Every produced node passes the schema gate ([`ViewConversionApi::accept`])
//! for the context it lands in. Rejected nodes and view nodes nobody claimed
//! are reported as [`Unrecognized`] and left out of the result; their
//! content is not merged into the parent.

use crate::consumable::{attribute_aspect, Consumable};
use crate::dispatcher::{Dispatcher, ListenerId};
use crate::event::{EventInfo, EventName};
use crate::report::{ConversionReport, Unrecognized, UnrecognizedReason};
use crate::ConversionError;
use std::rc::Rc;
use tracing::debug;
use vellum_common::Priority;
use vellum_model::ModelNode;
use vellum_schema::{SchemaRegistry, ROOT, TEXT};
use vellum_view::ViewNode;

pub type ViewHandler =
    Rc<dyn Fn(&mut EventInfo, &mut ViewToModelData, &mut ViewConversionApi<'_>) -> Result<(), ConversionError>>;

pub type ViewToModelDispatcher = Dispatcher<ViewHandler>;

/// Aspect of the view node itself (element name or text)
pub const NAME: &str = "name";

/// Consumable key: one aspect of the view node at a path of the input
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ViewAspect {
    pub path: Vec<usize>,
    pub kind: String,
}

impl ViewAspect {
    pub fn new(path: &[usize], kind: &str) -> Self {
        Self {
            path: path.to_vec(),
            kind: kind.to_string(),
        }
    }
}

/// Payload of a view → model event
#[derive(Debug, Clone, PartialEq)]
pub struct ViewToModelData {
    pub input: ViewNode,
    /// Path of `input` inside the converted fragment
    pub path: Vec<usize>,
    /// Model nodes produced for `input`
    pub output: Vec<ModelNode>,
}

/// Outcome of converting a view fragment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionResult {
    pub nodes: Vec<ModelNode>,
    pub unrecognized: Vec<Unrecognized>,
    pub report: ConversionReport,
}

impl Dispatcher<ViewHandler> {
    /// Register a view → model listener
    pub fn on<F>(&mut self, pattern: impl Into<EventName>, priority: Priority, handler: F) -> ListenerId
    where
        F: Fn(&mut EventInfo, &mut ViewToModelData, &mut ViewConversionApi<'_>) -> Result<(), ConversionError>
            + 'static,
    {
        self.register(pattern, priority, Rc::new(handler))
    }
}

pub struct ViewConversionApi<'a> {
    dispatcher: &'a ViewToModelDispatcher,
    pub schema: &'a SchemaRegistry,
    pub consumable: Consumable<ViewAspect>,
    context: Vec<String>,
    unrecognized: Vec<Unrecognized>,
    report: ConversionReport,
}

impl<'a> ViewConversionApi<'a> {
    pub fn new(dispatcher: &'a ViewToModelDispatcher, schema: &'a SchemaRegistry, context: &str) -> Self {
        Self {
            dispatcher,
            schema,
            consumable: Consumable::new(),
            context: vec![context.to_string()],
            unrecognized: Vec::new(),
            report: ConversionReport::default(),
        }
    }

    /// Model name of the element the current nodes convert into
    pub fn context(&self) -> &str {
        self.context.last().map(String::as_str).unwrap_or(ROOT)
    }

    pub fn consume(&mut self, path: &[usize], kind: &str) -> bool {
        self.consumable.consume(&ViewAspect::new(path, kind))
    }

    pub fn test(&self, path: &[usize], kind: &str) -> bool {
        self.consumable.is_available(&ViewAspect::new(path, kind))
    }

    /// Convert top-level fragment nodes in the initial context
    pub fn convert_fragment(&mut self, nodes: &[ViewNode]) -> Vec<ModelNode> {
        let mut output = Vec::new();
        for (index, node) in nodes.iter().enumerate() {
            output.extend(self.convert_node(node, vec![index]));
        }
        output
    }

    /// Convert `children` as the content of a model element named `context`
    pub fn convert_children(&mut self, children: &[ViewNode], context: &str, parent_path: &[usize]) -> Vec<ModelNode> {
        self.context.push(context.to_string());

        let mut output = Vec::new();
        for (index, child) in children.iter().enumerate() {
            let mut path = parent_path.to_vec();
            path.push(index);
            output.extend(self.convert_node(child, path));
        }

        self.context.pop();
        output
    }

    pub fn convert_node(&mut self, node: &ViewNode, path: Vec<usize>) -> Vec<ModelNode> {
        let name = match node {
            ViewNode::Element(element) => {
                for key in element.attributes.keys() {
                    self.consumable.add(ViewAspect::new(&path, &attribute_aspect(key)));
                }
                EventName::element(&element.name)
            }
            ViewNode::Text { .. } => EventName::text(),
        };
        self.consumable.add(ViewAspect::new(&path, NAME));

        let mut data = ViewToModelData {
            input: node.clone(),
            path,
            output: Vec::new(),
        };

        let dispatcher = self.dispatcher;
        let outcome = dispatcher.fire_with(&name, |handler, info| handler(info, &mut data, &mut *self));
        self.report.record(outcome);

        if self.test(&data.path, NAME) {
            debug!(event = %name, path = ?data.path, "No converter claimed view node");
            self.report.miss(name);
            self.flag(&data, UnrecognizedReason::NoConverter);
        }

        data.output
    }

    /// Schema gate: whether `node` may be placed in the current context.
    /// A rejected node is reported against `data.input`.
    pub fn accept(&mut self, node: &ModelNode, data: &ViewToModelData) -> bool {
        match self.schema.check_in_context(self.context(), node) {
            Ok(()) => true,
            Err(violation) => {
                debug!(path = ?data.path, error = %violation, "Schema rejected converted node");
                self.flag(data, UnrecognizedReason::SchemaRejected);
                false
            }
        }
    }

    /// Record that part of `data.input` (an attribute) could not be kept
    /// on the nodes produced for it
    pub fn reject_partially(&mut self, data: &ViewToModelData) {
        debug!(path = ?data.path, "Schema rejected part of a view node");
        self.flag(data, UnrecognizedReason::SchemaRejected);
    }

    pub fn finish(self, nodes: Vec<ModelNode>) -> ConversionResult {
        ConversionResult {
            nodes,
            unrecognized: self.unrecognized,
            report: self.report,
        }
    }

    fn flag(&mut self, data: &ViewToModelData, reason: UnrecognizedReason) {
        self.unrecognized.push(Unrecognized {
            path: data.path.clone(),
            name: data.input.name().unwrap_or("#text").to_string(),
            reason,
        });
    }
}

pub(crate) fn register_defaults(dispatcher: &mut ViewToModelDispatcher) {
    dispatcher.on(EventName::text(), Priority::Normal, convert_text);
}

fn convert_text(
    _: &mut EventInfo,
    data: &mut ViewToModelData,
    api: &mut ViewConversionApi<'_>,
) -> Result<(), ConversionError> {
    let Some(text) = data.input.data() else {
        return Ok(());
    };

    // Formatting whitespace between blocks
    if text.trim().is_empty() && !api.schema.can_contain(api.context(), TEXT) {
        api.consume(&data.path, NAME);
        return Ok(());
    }

    let node = ModelNode::text(text);
    if !api.consume(&data.path, NAME) {
        return Ok(());
    }
    if api.accept(&node, data) {
        data.output.push(node);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::view_converter;
    use vellum_schema::{Rule, BLOCK};
    use vellum_view::ViewElement;

    fn schema() -> SchemaRegistry {
        let mut schema = SchemaRegistry::new();
        schema.register_type_extending("paragraph", BLOCK).unwrap();
        schema.register_type("blockQuote").unwrap();
        schema.allow(Rule::new("blockQuote", ROOT)).unwrap();
        schema.allow(Rule::new(BLOCK, "blockQuote")).unwrap();
        schema.seal();
        schema
    }

    fn dispatcher() -> ViewToModelDispatcher {
        let mut dispatcher = Dispatcher::new("test");
        register_defaults(&mut dispatcher);
        view_converter(&mut dispatcher)
            .from_element("p")
            .to_element(|_| Some(ModelNode::element("paragraph")));
        view_converter(&mut dispatcher)
            .from_element("blockquote")
            .to_element(|_| Some(ModelNode::element("blockQuote")));
        dispatcher
    }

    fn convert(dispatcher: &ViewToModelDispatcher, schema: &SchemaRegistry, fragment: &[ViewNode]) -> ConversionResult {
        let mut api = ViewConversionApi::new(dispatcher, schema, ROOT);
        let nodes = api.convert_fragment(fragment);
        api.finish(nodes)
    }

    fn p(text: &str) -> ViewNode {
        ViewElement::new("p").with_child(ViewNode::text(text)).into()
    }

    #[test]
    fn test_converts_nested_blocks() {
        let schema = schema();
        let dispatcher = dispatcher();

        let fragment = vec![p("a"), ViewElement::new("blockquote").with_child(p("b")).into()];
        let result = convert(&dispatcher, &schema, &fragment);

        assert!(result.unrecognized.is_empty());
        assert_eq!(
            result.nodes,
            vec![
                ModelNode::element("paragraph").with_child(ModelNode::text("a")),
                ModelNode::element("blockQuote")
                    .with_child(ModelNode::element("paragraph").with_child(ModelNode::text("b"))),
            ]
        );
    }

    #[test]
    fn test_unknown_element_is_flagged_not_merged() {
        let schema = schema();
        let dispatcher = dispatcher();

        let fragment = vec![
            ViewElement::new("marquee").with_child(p("hidden")).into(),
            p("kept"),
        ];
        let result = convert(&dispatcher, &schema, &fragment);

        assert_eq!(result.nodes.len(), 1);
        assert_eq!(
            result.unrecognized,
            vec![Unrecognized {
                path: vec![0],
                name: "marquee".to_string(),
                reason: UnrecognizedReason::NoConverter,
            }]
        );
        assert_eq!(result.report.misses, vec![EventName::element("marquee")]);
    }

    #[test]
    fn test_schema_rejection_is_flagged() {
        let schema = schema();
        let dispatcher = dispatcher();

        // Text is not allowed directly in the root; a paragraph inside a paragraph is not allowed either
        let fragment = vec![
            ViewNode::text("loose"),
            ViewElement::new("p").with_child(p("inner")).into(),
        ];
        let result = convert(&dispatcher, &schema, &fragment);

        assert_eq!(result.nodes, vec![ModelNode::element("paragraph")]);
        let reasons: Vec<(Vec<usize>, &str, UnrecognizedReason)> = result
            .unrecognized
            .iter()
            .map(|entry| (entry.path.clone(), entry.name.as_str(), entry.reason))
            .collect();
        assert_eq!(
            reasons,
            vec![
                (vec![0], "#text", UnrecognizedReason::SchemaRejected),
                (vec![1, 0], "p", UnrecognizedReason::SchemaRejected),
            ]
        );
    }

    #[test]
    fn test_whitespace_between_blocks_is_dropped() {
        let schema = schema();
        let dispatcher = dispatcher();

        let fragment = vec![p("a"), ViewNode::text("\n  "), p("b")];
        let result = convert(&dispatcher, &schema, &fragment);

        assert_eq!(result.nodes.len(), 2);
        assert!(result.unrecognized.is_empty());
    }

    #[test]
    fn test_fault_in_view_converter_is_isolated() {
        let schema = schema();
        let mut dispatcher = dispatcher();
        dispatcher.on(
            EventName::element("p"),
            Priority::High,
            |_: &mut EventInfo, _: &mut ViewToModelData, _: &mut ViewConversionApi<'_>| {
                Err(ConversionError::from("bad paste handler"))
            },
        );

        let result = convert(&dispatcher, &schema, &[p("survives")]);

        assert_eq!(result.nodes.len(), 1);
        assert_eq!(result.report.faults.len(), 1);
    }
}
