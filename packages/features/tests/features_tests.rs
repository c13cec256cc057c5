//! End-to-end tests of the standard features through the editor

use vellum_conversion::{EventName, UnrecognizedReason};
use vellum_editor::{Editor, EditorBuilder, EditorConfig, EditorError};
use vellum_features::{standard_features, ALIGNMENT, BLOCK_QUOTE, IMAGE, PARAGRAPH};
use vellum_model::{Batch, ModelNode, Position, Selection, MAIN_ROOT};
use vellum_view::{ViewSelection, CONTENT_EDITABLE};

fn editor() -> anyhow::Result<Editor> {
    editor_with(EditorConfig::default())
}

fn editor_with(config: EditorConfig) -> anyhow::Result<Editor> {
    Ok(EditorBuilder::new(config)
        .with_features(standard_features())
        .build()?)
}

fn at(path: &[usize]) -> Position {
    Position::new(MAIN_ROOT, path.to_vec())
}

fn image(src: &str, alt: Option<&str>) -> ModelNode {
    let node = ModelNode::element(IMAGE).with_attr("src", src);
    match alt {
        Some(alt) => node.with_attr("alt", alt),
        None => node,
    }
}

const DOCUMENT: &str = r#"[
    { "type": "element", "name": "p", "attributes": { "data-align": "center" },
      "children": [{ "type": "text", "data": "Intro" }] },
    { "type": "text", "data": "\n" },
    { "type": "element", "name": "blockquote",
      "children": [
        { "type": "element", "name": "p", "children": [{ "type": "text", "data": "Quoted" }] }
      ] },
    { "type": "element", "name": "figure", "attributes": { "class": "image" },
      "children": [
        { "type": "element", "name": "img", "attributes": { "src": "a.png", "alt": "Example" } }
      ] }
]"#;

const DOCUMENT_HTML: &str = concat!(
    r#"<p data-align="center">Intro</p>"#,
    "<blockquote><p>Quoted</p></blockquote>",
    r#"<figure class="image"><img alt="Example" src="a.png"></figure>"#,
);

#[test]
fn test_standard_features_are_initialized() -> anyhow::Result<()> {
    let editor = editor()?;

    assert_eq!(editor.features(), &[PARAGRAPH, BLOCK_QUOTE, ALIGNMENT, "widget", IMAGE]);
    assert!(editor.schema().is_object(IMAGE));
    Ok(())
}

#[test]
fn test_data_round_trip() -> anyhow::Result<()> {
    let mut editor = editor()?;

    let result = editor.set_data_json(MAIN_ROOT, DOCUMENT)?;
    assert!(result.unrecognized.is_empty(), "{:?}", result.unrecognized);
    assert_eq!(
        result.nodes,
        vec![
            ModelNode::element(PARAGRAPH)
                .with_attr(ALIGNMENT, "center")
                .with_child(ModelNode::text("Intro")),
            ModelNode::element(BLOCK_QUOTE)
                .with_child(ModelNode::element(PARAGRAPH).with_child(ModelNode::text("Quoted"))),
            image("a.png", Some("Example")),
        ]
    );

    assert_eq!(editor.get_data(MAIN_ROOT)?, DOCUMENT_HTML);

    // Loading the data view again yields the same document
    let fragment = editor.to_data_view(MAIN_ROOT)?;
    let again = serde_json::to_string(&fragment)?;
    editor.set_data_json(MAIN_ROOT, &again)?;
    assert_eq!(editor.get_data(MAIN_ROOT)?, DOCUMENT_HTML);
    Ok(())
}

#[test]
fn test_image_is_a_widget_in_the_editing_view() -> anyhow::Result<()> {
    let mut editor = editor()?;
    editor.set_data_json(MAIN_ROOT, DOCUMENT)?;

    let figure = editor.view().element_at(MAIN_ROOT, &[2]).unwrap();
    assert!(figure.is_widget());
    assert_eq!(figure.attribute(CONTENT_EDITABLE), Some("false"));
    assert_eq!(figure.attribute("class"), Some("image widget"));
    assert_eq!(figure.widget.as_ref().map(|marker| marker.kind.as_str()), Some(IMAGE));

    // The data view stays free of widget decoration
    assert!(!editor.get_data(MAIN_ROOT)?.contains("widget"));
    Ok(())
}

#[test]
fn test_fake_selection_label_from_alt() -> anyhow::Result<()> {
    let mut editor = editor()?;
    editor.change(|batch| {
        batch
            .insert(at(&[0]), image("a.png", Some("Example")))
            .set_selection(Selection::range(at(&[0]), at(&[1])));
    })?;

    let selection = editor.view().selection().unwrap();
    assert!(selection.is_fake());
    assert_eq!(selection.fake_label(), Some("Example"));
    Ok(())
}

#[test]
fn test_fake_selection_fallback_label() -> anyhow::Result<()> {
    let config = EditorConfig::from_json(r#"{ "fakeSelectionLabel": "Embedded object" }"#)?;
    let mut editor = editor_with(config)?;

    editor.change(|batch| {
        batch
            .insert(at(&[0]), ModelNode::element(PARAGRAPH))
            .insert(at(&[1]), image("a.png", None))
            .set_selection(Selection::collapsed(at(&[1])));
    })?;
    assert_eq!(editor.view().selection().and_then(ViewSelection::fake_label), Some("Embedded object"));

    // Moving into the paragraph returns to a plain range selection
    editor.set_selection(Some(Selection::collapsed(at(&[0, 0]))))?;
    assert!(matches!(editor.view().selection(), Some(ViewSelection::Range { .. })));
    Ok(())
}

#[test]
fn test_image_without_src_is_rejected() -> anyhow::Result<()> {
    let mut editor = editor()?;
    editor.set_data_json(MAIN_ROOT, DOCUMENT)?;
    let before = editor.view().clone();

    let mut batch = Batch::new();
    batch.insert(at(&[0]), ModelNode::element(IMAGE).with_attr("alt", "No source"));
    assert!(matches!(editor.apply(&batch), Err(EditorError::Model(_))));
    assert_eq!(editor.view(), &before);

    // The same image coming from data is flagged instead of loaded
    let result = editor.set_data_json(
        MAIN_ROOT,
        r#"[{ "type": "element", "name": "figure", "attributes": { "class": "image" },
              "children": [{ "type": "element", "name": "img", "attributes": { "alt": "No source" } }] }]"#,
    )?;
    assert!(result.nodes.is_empty());
    assert_eq!(result.unrecognized.len(), 1);
    assert_eq!(result.unrecognized[0].reason, UnrecognizedReason::SchemaRejected);
    Ok(())
}

#[test]
fn test_image_is_not_allowed_in_block_quote() -> anyhow::Result<()> {
    let mut editor = editor()?;

    let result = editor.set_data_json(
        MAIN_ROOT,
        r#"[{ "type": "element", "name": "blockquote", "children": [
              { "type": "element", "name": "figure", "attributes": { "class": "image" },
                "children": [{ "type": "element", "name": "img", "attributes": { "src": "a.png" } }] }
            ] }]"#,
    )?;

    assert_eq!(result.nodes, vec![ModelNode::element(BLOCK_QUOTE)]);
    assert_eq!(result.unrecognized[0].path, vec![0, 0]);
    assert_eq!(result.unrecognized[0].reason, UnrecognizedReason::SchemaRejected);
    Ok(())
}

#[test]
fn test_alignment_change_updates_view_in_place() -> anyhow::Result<()> {
    let mut editor = editor()?;
    editor.change(|batch| {
        batch.insert(at(&[0]), ModelNode::element(PARAGRAPH).with_child(ModelNode::text("x")));
    })?;

    let report = editor.change(|batch| {
        batch.set_attribute(at(&[0]), ALIGNMENT, "right");
    })?;
    assert!(report.misses.is_empty());

    let paragraph = editor.view().element_at(MAIN_ROOT, &[0]).unwrap();
    assert_eq!(paragraph.attribute("data-align"), Some("right"));
    assert_eq!(editor.get_data(MAIN_ROOT)?, r#"<p data-align="right">x</p>"#);

    // Unsupported values are not rendered and the loss is reported
    let report = editor.change(|batch| {
        batch.set_attribute(at(&[0]), ALIGNMENT, "diagonal");
    })?;
    assert_eq!(report.misses, vec![EventName::attribute(ALIGNMENT, PARAGRAPH)]);
    assert_eq!(editor.get_data(MAIN_ROOT)?, "<p>x</p>");
    Ok(())
}

#[test]
fn test_unsupported_alignment_on_insert_is_reported() -> anyhow::Result<()> {
    let mut editor = editor()?;

    let report = editor.change(|batch| {
        batch.insert(
            at(&[0]),
            ModelNode::element(PARAGRAPH)
                .with_attr(ALIGNMENT, "diagonal")
                .with_child(ModelNode::text("x")),
        );
    })?;

    assert_eq!(report.misses, vec![EventName::attribute(ALIGNMENT, PARAGRAPH)]);
    let paragraph = editor.view().element_at(MAIN_ROOT, &[0]).unwrap();
    assert_eq!(paragraph.attribute("data-align"), None);
    Ok(())
}

#[test]
fn test_alignment_is_limited_to_root_paragraphs() -> anyhow::Result<()> {
    let mut editor = editor()?;

    let mut batch = Batch::new();
    batch.insert(
        at(&[0]),
        ModelNode::element(BLOCK_QUOTE).with_child(
            ModelNode::element(PARAGRAPH)
                .with_attr(ALIGNMENT, "center")
                .with_child(ModelNode::text("x")),
        ),
    );
    assert!(matches!(editor.apply(&batch), Err(EditorError::Model(_))));

    let result = editor.set_data_json(
        MAIN_ROOT,
        r#"[{ "type": "element", "name": "blockquote", "children": [
              { "type": "element", "name": "p", "attributes": { "data-align": "center" },
                "children": [{ "type": "text", "data": "x" }] }
            ] }]"#,
    )?;

    assert_eq!(
        result.nodes,
        vec![ModelNode::element(BLOCK_QUOTE)
            .with_child(ModelNode::element(PARAGRAPH).with_child(ModelNode::text("x")))]
    );
    assert_eq!(result.unrecognized.len(), 1);
    assert_eq!(result.unrecognized[0].path, vec![0, 0]);
    assert_eq!(result.unrecognized[0].name, "p");
    assert_eq!(result.unrecognized[0].reason, UnrecognizedReason::SchemaRejected);
    assert_eq!(editor.get_data(MAIN_ROOT)?, "<blockquote><p>x</p></blockquote>");
    Ok(())
}
