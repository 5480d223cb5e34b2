//! Integration tests for the fringe walker and the dual renderers

use proptest::prelude::*;
use warden_document::{
    FringeWalker, InnerNode, RenderContext, Tag, render_html, render_plain, standard,
};

// =============================================================================
// Arbitrary documents
// =============================================================================

#[derive(Clone, Debug)]
enum Shape {
    Text(String),
    Code(String),
    Node(Tag, Vec<Shape>),
}

const CONTAINERS: [Tag; 9] = [
    Tag::Fragment,
    Tag::Paragraph,
    Tag::OrderedList,
    Tag::UnorderedList,
    Tag::ListItem,
    Tag::Strong,
    Tag::Emphasis,
    Tag::Details,
    Tag::Summary,
];

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        "[a-z<>& ]{0,12}".prop_map(Shape::Text),
        "[a-z]{1,8}".prop_map(Shape::Code),
    ];
    leaf.prop_recursive(4, 48, 5, |inner| {
        (
            prop::sample::select(CONTAINERS.to_vec()),
            prop::collection::vec(inner, 0..5),
        )
            .prop_map(|(tag, children)| Shape::Node(tag, children))
    })
}

fn build(parent: &mut InnerNode, shape: &Shape) {
    match shape {
        Shape::Text(text) => {
            parent.text(text.clone());
        }
        Shape::Code(code) => {
            parent.block_code(code.clone());
        }
        Shape::Node(tag, children) => {
            let node = parent.child(*tag);
            for child in children {
                build(node, child);
            }
        }
    }
}

fn document(shapes: &[Shape]) -> InnerNode {
    let mut root = InnerNode::root();
    for shape in shapes {
        build(&mut root, shape);
    }
    root
}

fn committed_nodes(
    document: &InnerNode,
    table: &warden_document::RendererTable<RenderContext>,
) -> Vec<usize> {
    let mut walker = FringeWalker::new(document, table, RenderContext::unbounded());
    let mut nodes = Vec::new();
    while let Some(node) = walker.increment().unwrap() {
        nodes.push(std::ptr::from_ref(node) as usize);
    }
    nodes
}

// =============================================================================
// Lockstep
// =============================================================================

proptest! {
    #[test]
    fn both_formats_commit_the_same_nodes(shapes in prop::collection::vec(shape(), 0..6)) {
        let document = document(&shapes);
        let renderers = standard().unwrap();
        let plain = committed_nodes(&document, renderers.plain());
        let html = committed_nodes(&document, renderers.html());
        prop_assert_eq!(plain, html);
    }

    #[test]
    fn html_text_is_escaped(text in "[a-z<>&\"]{1,20}") {
        let mut root = InnerNode::root();
        root.paragraph().text(text.clone());
        let html = render_html(&root).unwrap();
        let inner = &html["<p>".len()..html.len() - "</p>".len()];
        prop_assert!(!inner.contains('<'));
        prop_assert!(!inner.contains('>'));
        prop_assert_eq!(render_plain(&root).unwrap(), format!("{text}\n\n"));
    }
}

#[test]
fn committable_nodes_are_returned_in_completion_order() {
    let mut root = InnerNode::root();
    root.paragraph().text("Hello");
    let list = root.unordered_list();
    list.list_item().text("a");
    list.list_item().text("b");

    let renderers = standard().unwrap();
    let mut walker = FringeWalker::new(&root, renderers.plain(), RenderContext::unbounded());
    let mut tags = Vec::new();
    while let Some(node) = walker.increment().unwrap() {
        tags.push(node.tag());
    }
    assert_eq!(
        tags,
        vec![Tag::Paragraph, Tag::ListItem, Tag::ListItem, Tag::UnorderedList]
    );
    assert!(walker.is_exhausted());
    assert!(walker.increment().unwrap().is_none());
}

#[test]
fn nested_lists_render_in_both_formats() {
    let mut root = InnerNode::root();
    let outer = root.ordered_list();
    let first = outer.list_item();
    first.text("rooms");
    let inner = first.unordered_list();
    inner.list_item().inline_code("#a:example.org");
    inner.list_item().inline_code("#b:example.org");
    outer.list_item().text("users");

    assert_eq!(
        render_plain(&root).unwrap(),
        "1. rooms\n  - `#a:example.org`\n  - `#b:example.org`\n2. users\n\n"
    );
    assert_eq!(
        render_html(&root).unwrap(),
        "<ol><li>rooms<ul><li><code>#a:example.org</code></li>\
         <li><code>#b:example.org</code></li></ul></li><li>users</li></ol>"
    );
}
