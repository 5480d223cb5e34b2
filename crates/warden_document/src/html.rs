//! HTML rendering helpers.

use crate::fringe::FringeNode;
use crate::renderer::RenderContext;

/// Escapes text for use in HTML content and attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn heading_level(node: FringeNode<'_>) -> u8 {
    node.inner()
        .and_then(|inner| inner.attributes().level)
        .unwrap_or(1)
}

pub(crate) fn open_heading(context: &mut RenderContext, node: FringeNode<'_>) {
    let tag = format!("<h{}>", heading_level(node));
    context.output.write_str(&tag);
}

pub(crate) fn close_heading(context: &mut RenderContext, node: FringeNode<'_>) {
    let tag = format!("</h{}>", heading_level(node));
    context.output.write_str(&tag);
}

pub(crate) fn open_ordered_list(context: &mut RenderContext, node: FringeNode<'_>) {
    match node.inner().and_then(|inner| inner.attributes().start) {
        Some(start) => {
            let tag = format!("<ol start=\"{start}\">");
            context.output.write_str(&tag);
        }
        None => {
            context.output.write_str("<ol>");
        }
    }
}

pub(crate) fn open_anchor(context: &mut RenderContext, node: FringeNode<'_>) {
    let href = node
        .inner()
        .and_then(|inner| inner.attributes().href.as_deref())
        .unwrap_or_default();
    let tag = format!("<a href=\"{}\">", escape(href));
    context.output.write_str(&tag);
}
