//! Plain text rendering helpers.
//!
//! The plain format is markdown-flavoured text for clients that do not
//! display HTML.

use crate::fringe::FringeNode;
use crate::node::Tag;
use crate::renderer::{ListMarker, RenderContext};

/// Ends the current line unless it is already ended.
pub fn end_line(context: &mut RenderContext) {
    if context.output.last_char().is_some_and(|c| c != '\n') {
        context.output.write_str("\n");
    }
}

pub(crate) fn open_heading(context: &mut RenderContext, node: FringeNode<'_>) {
    let level = node
        .inner()
        .and_then(|inner| inner.attributes().level)
        .unwrap_or(1);
    let prefix = "#".repeat(usize::from(level));
    context.output.write_str(&prefix).write_str(" ");
}

pub(crate) fn enter_list(context: &mut RenderContext, marker: ListMarker) {
    // A list nested in an item starts on the line after the item's text.
    if context.lists.depth(Tag::ListItem) > 0 {
        end_line(context);
    }
    context.lists.bind(Tag::ListItem, marker);
}

pub(crate) fn leave_list(context: &mut RenderContext) {
    context.lists.unbind(Tag::ListItem);
    if context.lists.depth(Tag::ListItem) == 0 {
        context.output.write_str("\n");
    }
}

pub(crate) fn open_list_item(context: &mut RenderContext) {
    let depth = context.lists.depth(Tag::ListItem);
    let indent = "  ".repeat(depth.saturating_sub(1));
    let marker = match context.lists.read_mut(Tag::ListItem) {
        Some(ListMarker::Ordinal(next)) => {
            let marker = format!("{next}. ");
            *next += 1;
            marker
        }
        Some(ListMarker::Bullet) | None => "- ".to_string(),
    };
    context.output.write_str(&indent).write_str(&marker);
}

pub(crate) fn close_anchor(context: &mut RenderContext, node: FringeNode<'_>) {
    let href = node
        .inner()
        .and_then(|inner| inner.attributes().href.as_deref())
        .unwrap_or_default();
    context.output.write_str("](").write_str(href).write_str(")");
}
