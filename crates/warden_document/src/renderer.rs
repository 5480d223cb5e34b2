//! Per-format render tables.
//!
//! A [`RendererTable`] maps a fringe position and a tag to the function that
//! writes that part of a node. The plain and HTML tables are never built
//! separately: every entry is declared once through [`DualRenderers`], which
//! registers both formats at the same key so the two tables always cover
//! the same nodes.

use std::collections::HashMap;
use std::sync::OnceLock;

use warden_foundation::{Error, Registry, Result};

use crate::fringe::{Environment, FringeKind, FringeNode, FringeWalker};
use crate::node::{InnerNode, Tag};
use crate::paged::PagedDuplexStream;
use crate::{html, plain};

/// A function that renders one fringe entry into a context.
pub type RenderFn<C> = Box<dyn Fn(FringeNode<'_>, &mut C) + Send + Sync>;

/// Render functions for one output format.
pub struct RendererTable<C> {
    format: &'static str,
    functions: HashMap<(FringeKind, Tag), RenderFn<C>>,
}

impl<C> RendererTable<C> {
    /// Creates an empty table for the named format.
    #[must_use]
    pub fn new(format: &'static str) -> Self {
        Self {
            format,
            functions: HashMap::new(),
        }
    }

    /// Returns the name of the format.
    #[must_use]
    pub const fn format(&self) -> &'static str {
        self.format
    }

    /// Returns true if a function is registered for `kind` and `tag`.
    #[must_use]
    pub fn contains(&self, kind: FringeKind, tag: Tag) -> bool {
        self.functions.contains_key(&(kind, tag))
    }

    /// Registers the function for `kind` and `tag`.
    ///
    /// # Errors
    ///
    /// Fails if a function is already registered for that key.
    pub fn register(
        &mut self,
        kind: FringeKind,
        tag: Tag,
        render: impl Fn(FringeNode<'_>, &mut C) + Send + Sync + 'static,
    ) -> Result<&mut Self> {
        if self.contains(kind, tag) {
            return Err(Error::duplicate(
                Registry::Renderer,
                format!("{} {kind} {tag}", self.format),
            ));
        }
        self.functions.insert((kind, tag), Box::new(render));
        Ok(self)
    }

    /// Looks up the function for `kind` and `tag`.
    ///
    /// # Errors
    ///
    /// Fails if nothing is registered for that key.
    pub fn get(&self, kind: FringeKind, tag: Tag) -> Result<&RenderFn<C>> {
        self.functions
            .get(&(kind, tag))
            .ok_or_else(|| Error::missing_renderer(self.format, format!("{kind} {tag}")))
    }

    /// Returns every registered key.
    pub fn keys(&self) -> impl Iterator<Item = (FringeKind, Tag)> + '_ {
        self.functions.keys().copied()
    }
}

/// How the innermost enclosing list marks its items in plain text.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ListMarker {
    /// `- `
    Bullet,
    /// `N. `, holding the number of the next item.
    Ordinal(usize),
}

/// The context both standard formats render into.
#[derive(Clone, Debug)]
pub struct RenderContext {
    /// Buffered and paged output.
    pub output: PagedDuplexStream,
    /// List bindings, keyed by [`Tag::ListItem`].
    pub lists: Environment<ListMarker>,
}

impl RenderContext {
    /// Creates a context whose pages hold at most `size_limit` bytes.
    #[must_use]
    pub fn new(size_limit: usize) -> Self {
        Self {
            output: PagedDuplexStream::new(size_limit),
            lists: Environment::new(),
        }
    }

    /// Creates a context that never splits pages.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::new(usize::MAX)
    }
}

/// A plain table and an HTML table that are only ever extended together.
pub struct DualRenderers<C> {
    plain: RendererTable<C>,
    html: RendererTable<C>,
}

impl<C> Default for DualRenderers<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> DualRenderers<C> {
    /// Creates an empty pair of tables.
    #[must_use]
    pub fn new() -> Self {
        Self {
            plain: RendererTable::new("plain"),
            html: RendererTable::new("html"),
        }
    }

    /// Declares how both formats render `kind` of `tag`.
    ///
    /// # Errors
    ///
    /// Fails, registering neither function, if the key is already declared.
    pub fn declare(
        &mut self,
        kind: FringeKind,
        tag: Tag,
        plain: impl Fn(FringeNode<'_>, &mut C) + Send + Sync + 'static,
        html: impl Fn(FringeNode<'_>, &mut C) + Send + Sync + 'static,
    ) -> Result<&mut Self> {
        if self.html.contains(kind, tag) {
            return Err(Error::duplicate(
                Registry::Renderer,
                format!("{kind} {tag}"),
            ));
        }
        self.plain.register(kind, tag, plain)?;
        self.html.register(kind, tag, html)?;
        Ok(self)
    }

    /// Returns the plain text table.
    #[must_use]
    pub const fn plain(&self) -> &RendererTable<C> {
        &self.plain
    }

    /// Returns the HTML table.
    #[must_use]
    pub const fn html(&self) -> &RendererTable<C> {
        &self.html
    }
}

impl DualRenderers<RenderContext> {
    /// Declares a tag whose entry and exit render as fixed strings.
    ///
    /// # Errors
    ///
    /// Fails if either position of the tag is already declared.
    pub fn declare_static(
        &mut self,
        tag: Tag,
        plain: (&'static str, &'static str),
        html: (&'static str, &'static str),
    ) -> Result<&mut Self> {
        self.declare(
            FringeKind::Pre,
            tag,
            move |_, context| {
                context.output.write_str(plain.0);
            },
            move |_, context| {
                context.output.write_str(html.0);
            },
        )?;
        self.declare(
            FringeKind::Post,
            tag,
            move |_, context| {
                context.output.write_str(plain.1);
            },
            move |_, context| {
                context.output.write_str(html.1);
            },
        )
    }

    /// Builds the renderers for every tag.
    ///
    /// # Errors
    ///
    /// Fails only if a tag is declared twice.
    pub fn standard() -> Result<Self> {
        let mut renderers = Self::new();
        renderers
            .declare(
                FringeKind::Leaf,
                Tag::Text,
                |node, context| {
                    context.output.write_str(node.data());
                },
                |node, context| {
                    context.output.write_str(&html::escape(node.data()));
                },
            )?
            .declare_static(Tag::Root, ("", ""), ("", ""))?
            .declare_static(Tag::Fragment, ("", ""), ("", ""))?
            .declare_static(Tag::Paragraph, ("", "\n\n"), ("<p>", "</p>"))?
            .declare_static(Tag::InlineCode, ("`", "`"), ("<code>", "</code>"))?
            .declare_static(Tag::Strong, ("**", "**"), ("<strong>", "</strong>"))?
            .declare_static(Tag::Emphasis, ("*", "*"), ("<em>", "</em>"))?
            .declare_static(Tag::Summary, ("", "\n"), ("<summary>", "</summary>"))?
            .declare_static(Tag::LineBreak, ("\n", ""), ("<br/>", ""))?
            .declare(
                FringeKind::Pre,
                Tag::Heading,
                |node, context| plain::open_heading(context, node),
                |node, context| html::open_heading(context, node),
            )?
            .declare(
                FringeKind::Post,
                Tag::Heading,
                |_, context| {
                    context.output.write_str("\n\n");
                },
                |node, context| html::close_heading(context, node),
            )?
            .declare(
                FringeKind::Pre,
                Tag::OrderedList,
                |node, context| {
                    let start = node.inner().and_then(|inner| inner.attributes().start);
                    plain::enter_list(context, ListMarker::Ordinal(start.unwrap_or(1)));
                },
                |node, context| html::open_ordered_list(context, node),
            )?
            .declare(
                FringeKind::Post,
                Tag::OrderedList,
                |_, context| plain::leave_list(context),
                |_, context| {
                    context.output.write_str("</ol>");
                },
            )?
            .declare(
                FringeKind::Pre,
                Tag::UnorderedList,
                |_, context| plain::enter_list(context, ListMarker::Bullet),
                |_, context| {
                    context.output.write_str("<ul>");
                },
            )?
            .declare(
                FringeKind::Post,
                Tag::UnorderedList,
                |_, context| plain::leave_list(context),
                |_, context| {
                    context.output.write_str("</ul>");
                },
            )?
            .declare(
                FringeKind::Pre,
                Tag::ListItem,
                |_, context| plain::open_list_item(context),
                |_, context| {
                    context.output.write_str("<li>");
                },
            )?
            .declare(
                FringeKind::Post,
                Tag::ListItem,
                |_, context| plain::end_line(context),
                |_, context| {
                    context.output.write_str("</li>");
                },
            )?
            .declare(
                FringeKind::Pre,
                Tag::BlockCode,
                |_, context| {
                    context.output.write_str("```\n");
                },
                |_, context| {
                    context.output.write_str("<pre><code>");
                },
            )?
            .declare(
                FringeKind::Post,
                Tag::BlockCode,
                |_, context| {
                    plain::end_line(context);
                    context.output.write_str("```\n");
                },
                |_, context| {
                    context.output.write_str("</code></pre>");
                },
            )?
            .declare(
                FringeKind::Pre,
                Tag::Anchor,
                |_, context| {
                    context.output.write_str("[");
                },
                |node, context| html::open_anchor(context, node),
            )?
            .declare(
                FringeKind::Post,
                Tag::Anchor,
                |node, context| plain::close_anchor(context, node),
                |_, context| {
                    context.output.write_str("</a>");
                },
            )?
            .declare(
                FringeKind::Pre,
                Tag::Details,
                |_, _| {},
                |_, context| {
                    context.output.write_str("<details>");
                },
            )?
            .declare(
                FringeKind::Post,
                Tag::Details,
                |_, context| plain::end_line(context),
                |_, context| {
                    context.output.write_str("</details>");
                },
            )?;
        Ok(renderers)
    }
}

static STANDARD: OnceLock<std::result::Result<DualRenderers<RenderContext>, String>> =
    OnceLock::new();

/// Returns the shared standard renderers, building them on first use.
///
/// # Errors
///
/// Fails if the standard declarations are inconsistent.
pub fn standard() -> Result<&'static DualRenderers<RenderContext>> {
    STANDARD
        .get_or_init(|| DualRenderers::standard().map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|message| Error::internal(message.clone()))
}

/// Renders a whole document with one table, without paging.
///
/// # Errors
///
/// Fails if a node has no render function.
pub fn render_to_string(table: &RendererTable<RenderContext>, root: &InnerNode) -> Result<String> {
    let mut walker = FringeWalker::new(root, table, RenderContext::unbounded())
        .with_commit_hook(|_, context: &mut RenderContext| context.output.commit());
    while walker.increment()?.is_some() {}
    let pages = walker.context_mut().output.finish()?;
    Ok(pages.concat())
}

/// Renders a document as plain text.
///
/// # Errors
///
/// Fails if a node has no render function.
pub fn render_plain(root: &InnerNode) -> Result<String> {
    render_to_string(standard()?.plain(), root)
}

/// Renders a document as HTML.
///
/// # Errors
///
/// Fails if a node has no render function.
pub fn render_html(root: &InnerNode) -> Result<String> {
    render_to_string(standard()?.html(), root)
}
