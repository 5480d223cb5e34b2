//! Document trees and incremental dual-format rendering for Warden.
//!
//! This crate provides:
//! - [`InnerNode`] / [`Node`] - Tagged document trees
//! - [`FringeWalker`] - Step-by-step rendering up to each committable node
//! - [`DualRenderers`] - Plain text and HTML render tables declared together
//! - [`PagedDuplexStream`] - Size-bounded paging of rendered output

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod fringe;
pub mod html;
pub mod node;
pub mod paged;
pub mod plain;
pub mod renderer;

pub use fringe::{Environment, FringeEntry, FringeKind, FringeNode, FringeWalker, fringe};
pub use node::{Attributes, InnerNode, LeafNode, Node, Tag};
pub use paged::{DEFAULT_PAGE_SIZE_LIMIT, PagedDuplexStream};
pub use renderer::{
    DualRenderers, ListMarker, RenderContext, RendererTable, render_html, render_plain,
    render_to_string, standard,
};
