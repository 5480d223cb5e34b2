//! Incremental traversal of a document tree.
//!
//! The tree is flattened once into its fringe: a `Pre` entry when an inner
//! node is entered, a `Leaf` entry for each leaf and a `Post` entry when an
//! inner node is left. [`FringeWalker::increment`] runs the render function
//! for each entry until a committable node is left, which makes each step
//! a unit of output that can be flushed on its own.

use std::collections::HashMap;
use std::fmt;

use warden_foundation::Result;

use crate::node::{InnerNode, LeafNode, Node, Tag};
use crate::renderer::RendererTable;

/// Position of an entry in the fringe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FringeKind {
    /// An inner node is being entered.
    Pre,
    /// A leaf.
    Leaf,
    /// An inner node is being left.
    Post,
}

impl fmt::Display for FringeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pre => "pre",
            Self::Leaf => "leaf",
            Self::Post => "post",
        };
        f.write_str(name)
    }
}

/// A borrowed node as seen by a render function.
#[derive(Copy, Clone, Debug)]
pub enum FringeNode<'doc> {
    /// An inner node, on entry or exit.
    Inner(&'doc InnerNode),
    /// A text leaf.
    Leaf(&'doc LeafNode),
}

impl<'doc> FringeNode<'doc> {
    /// Returns the tag of the node.
    #[must_use]
    pub fn tag(self) -> Tag {
        match self {
            Self::Inner(inner) => inner.tag(),
            Self::Leaf(_) => Tag::Text,
        }
    }

    /// Returns the inner node, if this is one.
    #[must_use]
    pub fn inner(self) -> Option<&'doc InnerNode> {
        match self {
            Self::Inner(inner) => Some(inner),
            Self::Leaf(_) => None,
        }
    }

    /// Returns the text of a leaf, or the empty string for inner nodes.
    #[must_use]
    pub fn data(self) -> &'doc str {
        match self {
            Self::Leaf(leaf) => leaf.data(),
            Self::Inner(_) => "",
        }
    }
}

/// One step of the fringe.
#[derive(Copy, Clone, Debug)]
pub struct FringeEntry<'doc> {
    /// Where in the traversal this entry is.
    pub kind: FringeKind,
    /// The node visited.
    pub node: FringeNode<'doc>,
}

/// Flattens `root` into its fringe.
#[must_use]
pub fn fringe(root: &InnerNode) -> Vec<FringeEntry<'_>> {
    let mut flat = Vec::new();
    fringe_inner(root, &mut flat);
    flat
}

fn fringe_inner<'doc>(node: &'doc InnerNode, flat: &mut Vec<FringeEntry<'doc>>) {
    flat.push(FringeEntry {
        kind: FringeKind::Pre,
        node: FringeNode::Inner(node),
    });
    for child in node.children() {
        match child {
            Node::Inner(inner) => fringe_inner(inner, flat),
            Node::Leaf(leaf) => flat.push(FringeEntry {
                kind: FringeKind::Leaf,
                node: FringeNode::Leaf(leaf),
            }),
        }
    }
    flat.push(FringeEntry {
        kind: FringeKind::Post,
        node: FringeNode::Inner(node),
    });
}

/// Dynamically scoped bindings keyed by tag.
///
/// Render functions bind a value when a node is entered and unbind it when
/// the node is left, so nested nodes see the innermost binding.
#[derive(Clone, Debug)]
pub struct Environment<V> {
    bindings: HashMap<Tag, Vec<V>>,
}

impl<V> Default for Environment<V> {
    fn default() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }
}

impl<V> Environment<V> {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a binding for `tag`.
    pub fn bind(&mut self, tag: Tag, value: V) {
        self.bindings.entry(tag).or_default().push(value);
    }

    /// Returns the innermost binding for `tag`.
    #[must_use]
    pub fn read(&self, tag: Tag) -> Option<&V> {
        self.bindings.get(&tag).and_then(|stack| stack.last())
    }

    /// Returns the innermost binding for `tag` mutably.
    pub fn read_mut(&mut self, tag: Tag) -> Option<&mut V> {
        self.bindings.get_mut(&tag).and_then(|stack| stack.last_mut())
    }

    /// Pops the innermost binding for `tag`.
    pub fn unbind(&mut self, tag: Tag) -> Option<V> {
        self.bindings.get_mut(&tag).and_then(Vec::pop)
    }

    /// Returns how many bindings for `tag` are in scope.
    #[must_use]
    pub fn depth(&self, tag: Tag) -> usize {
        self.bindings.get(&tag).map_or(0, Vec::len)
    }
}

/// Called with each committable node when its `Post` entry has been rendered.
pub type CommitHook<'hook, C> = Box<dyn FnMut(&InnerNode, &mut C) -> Result<()> + Send + 'hook>;

/// Walks the fringe of a document, rendering into a context `C`.
pub struct FringeWalker<'doc, 'r, C> {
    entries: Vec<FringeEntry<'doc>>,
    cursor: usize,
    renderers: &'r RendererTable<C>,
    context: C,
    commit_hook: Option<CommitHook<'r, C>>,
}

impl<'doc, 'r, C> FringeWalker<'doc, 'r, C> {
    /// Creates a walker over `root`.
    #[must_use]
    pub fn new(root: &'doc InnerNode, renderers: &'r RendererTable<C>, context: C) -> Self {
        Self {
            entries: fringe(root),
            cursor: 0,
            renderers,
            context,
            commit_hook: None,
        }
    }

    /// Installs a hook to run whenever a committable node completes.
    #[must_use]
    pub fn with_commit_hook(
        mut self,
        hook: impl FnMut(&InnerNode, &mut C) -> Result<()> + Send + 'r,
    ) -> Self {
        self.commit_hook = Some(Box::new(hook));
        self
    }

    /// Renders up to and including the next committable node and returns
    /// it, or `None` once the fringe is exhausted.
    ///
    /// # Errors
    ///
    /// Fails if an entry has no render function, or if the commit hook
    /// fails.
    pub fn increment(&mut self) -> Result<Option<&'doc InnerNode>> {
        let renderers = self.renderers;
        while let Some(entry) = self.entries.get(self.cursor).copied() {
            self.cursor += 1;
            let render = renderers.get(entry.kind, entry.node.tag())?;
            render(entry.node, &mut self.context);
            if entry.kind != FringeKind::Post {
                continue;
            }
            if let FringeNode::Inner(inner) = entry.node {
                if inner.tag().is_committable() {
                    if let Some(hook) = self.commit_hook.as_mut() {
                        hook(inner, &mut self.context)?;
                    }
                    return Ok(Some(inner));
                }
            }
        }
        Ok(None)
    }

    /// Returns true once every entry has been rendered.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.entries.len()
    }

    /// Returns the render context.
    #[must_use]
    pub const fn context(&self) -> &C {
        &self.context
    }

    /// Returns the render context mutably.
    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Consumes the walker, returning the render context.
    pub fn into_context(self) -> C {
        self.context
    }
}
