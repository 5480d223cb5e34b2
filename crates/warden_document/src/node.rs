//! The document tree.
//!
//! A document is a rooted tree of [`Node`]s. Inner nodes carry a [`Tag`]
//! from a closed set, a few optional attributes and an ordered list of
//! children; leaves carry raw text. How a tag looks in a given output format
//! is not known here, see [`crate::renderer`].
//!
//! # Example
//!
//! ```
//! use warden_document::{InnerNode, Tag};
//!
//! let mut root = InnerNode::root();
//! root.paragraph().text("Hello");
//! let list = root.unordered_list();
//! list.list_item().text("a");
//! list.list_item().text("b");
//!
//! assert_eq!(root.children().len(), 2);
//! assert_eq!(root.children()[1].tag(), Tag::UnorderedList);
//! ```

use std::fmt;

/// The closed set of node tags.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    /// The root of a document.
    Root,
    /// A group of nodes with no presentation of its own.
    Fragment,
    /// A heading, with a level from the attributes.
    Heading,
    /// A paragraph.
    Paragraph,
    /// A numbered list.
    OrderedList,
    /// A bulleted list.
    UnorderedList,
    /// An item of either kind of list.
    ListItem,
    /// Code inside running text.
    InlineCode,
    /// A preformatted block.
    BlockCode,
    /// Strong emphasis.
    Strong,
    /// Emphasis.
    Emphasis,
    /// A link, with an href from the attributes.
    Anchor,
    /// A collapsible section.
    Details,
    /// The always visible part of a [`Tag::Details`].
    Summary,
    /// A hard line break.
    LineBreak,
    /// Raw text. Only ever carried by leaves.
    Text,
}

impl Tag {
    /// Returns true if the completion of a node with this tag is a point at
    /// which rendered output can be flushed.
    #[must_use]
    pub const fn is_committable(self) -> bool {
        matches!(
            self,
            Self::Paragraph
                | Self::OrderedList
                | Self::UnorderedList
                | Self::ListItem
                | Self::Heading
                | Self::BlockCode
        )
    }

    /// Returns the lowercase name of the tag.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Fragment => "fragment",
            Self::Heading => "heading",
            Self::Paragraph => "paragraph",
            Self::OrderedList => "ordered-list",
            Self::UnorderedList => "unordered-list",
            Self::ListItem => "list-item",
            Self::InlineCode => "inline-code",
            Self::BlockCode => "block-code",
            Self::Strong => "strong",
            Self::Emphasis => "emphasis",
            Self::Anchor => "anchor",
            Self::Details => "details",
            Self::Summary => "summary",
            Self::LineBreak => "line-break",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Optional attributes of an inner node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    /// Link target of an anchor.
    pub href: Option<String>,
    /// First ordinal of an ordered list.
    pub start: Option<usize>,
    /// Level of a heading, 1 to 6.
    pub level: Option<u8>,
}

/// A node in a document tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// A node that can have children.
    Inner(InnerNode),
    /// Raw text.
    Leaf(LeafNode),
}

impl Node {
    /// Returns the tag of this node.
    #[must_use]
    pub fn tag(&self) -> Tag {
        match self {
            Self::Inner(inner) => inner.tag,
            Self::Leaf(_) => Tag::Text,
        }
    }

    /// Returns the inner node, if this is one.
    #[must_use]
    pub fn as_inner(&self) -> Option<&InnerNode> {
        match self {
            Self::Inner(inner) => Some(inner),
            Self::Leaf(_) => None,
        }
    }

    /// Returns the leaf, if this is one.
    #[must_use]
    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Inner(_) => None,
        }
    }
}

impl From<InnerNode> for Node {
    fn from(inner: InnerNode) -> Self {
        Self::Inner(inner)
    }
}

impl From<LeafNode> for Node {
    fn from(leaf: LeafNode) -> Self {
        Self::Leaf(leaf)
    }
}

/// A leaf carrying raw, unescaped text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeafNode {
    data: String,
}

impl LeafNode {
    /// Creates a text leaf.
    #[must_use]
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }

    /// Returns the text.
    #[must_use]
    pub fn data(&self) -> &str {
        &self.data
    }
}

/// A tagged node with ordered children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InnerNode {
    tag: Tag,
    attributes: Attributes,
    children: Vec<Node>,
}

impl InnerNode {
    /// Creates an empty node with the given tag.
    #[must_use]
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attributes: Attributes::default(),
            children: Vec::new(),
        }
    }

    /// Creates an empty document root.
    #[must_use]
    pub fn root() -> Self {
        Self::new(Tag::Root)
    }

    /// Creates an empty fragment, for building a subtree to append later.
    #[must_use]
    pub fn fragment() -> Self {
        Self::new(Tag::Fragment)
    }

    /// Sets the attributes of this node.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Returns the tag.
    #[must_use]
    pub const fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Returns the children in order.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Returns true if this node has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Appends an existing node as the last child.
    pub fn append(&mut self, node: impl Into<Node>) -> &mut Self {
        self.children.push(node.into());
        self
    }

    /// Appends a text leaf and returns `self` for chaining.
    pub fn text(&mut self, data: impl Into<String>) -> &mut Self {
        self.append(LeafNode::new(data))
    }

    /// Appends an empty child with `tag` and `attributes` and returns it.
    pub fn child_with(&mut self, tag: Tag, attributes: Attributes) -> &mut InnerNode {
        let index = self.children.len();
        self.children
            .push(Node::Inner(Self::new(tag).with_attributes(attributes)));
        match &mut self.children[index] {
            Node::Inner(inner) => inner,
            Node::Leaf(_) => unreachable!("just pushed an inner node"),
        }
    }

    /// Appends an empty child with `tag` and returns it.
    pub fn child(&mut self, tag: Tag) -> &mut InnerNode {
        self.child_with(tag, Attributes::default())
    }

    /// Appends a paragraph.
    pub fn paragraph(&mut self) -> &mut InnerNode {
        self.child(Tag::Paragraph)
    }

    /// Appends a heading of the given level.
    pub fn heading(&mut self, level: u8) -> &mut InnerNode {
        self.child_with(
            Tag::Heading,
            Attributes {
                level: Some(level.clamp(1, 6)),
                ..Attributes::default()
            },
        )
    }

    /// Appends an ordered list numbered from one.
    pub fn ordered_list(&mut self) -> &mut InnerNode {
        self.child(Tag::OrderedList)
    }

    /// Appends an ordered list numbered from `start`.
    pub fn ordered_list_from(&mut self, start: usize) -> &mut InnerNode {
        self.child_with(
            Tag::OrderedList,
            Attributes {
                start: Some(start),
                ..Attributes::default()
            },
        )
    }

    /// Appends a bulleted list.
    pub fn unordered_list(&mut self) -> &mut InnerNode {
        self.child(Tag::UnorderedList)
    }

    /// Appends a list item.
    pub fn list_item(&mut self) -> &mut InnerNode {
        self.child(Tag::ListItem)
    }

    /// Appends inline code containing `code`, returning `self`.
    pub fn inline_code(&mut self, code: impl Into<String>) -> &mut Self {
        self.child(Tag::InlineCode).text(code);
        self
    }

    /// Appends a preformatted block containing `code`, returning `self`.
    pub fn block_code(&mut self, code: impl Into<String>) -> &mut Self {
        self.child(Tag::BlockCode).text(code);
        self
    }

    /// Appends strong emphasis.
    pub fn strong(&mut self) -> &mut InnerNode {
        self.child(Tag::Strong)
    }

    /// Appends emphasis.
    pub fn emphasis(&mut self) -> &mut InnerNode {
        self.child(Tag::Emphasis)
    }

    /// Appends a link to `href`.
    pub fn anchor(&mut self, href: impl Into<String>) -> &mut InnerNode {
        self.child_with(
            Tag::Anchor,
            Attributes {
                href: Some(href.into()),
                ..Attributes::default()
            },
        )
    }

    /// Appends a collapsible section.
    pub fn details(&mut self) -> &mut InnerNode {
        self.child(Tag::Details)
    }

    /// Appends the summary of a collapsible section.
    pub fn summary(&mut self) -> &mut InnerNode {
        self.child(Tag::Summary)
    }

    /// Appends a line break, returning `self`.
    pub fn line_break(&mut self) -> &mut Self {
        self.child(Tag::LineBreak);
        self
    }
}
