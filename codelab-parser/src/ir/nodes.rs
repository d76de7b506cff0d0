//! Core data structures for the codelab document model.
//!
//! Every node variant shares a [`NodeBase`]: an optional block marker linking
//! inline nodes back to the source paragraph or cell they came from, and a
//! sorted, deduplicated set of environment tags.

use std::fmt;
use std::ops::{BitAnd, BitOr};

/// Type tag of a node.
///
/// Tags are bit flags so that callers can test for a whole category at once,
/// e.g. `typ.is_header()` matches plain, checklist and FAQ headers.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeType(u32);

impl NodeType {
    pub const INVALID: NodeType = NodeType(1 << 0);
    pub const LIST: NodeType = NodeType(1 << 1);
    pub const GRID: NodeType = NodeType(1 << 2);
    pub const TEXT: NodeType = NodeType(1 << 3);
    pub const CODE: NodeType = NodeType(1 << 4);
    pub const INFOBOX: NodeType = NodeType(1 << 5);
    pub const SURVEY: NodeType = NodeType(1 << 6);
    pub const URL: NodeType = NodeType(1 << 7);
    pub const IMAGE: NodeType = NodeType(1 << 8);
    pub const BUTTON: NodeType = NodeType(1 << 9);
    pub const ITEMS_LIST: NodeType = NodeType(1 << 10);
    pub const ITEMS_CHECK: NodeType = NodeType(1 << 11);
    pub const ITEMS_FAQ: NodeType = NodeType(1 << 12);
    pub const HEADER: NodeType = NodeType(1 << 13);
    pub const HEADER_CHECK: NodeType = NodeType(1 << 14);
    pub const HEADER_FAQ: NodeType = NodeType(1 << 15);
    pub const YOUTUBE: NodeType = NodeType(1 << 16);
    pub const IFRAME: NodeType = NodeType(1 << 17);
    pub const IMPORT: NodeType = NodeType(1 << 18);

    /// Any of the items list variants.
    pub const ANY_ITEMS_LIST: NodeType =
        NodeType(Self::ITEMS_LIST.0 | Self::ITEMS_CHECK.0 | Self::ITEMS_FAQ.0);
    /// Any of the header variants.
    pub const ANY_HEADER: NodeType =
        NodeType(Self::HEADER.0 | Self::HEADER_CHECK.0 | Self::HEADER_FAQ.0);
    /// Nodes that live inside a paragraph and may be squashed into one block.
    pub const INLINE: NodeType =
        NodeType(Self::TEXT.0 | Self::URL.0 | Self::IMAGE.0 | Self::BUTTON.0);

    pub fn bits(self) -> u32 {
        self.0
    }

    /// True if `self` shares at least one flag with `other`.
    pub fn intersects(self, other: NodeType) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_items_list(self) -> bool {
        self.intersects(Self::ANY_ITEMS_LIST)
    }

    pub fn is_header(self) -> bool {
        self.intersects(Self::ANY_HEADER)
    }

    pub fn is_inline(self) -> bool {
        self.intersects(Self::INLINE)
    }
}

impl BitOr for NodeType {
    type Output = NodeType;

    fn bitor(self, rhs: NodeType) -> NodeType {
        NodeType(self.0 | rhs.0)
    }
}

impl BitAnd for NodeType {
    type Output = NodeType;

    fn bitand(self, rhs: NodeType) -> NodeType {
        NodeType(self.0 & rhs.0)
    }
}

impl fmt::Debug for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 19] = [
            "Invalid",
            "List",
            "Grid",
            "Text",
            "Code",
            "Infobox",
            "Survey",
            "Url",
            "Image",
            "Button",
            "ItemsList",
            "ItemsCheck",
            "ItemsFaq",
            "Header",
            "HeaderCheck",
            "HeaderFaq",
            "YouTube",
            "Iframe",
            "Import",
        ];
        let names: Vec<&str> = NAMES
            .iter()
            .enumerate()
            .filter(|(i, _)| self.0 & (1 << i) != 0)
            .map(|(_, name)| *name)
            .collect();
        write!(f, "NodeType({})", names.join(" | "))
    }
}

/// Opaque identity of the source block (paragraph, list item, table cell) a
/// node was produced from.
///
/// Markers are only ever compared for equality. Parsers allocate them per
/// source element; [`BlockMarker::STANDALONE`] flags nodes that form a block
/// of their own and never share it with a neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockMarker(u32);

impl BlockMarker {
    pub const STANDALONE: BlockMarker = BlockMarker(0);

    pub fn new(id: u32) -> Self {
        BlockMarker(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }
}

/// Attributes shared by every node variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeBase {
    block: Option<BlockMarker>,
    env: Vec<String>,
}

impl NodeBase {
    pub fn block(&self) -> Option<BlockMarker> {
        self.block
    }

    pub fn env(&self) -> &[String] {
        &self.env
    }

    fn set_block(&mut self, block: Option<BlockMarker>) {
        self.block = block;
    }

    fn set_env(&mut self, env: &[String]) {
        let mut env = env.to_vec();
        env.sort();
        env.dedup();
        self.env = env;
    }
}

/// A universal, semantic representation of a codelab document node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    List(ListNode),
    Grid(GridNode),
    Text(TextNode),
    Code(CodeNode),
    Infobox(InfoboxNode),
    Survey(SurveyNode),
    Url(UrlNode),
    Image(ImageNode),
    Button(ButtonNode),
    ItemsList(ItemsListNode),
    Header(HeaderNode),
    YouTube(YouTubeNode),
    Iframe(IframeNode),
    Import(ImportNode),
}

impl Node {
    fn base(&self) -> &NodeBase {
        match self {
            Node::List(n) => &n.base,
            Node::Grid(n) => &n.base,
            Node::Text(n) => &n.base,
            Node::Code(n) => &n.base,
            Node::Infobox(n) => &n.base,
            Node::Survey(n) => &n.base,
            Node::Url(n) => &n.base,
            Node::Image(n) => &n.base,
            Node::Button(n) => &n.base,
            Node::ItemsList(n) => &n.base,
            Node::Header(n) => &n.base,
            Node::YouTube(n) => &n.base,
            Node::Iframe(n) => &n.base,
            Node::Import(n) => &n.base,
        }
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        match self {
            Node::List(n) => &mut n.base,
            Node::Grid(n) => &mut n.base,
            Node::Text(n) => &mut n.base,
            Node::Code(n) => &mut n.base,
            Node::Infobox(n) => &mut n.base,
            Node::Survey(n) => &mut n.base,
            Node::Url(n) => &mut n.base,
            Node::Image(n) => &mut n.base,
            Node::Button(n) => &mut n.base,
            Node::ItemsList(n) => &mut n.base,
            Node::Header(n) => &mut n.base,
            Node::YouTube(n) => &mut n.base,
            Node::Iframe(n) => &mut n.base,
            Node::Import(n) => &mut n.base,
        }
    }

    /// The node's type tag.
    pub fn node_type(&self) -> NodeType {
        match self {
            Node::List(_) => NodeType::LIST,
            Node::Grid(_) => NodeType::GRID,
            Node::Text(_) => NodeType::TEXT,
            Node::Code(_) => NodeType::CODE,
            Node::Infobox(_) => NodeType::INFOBOX,
            Node::Survey(_) => NodeType::SURVEY,
            Node::Url(_) => NodeType::URL,
            Node::Image(_) => NodeType::IMAGE,
            Node::Button(_) => NodeType::BUTTON,
            Node::ItemsList(n) => n.typ,
            Node::Header(n) => n.typ,
            Node::YouTube(_) => NodeType::YOUTUBE,
            Node::Iframe(_) => NodeType::IFRAME,
            Node::Import(_) => NodeType::IMPORT,
        }
    }

    /// Change the type tag within the node's own category.
    ///
    /// Headers move between the header variants and items lists between the
    /// items list variants. Any other request leaves the node untouched.
    pub fn mutate_type(&mut self, typ: NodeType) {
        match self {
            Node::Header(n) => n.mutate_type(typ),
            Node::ItemsList(n) => n.mutate_type(typ),
            _ => {}
        }
    }

    pub fn block(&self) -> Option<BlockMarker> {
        self.base().block()
    }

    /// Replace the block marker. Import nodes propagate it to their content.
    pub fn mutate_block(&mut self, block: Option<BlockMarker>) {
        if let Node::Import(n) = self {
            n.content.base.set_block(block);
        }
        self.base_mut().set_block(block);
    }

    /// Environment tags, sorted ascending without duplicates.
    pub fn env(&self) -> &[String] {
        self.base().env()
    }

    /// Replace the environment tags with a sorted, deduplicated copy of `env`.
    pub fn mutate_env(&mut self, env: &[String]) {
        if let Node::Import(n) = self {
            n.content.base.set_env(env);
        }
        self.base_mut().set_env(env);
    }

    /// True if the node should be rendered for the target environment `env`.
    pub fn visible_in(&self, env: &str) -> bool {
        let tags = self.env();
        tags.is_empty() || tags.binary_search_by(|t| t.as_str().cmp(env)).is_ok()
    }

    /// True if the node carries no renderable content.
    pub fn is_empty(&self) -> bool {
        match self {
            Node::List(n) => n.is_empty(),
            Node::Grid(n) => n.is_empty(),
            Node::Text(n) => n.is_empty(),
            Node::Code(n) => n.is_empty(),
            Node::Infobox(n) => n.is_empty(),
            Node::Survey(n) => n.is_empty(),
            Node::Url(n) => n.is_empty(),
            Node::Image(n) => n.is_empty(),
            Node::Button(n) => n.is_empty(),
            Node::ItemsList(n) => n.is_empty(),
            Node::Header(n) => n.is_empty(),
            Node::YouTube(n) => n.is_empty(),
            Node::Iframe(n) => n.is_empty(),
            Node::Import(n) => n.is_empty(),
        }
    }
}

/// True if every node in `nodes` is empty. An empty slice is empty too.
pub fn all_empty(nodes: &[Node]) -> bool {
    nodes.iter().all(Node::is_empty)
}

macro_rules! impl_from_variant {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Node {
                fn from(node: $ty) -> Self {
                    Node::$variant(node)
                }
            }
        )*
    };
}

impl_from_variant! {
    ListNode => List,
    GridNode => Grid,
    TextNode => Text,
    CodeNode => Code,
    InfoboxNode => Infobox,
    SurveyNode => Survey,
    UrlNode => Url,
    ImageNode => Image,
    ButtonNode => Button,
    ItemsListNode => ItemsList,
    HeaderNode => Header,
    YouTubeNode => YouTube,
    IframeNode => Iframe,
    ImportNode => Import,
}

/// A sequence of nodes, e.g. a squashed paragraph or a step's content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListNode {
    pub base: NodeBase,
    pub nodes: Vec<Node>,
}

impl ListNode {
    pub fn new(nodes: Vec<Node>) -> Self {
        ListNode {
            base: NodeBase::default(),
            nodes,
        }
    }

    pub fn append(&mut self, nodes: impl IntoIterator<Item = Node>) {
        self.nodes.extend(nodes);
    }

    pub fn env(&self) -> &[String] {
        self.base.env()
    }

    pub fn mutate_env(&mut self, env: &[String]) {
        self.base.set_env(env);
    }

    pub fn block(&self) -> Option<BlockMarker> {
        self.base.block()
    }

    pub fn mutate_block(&mut self, block: Option<BlockMarker>) {
        self.base.set_block(block);
    }

    pub fn is_empty(&self) -> bool {
        all_empty(&self.nodes)
    }
}

/// A run of text, optionally styled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextNode {
    pub base: NodeBase,
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
    pub value: String,
}

impl TextNode {
    pub fn new(value: impl Into<String>) -> Self {
        TextNode {
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

/// A source code or terminal block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeNode {
    pub base: NodeBase,
    /// Terminal (console) block rather than source code.
    pub term: bool,
    pub lang: String,
    pub value: String,
}

impl CodeNode {
    pub fn new(value: impl Into<String>, term: bool, lang: impl Into<String>) -> Self {
        CodeNode {
            base: NodeBase::default(),
            term,
            lang: lang.into(),
            value: value.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

/// A step-level header. Checklist and FAQ headers share this shape.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderNode {
    pub base: NodeBase,
    typ: NodeType,
    pub level: usize,
    pub content: ListNode,
}

impl HeaderNode {
    pub fn new(level: usize, nodes: Vec<Node>) -> Self {
        HeaderNode {
            base: NodeBase::default(),
            typ: NodeType::HEADER,
            level,
            content: ListNode::new(nodes),
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.typ
    }

    pub fn mutate_type(&mut self, typ: NodeType) {
        if typ.is_header() && typ.bits().count_ones() == 1 {
            self.typ = typ;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// A hyperlink wrapping arbitrary inline content.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlNode {
    pub base: NodeBase,
    pub url: String,
    pub name: String,
    pub target: String,
    pub content: ListNode,
}

impl UrlNode {
    pub fn new(url: impl Into<String>, nodes: Vec<Node>) -> Self {
        UrlNode {
            base: NodeBase::default(),
            url: url.into(),
            name: String::new(),
            target: "_blank".to_string(),
            content: ListNode::new(nodes),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// An inline image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageNode {
    pub base: NodeBase,
    pub src: String,
    /// Rendered width; zero when unknown.
    pub width: f32,
    pub alt: String,
    pub title: String,
}

impl ImageNode {
    pub fn new(src: impl Into<String>) -> Self {
        ImageNode {
            src: src.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.src.trim().is_empty()
    }
}

/// A styled call-to-action, usually wrapped in a [`UrlNode`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ButtonNode {
    pub base: NodeBase,
    pub raised: bool,
    pub colored: bool,
    pub download: bool,
    pub content: ListNode,
}

impl ButtonNode {
    pub fn new(raised: bool, colored: bool, download: bool, nodes: Vec<Node>) -> Self {
        ButtonNode {
            base: NodeBase::default(),
            raised,
            colored,
            download,
            content: ListNode::new(nodes),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Kind of an [`InfoboxNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoboxKind {
    Positive,
    Negative,
}

impl InfoboxKind {
    /// Name used by renderers.
    pub fn as_str(self) -> &'static str {
        match self {
            InfoboxKind::Positive => "special",
            InfoboxKind::Negative => "warning",
        }
    }
}

/// A highlighted note or warning box.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoboxNode {
    pub base: NodeBase,
    pub kind: InfoboxKind,
    pub content: ListNode,
}

impl InfoboxNode {
    pub fn new(kind: InfoboxKind, nodes: Vec<Node>) -> Self {
        InfoboxNode {
            base: NodeBase::default(),
            kind,
            content: ListNode::new(nodes),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// One survey question with its answer options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyGroup {
    pub name: String,
    pub options: Vec<String>,
}

/// A multiple-choice survey.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyNode {
    pub base: NodeBase,
    pub id: String,
    pub groups: Vec<SurveyGroup>,
}

impl SurveyNode {
    pub fn new(id: impl Into<String>, groups: Vec<SurveyGroup>) -> Self {
        SurveyNode {
            base: NodeBase::default(),
            id: id.into(),
            groups,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.options.is_empty())
    }
}

/// A single table cell.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub colspan: usize,
    pub rowspan: usize,
    pub content: ListNode,
}

impl GridCell {
    pub fn new(nodes: Vec<Node>) -> Self {
        GridCell {
            colspan: 1,
            rowspan: 1,
            content: ListNode::new(nodes),
        }
    }
}

/// A table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridNode {
    pub base: NodeBase,
    pub rows: Vec<Vec<GridCell>>,
}

impl GridNode {
    pub fn new(rows: Vec<Vec<GridCell>>) -> Self {
        GridNode {
            base: NodeBase::default(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows
            .iter()
            .flatten()
            .all(|cell| cell.content.is_empty())
    }
}

/// An ordered or unordered list. Checklists and FAQs share this shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemsListNode {
    pub base: NodeBase,
    typ: NodeType,
    /// Numbering style, e.g. "1" or "a". Empty for bullet lists.
    pub list_type: String,
    /// First item number; zero when not given.
    pub start: u32,
    pub items: Vec<ListNode>,
}

impl ItemsListNode {
    /// Create an empty list. Lists always form a block of their own.
    pub fn new(list_type: impl Into<String>, start: u32) -> Self {
        ItemsListNode {
            base: NodeBase {
                block: Some(BlockMarker::STANDALONE),
                env: Vec::new(),
            },
            typ: NodeType::ITEMS_LIST,
            list_type: list_type.into(),
            start,
            items: Vec::new(),
        }
    }

    /// Append a new item made of `nodes` and return it.
    pub fn new_item(&mut self, nodes: Vec<Node>) -> &mut ListNode {
        self.items.push(ListNode::new(nodes));
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    pub fn node_type(&self) -> NodeType {
        self.typ
    }

    pub fn mutate_type(&mut self, typ: NodeType) {
        if typ.is_items_list() && typ.bits().count_ones() == 1 {
            self.typ = typ;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.iter().all(ListNode::is_empty)
    }
}

/// An embedded YouTube video.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YouTubeNode {
    pub base: NodeBase,
    pub video_id: String,
}

impl YouTubeNode {
    pub fn new(video_id: impl Into<String>) -> Self {
        YouTubeNode {
            video_id: video_id.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.video_id.trim().is_empty()
    }
}

/// An embedded iframe from an allow-listed host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IframeNode {
    pub base: NodeBase,
    pub url: String,
}

impl IframeNode {
    pub fn new(url: impl Into<String>) -> Self {
        IframeNode {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.url.trim().is_empty()
    }
}

/// A placeholder for remote content, filled once the fragment is fetched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportNode {
    pub base: NodeBase,
    pub url: String,
    pub content: ListNode,
}

impl ImportNode {
    pub fn new(url: impl Into<String>) -> Self {
        ImportNode {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Collect mutable references to every image reachable from `nodes`.
pub fn image_nodes_mut(nodes: &mut [Node]) -> Vec<&mut ImageNode> {
    let mut images = Vec::new();
    for node in nodes {
        collect_images(node, &mut images);
    }
    images
}

fn collect_images<'a>(node: &'a mut Node, out: &mut Vec<&'a mut ImageNode>) {
    match node {
        Node::Image(n) => out.push(n),
        other => {
            for child in children_mut(other) {
                collect_images(child, out);
            }
        }
    }
}

/// Collect mutable references to every import node reachable from `nodes`.
pub fn import_nodes_mut(nodes: &mut [Node]) -> Vec<&mut ImportNode> {
    let mut imports = Vec::new();
    for node in nodes {
        collect_imports(node, &mut imports);
    }
    imports
}

fn collect_imports<'a>(node: &'a mut Node, out: &mut Vec<&'a mut ImportNode>) {
    match node {
        Node::Import(n) => out.push(n),
        other => {
            for child in children_mut(other) {
                collect_imports(child, out);
            }
        }
    }
}

/// Direct children of a composite node, in document order.
pub fn children_mut(node: &mut Node) -> Vec<&mut Node> {
    match node {
        Node::List(n) => n.nodes.iter_mut().collect(),
        Node::Header(n) => n.content.nodes.iter_mut().collect(),
        Node::Url(n) => n.content.nodes.iter_mut().collect(),
        Node::Button(n) => n.content.nodes.iter_mut().collect(),
        Node::Infobox(n) => n.content.nodes.iter_mut().collect(),
        Node::Import(n) => n.content.nodes.iter_mut().collect(),
        Node::ItemsList(n) => n.items.iter_mut().flat_map(|i| i.nodes.iter_mut()).collect(),
        Node::Grid(n) => n
            .rows
            .iter_mut()
            .flatten()
            .flat_map(|cell| cell.content.nodes.iter_mut())
            .collect(),
        Node::Text(_)
        | Node::Code(_)
        | Node::Survey(_)
        | Node::Image(_)
        | Node::YouTube(_)
        | Node::Iframe(_) => Vec::new(),
    }
}
