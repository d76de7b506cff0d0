//! Navigation helpers over an html5ever `RcDom` tree.

use crate::error::ParseError;
use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::rc::Rc;

/// Elements that delimit a block of inline content.
const BLOCK_PARENTS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "li", "p", "div"];

/// Parse an HTML document.
pub(crate) fn parse_html(mut source: &[u8]) -> Result<RcDom, ParseError> {
    let dom = parse_document(RcDom::default(), ParseOpts::default())
        .from_utf8()
        .read_from(&mut source)?;
    Ok(dom)
}

/// Lower-case tag name of an element, `None` for other node kinds.
pub(crate) fn tag_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

pub(crate) fn is_tag(node: &Handle, tag: &str) -> bool {
    tag_name(node) == Some(tag)
}

pub(crate) fn is_text(node: &Handle) -> bool {
    matches!(node.data, NodeData::Text { .. })
}

/// Contents of a text node.
pub(crate) fn text_data(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// Attribute value, looked up case-insensitively.
pub(crate) fn attr(node: &Handle, key: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| (*a.name.local).eq_ignore_ascii_case(key))
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

/// Attribute value, empty when absent.
pub(crate) fn attr_or_empty(node: &Handle, key: &str) -> String {
    attr(node, key).unwrap_or_default()
}

pub(crate) fn children(node: &Handle) -> Vec<Handle> {
    node.children.borrow().clone()
}

/// Element children only, skipping text and comments.
pub(crate) fn element_children(node: &Handle) -> Vec<Handle> {
    node.children
        .borrow()
        .iter()
        .filter(|c| tag_name(c).is_some())
        .cloned()
        .collect()
}

pub(crate) fn first_child(node: &Handle) -> Option<Handle> {
    node.children.borrow().first().cloned()
}

pub(crate) fn parent(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take()?;
    let parent = weak.upgrade();
    node.parent.set(Some(weak));
    parent
}

pub(crate) fn next_sibling(node: &Handle) -> Option<Handle> {
    let parent = parent(node)?;
    let siblings = parent.children.borrow();
    let pos = siblings.iter().position(|c| Rc::ptr_eq(c, node))?;
    siblings.get(pos + 1).cloned()
}

/// `node` followed by its later siblings.
pub(crate) fn siblings_from(node: &Handle) -> Vec<Handle> {
    let Some(parent) = parent(node) else {
        return vec![node.clone()];
    };
    let siblings = parent.children.borrow();
    match siblings.iter().position(|c| Rc::ptr_eq(c, node)) {
        Some(pos) => siblings[pos..].to_vec(),
        None => vec![node.clone()],
    }
}

/// The first descendant with `tag` and its siblings with the same tag.
///
/// This is how list items and table cells are collected: `<li>` elements
/// next to the first one found.
pub(crate) fn tag_run(root: &Handle, tag: &str) -> Vec<Handle> {
    match find_tag(root, tag) {
        Some(first) => siblings_from(&first)
            .into_iter()
            .filter(|n| is_tag(n, tag))
            .collect(),
        None => Vec::new(),
    }
}

/// True if `node` is the first child of its parent.
pub(crate) fn is_first_child(node: &Handle) -> bool {
    parent(node)
        .and_then(|p| first_child(&p))
        .is_some_and(|first| Rc::ptr_eq(&first, node))
}

/// Number of direct children, text nodes included.
pub(crate) fn count_direct(node: &Handle) -> usize {
    node.children.borrow().len()
}

/// Count descendants with `tag`, stopping as soon as the count exceeds one.
///
/// Matching elements are not searched further, so nested tables count once.
pub(crate) fn count_two(node: &Handle, tag: &str) -> usize {
    let mut count = 0;
    for child in node.children.borrow().iter() {
        if is_tag(child, tag) {
            count += 1;
        } else {
            count += count_two(child, tag);
        }
        if count > 1 {
            break;
        }
    }
    count
}

/// First node with `tag` in document order, `root` included.
pub(crate) fn find_tag(root: &Handle, tag: &str) -> Option<Handle> {
    if is_tag(root, tag) {
        return Some(root.clone());
    }
    root.children
        .borrow()
        .iter()
        .find_map(|child| find_tag(child, tag))
}

/// Every descendant with `tag`, in document order, `root` excluded.
pub(crate) fn find_all(root: &Handle, tag: &str) -> Vec<Handle> {
    let mut found = Vec::new();
    for child in root.children.borrow().iter() {
        if is_tag(child, tag) {
            found.push(child.clone());
        }
        found.extend(find_all(child, tag));
    }
    found
}

/// Nearest ancestor with `tag`, `node` included.
pub(crate) fn find_ancestor(node: &Handle, tag: &str) -> Option<Handle> {
    if is_tag(node, tag) {
        return Some(node.clone());
    }
    let mut cur = parent(node);
    while let Some(p) = cur {
        if is_tag(&p, tag) {
            return Some(p);
        }
        cur = parent(&p);
    }
    None
}

/// Nearest ancestor that delimits a block of inline content, `node` excluded.
///
/// The block parent of "text" in `<ul><li>text</li></ul>` is the `<li>`,
/// while in `<p><span>text</span></p>` it is the `<p>`.
pub(crate) fn find_block_parent(node: &Handle) -> Option<Handle> {
    let mut cur = parent(node);
    while let Some(p) = cur {
        if tag_name(&p).is_some_and(|t| BLOCK_PARENTS.contains(&t)) {
            return Some(p);
        }
        cur = parent(&p);
    }
    None
}

/// Heading level of an `h1`..`h6` element.
pub(crate) fn heading_level(node: &Handle) -> Option<usize> {
    match tag_name(node)? {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}
