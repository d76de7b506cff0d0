//! Node compaction
//!
//!     Walks a node sequence and merges each node into its predecessor whenever a rule for the
//!     pair of variants allows it: adjacent text runs with the same styling, code runs of the same
//!     block, links to the same target, and continuing items lists. Whitespace at a code/non-code
//!     boundary is moved to the non-code side rather than merged.
//!
//!     Lists and items lists are compacted recursively before their parent sequence.

use crate::ir::nodes::{ItemsListNode, Node, TextNode, UrlNode};

/// Zero-width no-break space separating adjacent runs of the same emphasis.
pub const SPACER: &str = "\u{feff}";

/// Merge adjacent compatible nodes.
pub fn compact_nodes(nodes: Vec<Node>) -> Vec<Node> {
    let mut res: Vec<Node> = Vec::with_capacity(nodes.len());
    for mut node in nodes {
        match &mut node {
            Node::List(l) => l.nodes = compact_nodes(std::mem::take(&mut l.nodes)),
            Node::ItemsList(l) => {
                for item in &mut l.items {
                    item.nodes = compact_nodes(std::mem::take(&mut item.nodes));
                }
            }
            _ => {}
        }
        let spacer = match res.last_mut() {
            Some(last) => {
                if concat_nodes(last, &mut node) {
                    continue;
                }
                requires_spacer(last, &node)
            }
            None => false,
        };
        if spacer {
            res.push(Node::Text(TextNode::new(SPACER)));
        }
        if let Node::Code(c) = &mut node {
            c.value = c.value.trim_start_matches('\n').to_string();
        }
        res.push(node);
    }
    res
}

/// Try to merge `b` into `a`. Returns true if `b` was absorbed.
///
/// A failed text merge may still move whitespace between the two nodes.
fn concat_nodes(a: &mut Node, b: &mut Node) -> bool {
    match (a, b) {
        (Node::Text(t1), Node::Text(t2)) => concat_text(t1, t2),
        (Node::Code(c1), Node::Code(c2)) => {
            if c1.base.block() != c2.base.block() || c1.term != c2.term || c1.lang != c2.lang {
                return false;
            }
            c1.value.push_str(&c2.value);
            true
        }
        (Node::Code(_), Node::Text(t)) => t.value.trim().is_empty(),
        (Node::Url(u1), Node::Url(u2)) => concat_url(u1, u2),
        (Node::ItemsList(l1), Node::ItemsList(l2)) => concat_items_list(l1, l2),
        _ => false,
    }
}

fn concat_text(t1: &mut TextNode, t2: &mut TextNode) -> bool {
    if t1.base.block() != t2.base.block() {
        return false;
    }
    let trailing = t1.value.len() - t1.value.trim_end().len();
    let leading = t2.value.len() - t2.value.trim_start().len();

    // <code + spaces><non-code>
    if t1.code && !t2.code && trailing > 0 {
        let split = t1.value.len() - trailing;
        let spaces = t1.value.split_off(split);
        t2.value.insert_str(0, &spaces);
        return false;
    }
    // <non-code><spaces + code>
    if !t1.code && t2.code && leading > 0 {
        let rest = t2.value.split_off(leading);
        let spaces = std::mem::replace(&mut t2.value, rest);
        t1.value.push_str(&spaces);
        return false;
    }
    // <non-code><spaces>
    if !t1.code && t2.value.trim().is_empty() {
        t1.value.push_str(&t2.value);
        return true;
    }
    if t1.code != t2.code || t1.bold != t2.bold || t1.italic != t2.italic {
        return false;
    }
    t1.value.push_str(&t2.value);
    true
}

fn concat_url(u1: &mut UrlNode, u2: &mut UrlNode) -> bool {
    if u1.base.block() != u2.base.block() || u1.url != u2.url || u1.name != u2.name {
        return false;
    }
    let mut nodes = std::mem::take(&mut u1.content.nodes);
    nodes.append(&mut u2.content.nodes);
    u1.content.nodes = compact_nodes(nodes);
    true
}

fn concat_items_list(l1: &mut ItemsListNode, l2: &mut ItemsListNode) -> bool {
    if l1.list_type != l2.list_type {
        return false;
    }
    let numbered = !l1.list_type.is_empty() && l1.start > 0 && l2.start > 0;
    if numbered && l2.start as usize != l1.items.len() + 1 {
        return false;
    }
    l1.items.append(&mut l2.items);
    true
}

fn requires_spacer(a: &Node, b: &Node) -> bool {
    match (a, b) {
        (Node::Text(t1), Node::Text(t2)) => (t1.bold && t2.bold) || (t1.italic && t2.italic),
        _ => false,
    }
}
