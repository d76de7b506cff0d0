//! Recursive descent over the markup tree.
//!
//! A [`Walker`] recognizes constructs at the cursor. Anything it rejects is
//! descended into, and whatever the children produce is collected in its place.

use super::dom;
use super::state::{DocState, StateFlags};
use crate::common::compact::compact_nodes;
use crate::ir::nodes::Node;
use markup5ever_rcdom::Handle;

/// Outcome of offering the cursor element to a [`Walker`].
pub(crate) enum Parsed {
    /// The element was consumed, producing at most one node.
    Accepted(Option<Node>),
    /// Not a known construct; its children should be walked instead.
    Rejected,
}

impl From<Option<Node>> for Parsed {
    fn from(node: Option<Node>) -> Self {
        Parsed::Accepted(node)
    }
}

/// Format-specific recognition of the element at `ds.cur`.
///
/// Implementations may move `ds.cur` forward over siblings they consumed.
pub(crate) trait Walker {
    fn parse_node(&self, ds: &mut DocState<'_>) -> Parsed;
}

/// Parse the element at `ds.cur` and append the result to the current step.
pub(crate) fn parse_top<W: Walker + ?Sized>(walker: &W, ds: &mut DocState<'_>) {
    match walker.parse_node(ds) {
        Parsed::Accepted(node) => ds.append_nodes(node.into_iter().collect()),
        Parsed::Rejected => {
            ds.push(None, ds.flags);
            let nodes = parse_subtree(walker, ds);
            ds.pop();
            ds.append_nodes(compact_nodes(nodes));
        }
    }
}

/// Parse the children of `ds.cur`.
///
/// Moves `ds.cur`; callers wrap this in [`DocState::push`] and [`DocState::pop`].
pub(crate) fn parse_subtree<W: Walker + ?Sized>(walker: &W, ds: &mut DocState<'_>) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut next = dom::first_child(&ds.cur);
    while let Some(cur) = next {
        ds.cur = cur;
        match walker.parse_node(ds) {
            Parsed::Accepted(node) => nodes.extend(node),
            Parsed::Rejected => {
                ds.push(None, ds.flags);
                nodes.extend(parse_subtree(walker, ds));
                ds.pop();
            }
        }
        next = dom::next_sibling(&ds.cur);
    }
    nodes
}

/// Parse the children of `cur` under `flags`, restoring the context afterwards.
pub(crate) fn parse_children<W: Walker + ?Sized>(
    walker: &W,
    ds: &mut DocState<'_>,
    cur: Option<Handle>,
    flags: StateFlags,
) -> Vec<Node> {
    ds.push(cur, flags);
    let nodes = parse_subtree(walker, ds);
    ds.pop();
    nodes
}
