//! Block squashing
//!
//!     Parsers emit inline nodes (text, links, images, buttons) one by one, each tagged with the
//!     block marker of the paragraph or cell it came from. This pass wraps every run of inline
//!     nodes sharing a marker into a single block-level [`ListNode`], so that renderers see
//!     paragraphs rather than loose inline runs.
//!
//!     Nodes that are not squashable (composites, or inline nodes without a marker) pass through
//!     untouched. Output lists carry [`BlockMarker::STANDALONE`] and are never squashed again,
//!     which makes the pass idempotent.

use crate::ir::nodes::{BlockMarker, ListNode, Node};

fn squashable(node: &Node) -> bool {
    node.block().is_some() && node.node_type().is_inline()
}

/// Wrap runs of inline nodes sharing a block marker into block-level lists.
pub fn block_nodes(nodes: Vec<Node>) -> Vec<Node> {
    let mut blocks = Vec::with_capacity(nodes.len());
    let mut iter = nodes.into_iter().peekable();
    while let Some(first) = iter.next() {
        if !squashable(&first) {
            blocks.push(first);
            continue;
        }
        let block = first.block();
        let mut run = vec![first];
        while let Some(next) = iter.next_if(|n| squashable(n) && n.block() == block) {
            run.push(next);
        }
        if let Some(head) = squash_run(run) {
            blocks.push(head);
        }
    }
    blocks
}

fn squash_run(run: Vec<Node>) -> Option<Node> {
    let env = run[0].env().to_vec();
    let mut members = trim_run(run);
    if members.is_empty() {
        return None;
    }
    if let Some(Node::Text(t)) = members.first_mut() {
        if t.code {
            t.value = t.value.trim_start_matches('\n').to_string();
        }
    }
    let mut head = ListNode::new(members);
    head.mutate_block(Some(BlockMarker::STANDALONE));
    head.mutate_env(&env);
    Some(Node::List(head))
}

fn trim_run(run: Vec<Node>) -> Vec<Node> {
    let first = run.iter().position(|n| !n.is_empty());
    let last = run.iter().rposition(|n| !n.is_empty());
    match (first, last) {
        (Some(first), Some(last)) => run
            .into_iter()
            .skip(first)
            .take(last - first + 1)
            .collect(),
        _ => Vec::new(),
    }
}
