//! Traversal context shared by the HTML-based parsers.

use crate::common::compact::compact_nodes;
use crate::common::directives::resolve_directives;
use crate::common::metadata::{parse_instruction, Instruction};
use crate::common::squash::block_nodes;
use crate::common::text::sort_unique;
use crate::formats::common::dom;
use crate::ir::codelab::{Codelab, Step};
use crate::ir::nodes::{BlockMarker, Node, NodeType};
use crate::options::ParseOptions;
use markup5ever_rcdom::Handle;
use std::collections::HashMap;
use std::ops::{BitOr, BitOrAssign};
use std::rc::Rc;
use std::time::Duration;

/// Constructs that must not be recognized in the current subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct StateFlags(u32);

impl StateFlags {
    pub const NONE: StateFlags = StateFlags(0);
    pub const SKIP_HEADER: StateFlags = StateFlags(1 << 0);
    pub const SKIP_CODE: StateFlags = StateFlags(1 << 1);
    pub const SKIP_LIST: StateFlags = StateFlags(1 << 2);
    pub const SKIP_TABLE: StateFlags = StateFlags(1 << 3);
    pub const SKIP_INFOBOX: StateFlags = StateFlags(1 << 4);
    pub const SKIP_SURVEY: StateFlags = StateFlags(1 << 5);
    pub const MAKE_BOLD: StateFlags = StateFlags(1 << 6);
    pub const MAKE_ITALIC: StateFlags = StateFlags(1 << 7);
    pub const MAKE_CODE: StateFlags = StateFlags(1 << 8);

    /// Every block-level structure.
    pub const SKIP_BLOCK: StateFlags = StateFlags(
        Self::SKIP_CODE.0 | Self::SKIP_TABLE.0 | Self::SKIP_INFOBOX.0 | Self::SKIP_SURVEY.0,
    );

    pub fn contains(self, other: StateFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for StateFlags {
    type Output = StateFlags;

    fn bitor(self, rhs: StateFlags) -> StateFlags {
        StateFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for StateFlags {
    fn bitor_assign(&mut self, rhs: StateFlags) {
        self.0 |= rhs.0;
    }
}

/// Mutable state of one parse invocation.
pub(crate) struct DocState<'o> {
    pub codelab: Codelab,
    pub options: &'o ParseOptions,
    /// Last survey number handed out.
    pub survey: u32,
    pub step: Option<Step>,
    /// Current environment scope, applied to every appended node.
    pub env: Vec<String>,
    pub cur: Handle,
    pub flags: StateFlags,
    stack: Vec<(Handle, StateFlags)>,
    blocks: HashMap<usize, BlockMarker>,
    /// Set by an environment instruction until the next node is appended.
    pending_env: bool,
}

impl<'o> DocState<'o> {
    pub fn new(options: &'o ParseOptions, cur: Handle) -> Self {
        DocState {
            codelab: Codelab::new(),
            options,
            survey: 0,
            step: None,
            env: Vec::new(),
            cur,
            flags: StateFlags::NONE,
            stack: Vec::new(),
            blocks: HashMap::new(),
            pending_env: false,
        }
    }

    /// Save the cursor and flags, then move to `cur` (or stay put) with `flags`.
    pub fn push(&mut self, cur: Option<Handle>, flags: StateFlags) {
        let cur = cur.unwrap_or_else(|| self.cur.clone());
        let saved = std::mem::replace(&mut self.cur, cur);
        self.stack.push((saved, self.flags));
        self.flags = flags;
    }

    pub fn pop(&mut self) {
        if let Some((cur, flags)) = self.stack.pop() {
            self.cur = cur;
            self.flags = flags;
        }
    }

    pub fn skips(&self, flag: StateFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Marker identifying the source element `handle`.
    pub fn block_of(&mut self, handle: &Handle) -> BlockMarker {
        let next = self.blocks.len() as u32 + 1;
        *self
            .blocks
            .entry(Rc::as_ptr(handle) as usize)
            .or_insert_with(|| BlockMarker::new(next))
    }

    /// Marker of the paragraph-like element enclosing `handle`, if any.
    pub fn block_parent(&mut self, handle: &Handle) -> Option<BlockMarker> {
        dom::find_block_parent(handle).map(|p| self.block_of(&p))
    }

    /// The last non-empty node appended to the current step.
    pub fn last_node(&self) -> Option<&Node> {
        self.step
            .as_ref()?
            .content
            .nodes
            .iter()
            .rev()
            .find(|n| !n.is_empty())
    }

    pub fn last_node_type(&self) -> Option<NodeType> {
        self.last_node().map(Node::node_type)
    }

    /// Append nodes to the current step, tagging them with the current
    /// environment. Nothing happens outside a step.
    pub fn append_nodes(&mut self, nodes: Vec<Node>) {
        let Some(step) = self.step.as_mut() else {
            return;
        };
        if nodes.is_empty() {
            return;
        }
        let used = nodes.iter().any(|n| !n.is_empty());
        for mut node in nodes {
            if !self.env.is_empty() {
                let mut env = node.env().to_vec();
                env.extend(self.env.iter().cloned());
                node.mutate_env(&env);
                if let Node::ItemsList(list) = &mut node {
                    for item in &mut list.items {
                        let mut env = item.env().to_vec();
                        env.extend(self.env.iter().cloned());
                        item.mutate_env(&env);
                    }
                }
            }
            step.content.nodes.push(node);
        }
        if used {
            self.pending_env = false;
        }
    }

    /// Leave the current environment scope.
    ///
    /// A scope opened by an instruction that nothing has used yet survives,
    /// so that an instruction placed right before a header applies to it.
    pub fn reset_env(&mut self) {
        if !self.pending_env {
            self.env.clear();
        }
    }

    /// Finalize the current step, if any, and open a new one.
    pub fn new_step(&mut self, title: impl Into<String>) {
        self.close_step();
        self.step = Some(Step::new(title));
        self.env.clear();
        self.pending_env = false;
    }

    fn close_step(&mut self) {
        if let Some(mut step) = self.step.take() {
            finalize_step(&mut step);
            self.codelab.steps.push(step);
        }
    }

    /// Apply the `key: value` step instructions found in `text`, one per line.
    pub fn apply_instructions(&mut self, text: &str) {
        for line in text.lines() {
            match parse_instruction(line) {
                Some(Instruction::Duration(duration)) => {
                    if let Some(step) = self.step.as_mut() {
                        step.duration = duration;
                    }
                }
                Some(Instruction::Environment(env)) => self.apply_environment(env),
                None => {}
            }
        }
    }

    fn apply_environment(&mut self, env: Vec<String>) {
        let mut tagged_header = false;
        if let Some(step) = self.step.as_mut() {
            step.tags.extend(env.iter().cloned());
            if let Some(last) = step.content.nodes.iter_mut().rev().find(|n| !n.is_empty()) {
                if last.node_type().is_header() {
                    last.mutate_env(&env);
                    tagged_header = true;
                }
            }
        }
        self.codelab.meta.tags.extend(env.iter().cloned());
        self.env = env;
        // A scope already attached to its header ends at the next one.
        self.pending_env = !tagged_header;
    }

    /// Finalize the last step and the codelab-wide totals.
    pub fn finish(mut self) -> Codelab {
        self.close_step();
        let mut codelab = self.codelab;
        sort_unique(&mut codelab.meta.tags);
        let total: Duration = codelab.steps.iter().map(|s| s.duration).sum();
        codelab.meta.duration = total.as_secs() / 60;
        codelab
    }

    /// Finalize the current step and return its content.
    pub fn finish_fragment(mut self) -> Vec<Node> {
        match self.step.take() {
            Some(mut step) => {
                finalize_step(&mut step);
                step.content.nodes
            }
            None => Vec::new(),
        }
    }
}

/// Squash, compact and resolve directives of a completed step.
///
/// Top-level nodes left empty, such as whitespace between block elements,
/// are dropped.
pub(crate) fn finalize_step(step: &mut Step) {
    sort_unique(&mut step.tags);
    let nodes = std::mem::take(&mut step.content.nodes);
    let mut nodes = compact_nodes(block_nodes(nodes));
    nodes.retain(|n| !n.is_empty());
    resolve_directives(&mut nodes);
    step.content.nodes = nodes;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::common::dom::{find_tag, parse_html};
    use crate::ir::nodes::{HeaderNode, ItemsListNode, TextNode};

    fn body() -> Handle {
        let dom = parse_html(b"<p>a</p><p>b</p>").unwrap();
        let node = find_tag(&dom.document, "body").unwrap();
        // Dropping the document detaches every descendant's children.
        std::mem::forget(dom);
        node
    }

    #[test]
    fn test_push_pop_restores_context() {
        let options = ParseOptions::default();
        let root = body();
        let mut ds = DocState::new(&options, root.clone());
        let p = dom::first_child(&root).unwrap();
        ds.push(Some(p.clone()), StateFlags::SKIP_BLOCK | StateFlags::SKIP_HEADER);
        assert!(Rc::ptr_eq(&ds.cur, &p));
        assert!(ds.skips(StateFlags::SKIP_TABLE));
        assert!(!ds.skips(StateFlags::SKIP_LIST));
        ds.pop();
        assert!(Rc::ptr_eq(&ds.cur, &root));
        assert_eq!(ds.flags, StateFlags::NONE);
        ds.pop();
        assert!(Rc::ptr_eq(&ds.cur, &root));
    }

    #[test]
    fn test_block_markers_are_stable_per_element() {
        let options = ParseOptions::default();
        let root = body();
        let mut ds = DocState::new(&options, root.clone());
        let first = dom::first_child(&root).unwrap();
        let second = dom::next_sibling(&first).unwrap();
        let a = ds.block_of(&first);
        let b = ds.block_of(&second);
        assert_ne!(a, b);
        assert_ne!(a, BlockMarker::STANDALONE);
        assert_eq!(ds.block_of(&first), a);
        let text = dom::first_child(&first).unwrap();
        assert_eq!(ds.block_parent(&text), Some(a));
    }

    #[test]
    fn test_environment_scope() {
        let options = ParseOptions::default();
        let mut ds = DocState::new(&options, body());
        ds.new_step("One");
        ds.apply_instructions("Environment: web, iOS");
        ds.reset_env();
        ds.append_nodes(vec![HeaderNode::new(2, vec![TextNode::new("h").into()]).into()]);
        let mut list = ItemsListNode::new("", 0);
        list.new_item(vec![TextNode::new("item").into()]);
        ds.append_nodes(vec![list.into()]);
        ds.reset_env();
        ds.append_nodes(vec![TextNode::new("after").into()]);

        let step = ds.step.as_ref().unwrap();
        let tags = vec!["ios".to_string(), "web".to_string()];
        assert_eq!(step.content.nodes[0].env(), tags);
        match &step.content.nodes[1] {
            Node::ItemsList(l) => assert_eq!(l.items[0].env(), tags),
            other => panic!("unexpected {other:?}"),
        }
        assert!(step.content.nodes[2].env().is_empty());
    }

    #[test]
    fn test_environment_after_header_ends_at_next_header() {
        let options = ParseOptions::default();
        let mut ds = DocState::new(&options, body());
        ds.new_step("One");
        ds.reset_env();
        ds.append_nodes(vec![HeaderNode::new(3, vec![TextNode::new("A").into()]).into()]);
        ds.apply_instructions("Environment: web");
        ds.append_nodes(vec![TextNode::new("in scope").into()]);
        ds.reset_env();
        ds.append_nodes(vec![HeaderNode::new(3, vec![TextNode::new("B").into()]).into()]);
        ds.append_nodes(vec![TextNode::new("plain").into()]);

        let nodes = &ds.step.as_ref().unwrap().content.nodes;
        assert_eq!(nodes[0].env(), ["web"]);
        assert_eq!(nodes[1].env(), ["web"]);
        assert!(nodes[2].env().is_empty());
        assert!(nodes[3].env().is_empty());
    }

    #[test]
    fn test_finish_totals() {
        let options = ParseOptions::default();
        let mut ds = DocState::new(&options, body());
        ds.append_nodes(vec![TextNode::new("ignored").into()]);
        ds.new_step("One");
        ds.apply_instructions("Duration: 1:30\nenvironment: web");
        ds.new_step("Two");
        ds.apply_instructions("duration: 5");
        ds.apply_instructions("environment: android, web");
        let codelab = ds.finish();
        assert_eq!(codelab.steps.len(), 2);
        assert_eq!(codelab.meta.duration, 7);
        assert_eq!(codelab.meta.tags, vec!["android", "web"]);
        assert_eq!(codelab.steps[1].tags, vec!["android", "web"]);
        assert!(codelab.steps[0].content.nodes.is_empty());
    }
}
