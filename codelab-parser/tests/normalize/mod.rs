//! Properties of the normalization passes

use codelab_parser::common::compact::{compact_nodes, SPACER};
use codelab_parser::common::squash::block_nodes;
use codelab_parser::common::text::parse_duration;
use codelab_parser::ir::nodes::{BlockMarker, CodeNode, ImageNode, Node, TextNode};
use proptest::prelude::*;

fn inline_node() -> impl Strategy<Value = Node> {
    let block = prop::option::of(1u32..4).prop_map(|b| b.map(BlockMarker::new));
    let leaf = prop_oneof![
        "[a-z ]{0,6}".prop_map(|v| Node::from(TextNode::new(v))),
        "[a-z]{1,4}".prop_map(|v| Node::from(ImageNode::new(v))),
        "[a-z\n]{0,4}".prop_map(|v| Node::from(CodeNode::new(v, false, ""))),
    ];
    (leaf, block).prop_map(|(mut node, block)| {
        node.mutate_block(block);
        node
    })
}

proptest! {
    #[test]
    fn squashing_is_idempotent(nodes in prop::collection::vec(inline_node(), 0..12)) {
        let once = block_nodes(nodes);
        let twice = block_nodes(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn env_is_sorted_and_unique(tags in prop::collection::vec("[a-c]{1,2}", 0..8)) {
        let mut node = Node::from(TextNode::new("x"));
        node.mutate_env(&tags);
        let mut expected = tags.clone();
        expected.sort();
        expected.dedup();
        prop_assert_eq!(node.env(), expected.as_slice());
    }

    #[test]
    fn duration_parsing_never_fails(input in "\\PC{0,12}") {
        let d = parse_duration(&input);
        prop_assert_eq!(d.as_secs() % 60, 0);
    }
}

#[test]
fn test_env_is_copied() {
    let mut tags = vec!["web".to_string(), "ios".to_string()];
    let mut node = Node::from(TextNode::new("x"));
    node.mutate_env(&tags);
    tags[0] = "android".to_string();
    assert_eq!(node.env(), ["ios".to_string(), "web".to_string()]);
}

#[test]
fn test_compacts_adjacent_text() {
    let nodes = compact_nodes(vec![TextNode::new("foo ").into(), TextNode::new("bar").into()]);
    match &nodes[..] {
        [Node::Text(t)] => assert_eq!(t.value, "foo bar"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_compacts_code_of_one_block() {
    let code = |v: &str| {
        let mut n = Node::from(CodeNode::new(v, false, "go"));
        n.mutate_block(Some(BlockMarker::new(1)));
        n
    };
    match &compact_nodes(vec![code("a"), code("b")])[..] {
        [Node::Code(c)] => assert_eq!(c.value, "ab"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_spacer_between_bold_runs() {
    let bold = |v: &str, code: bool| {
        Node::Text(TextNode {
            bold: true,
            code,
            ..TextNode::new(v)
        })
    };
    let nodes = compact_nodes(vec![bold("a", false), bold("b", true)]);
    let values: Vec<&str> = nodes
        .iter()
        .map(|n| match n {
            Node::Text(t) => t.value.as_str(),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(values, vec!["a", SPACER, "b"]);
}
