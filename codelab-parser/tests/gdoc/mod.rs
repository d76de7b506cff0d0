//! End-to-end tests for word-processor exports
//!
//! Documents go through the default registry, the way callers use it.

use codelab_parser::ir::nodes::{InfoboxKind, NodeType};
use codelab_parser::{Codelab, FormatRegistry, Node, ParseError, ParseOptions};

const STYLE: &str = r#"<style type="text/css">
    @import url('https://themes.googleusercontent.com/fonts/css?kit=x');
    .c1{color:#b7b7b7;font-size:11pt}.c2{font-weight:700}.c3{font-family:"Courier New"}
    .c4{background-color:#fce5cd}.c5{border:1px solid black}
</style>"#;

fn export(body: &str) -> Vec<u8> {
    format!(r#"<html><head><meta content="text/html; charset=UTF-8">{STYLE}</head><body class="doc-content">{body}</body></html>"#)
        .into_bytes()
}

fn parse(body: &str) -> Codelab {
    FormatRegistry::default()
        .parse(&export(body), "gdoc", &ParseOptions::default())
        .expect("export to parse")
}

#[test]
fn test_two_image_lab() {
    let mut codelab = parse(concat!(
        r#"<p class="title"><span>Sample lab</span></p>"#,
        r#"<table><tbody><tr><td><p><span>id</span></p></td><td><p><span>test-lab</span></p></td></tr></tbody></table>"#,
        r#"<h1><span>Overview</span></h1>"#,
        r#"<p><span><img src="https://img/one.png" style="width: 200.00px; height: 100.00px;"></span></p>"#,
        r#"<p><span><img src="https://img/two.png"></span></p>"#,
    ));

    assert_eq!(codelab.meta.id, "test-lab");
    assert_eq!(codelab.meta.url, "test-lab");
    assert_eq!(codelab.meta.title, "Sample lab");
    assert_eq!(codelab.steps.len(), 1);
    assert_eq!(codelab.steps[0].title, "Overview");

    let images = codelab.image_nodes_mut();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].src, "https://img/one.png");
    assert_eq!(images[0].width, 200.0);
    assert_eq!(images[1].src, "https://img/two.png");
}

#[test]
fn test_title_defines_id_without_table() {
    let codelab = parse(r#"<p class="title"><span>Build A Thing!</span></p><h1>One</h1><p>x</p>"#);
    assert_eq!(codelab.meta.id, "build-a-thing");
}

#[test]
fn test_import_directive() {
    let codelab = parse(concat!(
        r#"<h1>Shared</h1>"#,
        r#"<p><span>[[</span><span class="c2">import</span><span> </span>"#,
        r#"<a href="https://www.google.com/url?q=https://docs.example/frag&amp;sa=D">shared</a><span>]]</span></p>"#,
    ));
    let nodes = &codelab.steps[0].content.nodes;
    match &nodes[..] {
        [Node::Import(import)] => {
            assert_eq!(import.url, "https://docs.example/frag");
            assert!(import.content.nodes.is_empty());
        }
        other => panic!("expected a single import, got {other:?}"),
    }
}

#[test]
fn test_unknown_directive_is_left_alone() {
    let codelab = parse(concat!(
        r#"<h1>Shared</h1>"#,
        r#"<p><span>[[</span><span class="c2">include</span><span> </span><a href="https://x">x</a><span>]]</span></p>"#,
    ));
    assert!(matches!(&codelab.steps[0].content.nodes[..], [Node::List(_)]));
}

#[test]
fn test_environment_scoping() {
    let codelab = parse(concat!(
        r#"<h1>Setup</h1>"#,
        r#"<p><span class="c1">Environment: web, ios</span></p>"#,
        r#"<h2><span>What you'll learn</span></h2>"#,
        r#"<ul><li><span>Build</span></li><li><span>Ship</span></li></ul>"#,
    ));
    let tags = vec!["ios".to_string(), "web".to_string()];
    let step = &codelab.steps[0];
    assert_eq!(step.tags, tags);
    assert_eq!(codelab.meta.tags, tags);

    let [header, list] = &step.content.nodes[..] else {
        panic!("expected a header and a list, got {:?}", step.content.nodes);
    };
    assert_eq!(header.node_type(), NodeType::HEADER_CHECK);
    assert_eq!(header.env(), tags);
    match list {
        Node::ItemsList(l) => {
            assert_eq!(l.node_type(), NodeType::ITEMS_CHECK);
            assert_eq!(l.items.len(), 2);
            assert!(l.items.iter().all(|item| item.env() == tags));
        }
        other => panic!("expected an items list, got {other:?}"),
    }
}

#[test]
fn test_environment_after_header_ends_at_next_header() {
    let codelab = parse(concat!(
        r#"<h1>Setup</h1>"#,
        r#"<h2><span>A</span></h2>"#,
        r#"<p><span class="c1">Environment: web</span></p>"#,
        r#"<h2><span>B</span></h2>"#,
        r#"<p><span>plain</span></p>"#,
    ));
    match &codelab.steps[0].content.nodes[..] {
        [a, b, text] => {
            assert_eq!(a.env(), ["web"]);
            assert!(b.node_type().is_header());
            assert!(b.env().is_empty(), "header B inherited {:?}", b.env());
            assert!(text.env().is_empty());
        }
        other => panic!("unexpected step content {other:?}"),
    }
}

#[test]
fn test_negative_infobox_with_code_inside() {
    let codelab = parse(concat!(
        r#"<h1>Careful</h1>"#,
        r#"<table><tbody><tr><td class="c4"><p><span>Do not run </span><span class="c3">rm -rf</span></p></td></tr></tbody></table>"#,
    ));
    match &codelab.steps[0].content.nodes[..] {
        [Node::Infobox(infobox)] => {
            assert_eq!(infobox.kind, InfoboxKind::Negative);
            // Code styling inside an infobox never opens a code block.
            assert!(matches!(&infobox.content.nodes[..], [Node::List(_)]));
        }
        other => panic!("expected an infobox, got {other:?}"),
    }
}

#[test]
fn test_comments_region_ends_the_walk() {
    let codelab = parse(concat!(
        r#"<h1>Only</h1><p><span>kept</span></p>"#,
        r##"<div class="c5"><p><a href="#cmnt_ref1">[a]</a><span>a comment</span></p></div>"##,
        r#"<h1>Never</h1>"#,
    ));
    assert_eq!(codelab.steps.len(), 1);
    assert_eq!(codelab.steps[0].content.nodes.len(), 1);
}

#[test]
fn test_malformed_stylesheet_fails() {
    let source = b"<html><head><style>.c1{color:red</style></head><body></body></html>";
    let err = FormatRegistry::default()
        .parse(source, "gdoc", &ParseOptions::default())
        .unwrap_err();
    assert!(matches!(err, ParseError::Css { .. }));
}

#[test]
fn test_custom_meta_colour() {
    let mut options = ParseOptions::default();
    options.gdoc.meta_color = "#ff0000".to_string();
    let source = format!(
        "<html><head><style>.m{{color:#FF0000}}</style></head><body>{}</body></html>",
        r#"<h1>One</h1><p><span class="m">Duration: 7</span></p>"#
    );
    let codelab = FormatRegistry::default()
        .parse(source.as_bytes(), "gdoc", &options)
        .unwrap();
    assert_eq!(codelab.meta.duration, 7);
    assert!(codelab.steps[0].content.nodes.is_empty());
}
