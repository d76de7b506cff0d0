//! End-to-end tests for Markdown codelabs

use codelab_parser::ir::nodes::NodeType;
use codelab_parser::{Codelab, FormatRegistry, Node, ParseError, ParseOptions};
use insta::assert_snapshot;

const LAB: &str = r#"# Sample Codelab

id: sample-lab
categories: Web, Cloud
authors: Jane Doe
feedback link: https://issues.example/new
difficulty: beginner

## Overview
Duration: 2

Welcome to **the lab**.

![diagram](https://img/diagram.png)

[[**import** [shared](https://docs.example/shared.md)]]

## Setup
Duration: 1:30
Environment: web, ios

### What you'll learn

- Build
- Ship

```console
npm install
```
"#;

fn parse_with(source: &str, options: &ParseOptions) -> Codelab {
    FormatRegistry::default()
        .parse(source.as_bytes(), "md", options)
        .expect("markdown to parse")
}

#[test]
fn test_metadata_preamble() {
    let mut options = ParseOptions::default();
    options.pass_metadata.insert("difficulty".to_string());
    let codelab = parse_with(LAB, &options);
    let meta = &codelab.meta;

    assert_eq!(meta.title, "Sample Codelab");
    assert_eq!(meta.id, "sample-lab");
    assert_eq!(meta.url, "sample-lab");
    assert_eq!(meta.categories, vec!["web", "cloud"]);
    assert_eq!(meta.theme, "web");
    assert_eq!(meta.authors, "Jane Doe");
    assert_eq!(meta.feedback, "https://issues.example/new");
    assert_eq!(meta.extra.get("difficulty").map(String::as_str), Some("beginner"));
    assert_eq!(meta.duration, 4);
    assert_eq!(meta.tags, vec!["ios", "web"]);
}

#[test]
fn test_unlisted_metadata_is_dropped() {
    let codelab = parse_with(LAB, &ParseOptions::default());
    assert!(codelab.meta.extra.is_empty());
}

#[test]
fn test_steps_and_import_directive() {
    let codelab = parse_with(LAB, &ParseOptions::default());
    let titles: Vec<&str> = codelab.steps.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Overview", "Setup"]);

    let nodes = &codelab.steps[0].content.nodes;
    assert_eq!(nodes.len(), 3);
    match &nodes[0] {
        Node::List(p) => {
            let text: String = p
                .nodes
                .iter()
                .map(|n| match n {
                    Node::Text(t) => t.value.as_str(),
                    other => panic!("unexpected {other:?}"),
                })
                .collect();
            assert_snapshot!(text, @"Welcome to the lab.");
        }
        other => panic!("expected a paragraph, got {other:?}"),
    }
    match &nodes[2] {
        Node::Import(import) => assert_eq!(import.url, "https://docs.example/shared.md"),
        other => panic!("expected an import, got {other:?}"),
    }
}

#[test]
fn test_environment_scoping() {
    let codelab = parse_with(LAB, &ParseOptions::default());
    let step = &codelab.steps[1];
    let tags = vec!["ios".to_string(), "web".to_string()];
    assert_eq!(step.tags, tags);
    assert_eq!(step.duration.as_secs(), 120);

    match &step.content.nodes[..] {
        [header, Node::ItemsList(list), Node::Code(code)] => {
            assert_eq!(header.node_type(), NodeType::HEADER_CHECK);
            assert_eq!(header.env(), tags);
            assert_eq!(list.node_type(), NodeType::ITEMS_CHECK);
            assert!(list.items.iter().all(|item| item.env() == tags));
            assert!(code.term);
            assert_eq!(code.value.trim(), "npm install");
        }
        other => panic!("unexpected step content {other:?}"),
    }
}

#[test]
fn test_environment_after_header_ends_at_next_header() {
    let codelab = parse_with(
        "# Lab\n\nid: lab\n\n## One\n\n### A\n\nEnvironment: web\n\n### B\n\nplain\n",
        &ParseOptions::default(),
    );
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
fn test_missing_id_fails() {
    let err = FormatRegistry::default()
        .parse(b"# Lab\n\nauthors: Jane\n\n## One\n", "md", &ParseOptions::default())
        .unwrap_err();
    assert!(matches!(err, ParseError::MissingId));
}

#[test]
fn test_block_quote_infobox() {
    let codelab = parse_with(
        "# Lab\n\nid: lab\n\n## One\n\n> aside negative\n> Mind the gap.\n",
        &ParseOptions::default(),
    );
    match &codelab.steps[0].content.nodes[..] {
        [Node::Infobox(infobox)] => {
            assert_eq!(infobox.kind.as_str(), "warning");
            assert!(!infobox.is_empty());
        }
        other => panic!("expected an infobox, got {other:?}"),
    }
}
