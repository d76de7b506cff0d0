//! Splicing fetched fragments into a parsed codelab

use codelab_parser::{resolve_imports, FetchedResources, FormatRegistry, Fragment, Node, ParseError, ParseOptions};

const LAB: &str = "# Lab\n\nid: lab\n\n## One\n\n[[**import** [a](https://docs/a)]]\n\n[[**import** [b](https://docs/b)]]\n";

fn imported(nodes: &[Node]) -> Vec<&[Node]> {
    nodes
        .iter()
        .filter_map(|n| match n {
            Node::Import(i) => Some(i.content.nodes.as_slice()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_fragments_from_both_formats() {
    let registry = FormatRegistry::default();
    let options = ParseOptions::default();
    let mut codelab = registry.parse(LAB.as_bytes(), "md", &options).unwrap();

    let mut resources = FetchedResources::default();
    resources.fragments.insert(
        "https://docs/a".to_string(),
        Fragment::new("md", "Shared *setup*.\n\n![shot](https://img/remote.png)\n"),
    );
    resources.fragments.insert(
        "https://docs/b".to_string(),
        Fragment::new(
            "gdoc",
            r#"<html><body><p><span>From a document</span></p><p><img src="https://img/remote.png"></p></body></html>"#,
        ),
    );
    resources
        .images
        .insert("https://img/remote.png".to_string(), "img/5d41402abc4b2a76.png".to_string());

    resolve_imports(&mut codelab, &registry, &options, &resources).unwrap();

    let contents = imported(&codelab.steps[0].content.nodes);
    assert_eq!(contents.len(), 2);
    assert!(contents.iter().all(|nodes| nodes.len() == 2));

    let images = codelab.image_nodes_mut();
    assert_eq!(images.len(), 2);
    assert!(images.iter().all(|i| i.src == "img/5d41402abc4b2a76.png"));
}

#[test]
fn test_failures_are_aggregated() {
    let registry = FormatRegistry::default();
    let options = ParseOptions::default();
    let mut codelab = registry.parse(LAB.as_bytes(), "md", &options).unwrap();

    let mut resources = FetchedResources::default();
    resources.fragments.insert(
        "https://docs/a".to_string(),
        Fragment::new("md", "## Another step\n"),
    );

    let err = resolve_imports(&mut codelab, &registry, &options, &resources).unwrap_err();
    let ParseError::Imports(errors) = &err else {
        panic!("expected an aggregate, got {err:?}");
    };
    let urls: Vec<&str> = errors
        .iter()
        .map(|e| match e {
            ParseError::Import { url, .. } => url.as_str(),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(urls, vec!["https://docs/a", "https://docs/b"]);
    assert!(err.to_string().starts_with("2 import(s) failed"));
}
