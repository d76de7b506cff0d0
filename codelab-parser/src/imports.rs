//! Splicing of imported fragments
//!
//! A parsed codelab only records *where* its imports point. Fetching is done
//! elsewhere; the caller hands the fetched bytes back as [`FetchedResources`]
//! and [`resolve_imports`] parses each fragment in its declared format and
//! fills the matching import node. Image sources inside fragments are
//! rewritten to the local names the fetcher chose for them.

use crate::error::ParseError;
use crate::ir::codelab::Codelab;
use crate::ir::nodes::{image_nodes_mut, Node};
use crate::options::ParseOptions;
use crate::registry::FormatRegistry;
use std::collections::HashMap;

/// The raw bytes of one imported fragment, with the format they are in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub format: String,
    pub body: Vec<u8>,
}

impl Fragment {
    pub fn new(format: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Fragment {
            format: format.into(),
            body: body.into(),
        }
    }
}

/// Everything the fetch layer retrieved for one codelab.
#[derive(Debug, Clone, Default)]
pub struct FetchedResources {
    /// Fragment bytes by import URL.
    pub fragments: HashMap<String, Fragment>,
    /// Local file name by remote image URL.
    pub images: HashMap<String, String>,
}

/// Rewrite every image source found in `images`. Returns how many changed.
pub fn rewrite_image_sources(nodes: &mut [Node], images: &HashMap<String, String>) -> usize {
    let mut rewritten = 0;
    for image in image_nodes_mut(nodes) {
        if let Some(local) = images.get(&image.src) {
            image.src = local.clone();
            rewritten += 1;
        }
    }
    rewritten
}

/// Fill every import node of `codelab` from `resources`.
///
/// Every import is attempted; all failures are returned together as
/// [`ParseError::Imports`], each wrapped in [`ParseError::Import`] with the
/// fragment URL. Imports that resolved keep their content either way.
pub fn resolve_imports(
    codelab: &mut Codelab,
    registry: &FormatRegistry,
    options: &ParseOptions,
    resources: &FetchedResources,
) -> Result<(), ParseError> {
    let mut errors = Vec::new();

    for import in codelab.import_nodes_mut() {
        let parsed = resources
            .fragments
            .get(&import.url)
            .ok_or(ParseError::FragmentNotFetched)
            .and_then(|fragment| registry.parse_fragment(&fragment.body, &fragment.format, options));

        match parsed {
            Ok(mut nodes) => {
                rewrite_image_sources(&mut nodes, &resources.images);
                tracing::debug!(url = %import.url, nodes = nodes.len(), "import resolved");
                import.content.append(nodes);
            }
            Err(err) => {
                tracing::warn!(url = %import.url, error = %err, "import failed");
                errors.push(ParseError::Import {
                    url: import.url.clone(),
                    source: Box::new(err),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ParseError::Imports(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::codelab::Step;
    use crate::ir::nodes::{ImageNode, ImportNode, ListNode, TextNode, UrlNode};

    fn lab_with_imports(urls: &[&str]) -> Codelab {
        let mut codelab = Codelab::new();
        let mut step = Step::new("one");
        for url in urls {
            step.content.append(vec![ImportNode::new(*url).into()]);
        }
        codelab.steps.push(step);
        codelab
    }

    fn imported(codelab: &Codelab, index: usize) -> &ImportNode {
        match &codelab.steps[0].content.nodes[index] {
            Node::Import(import) => import,
            other => panic!("expected an import, got {other:?}"),
        }
    }

    #[test]
    fn test_rewrite_image_sources_nested() {
        let mut nodes: Vec<Node> = vec![
            ImageNode::new("https://img/a.png").into(),
            UrlNode::new("x", vec![ImageNode::new("https://img/b.png").into()]).into(),
            ListNode::new(vec![ImageNode::new("https://img/unknown.png").into()]).into(),
        ];
        let images = HashMap::from([
            ("https://img/a.png".to_string(), "img/1.png".to_string()),
            ("https://img/b.png".to_string(), "img/2.png".to_string()),
        ]);
        assert_eq!(rewrite_image_sources(&mut nodes, &images), 2);
        let srcs: Vec<_> = image_nodes_mut(&mut nodes)
            .into_iter()
            .map(|i| i.src.clone())
            .collect();
        assert_eq!(srcs, vec!["img/1.png", "img/2.png", "https://img/unknown.png"]);
    }

    #[test]
    fn test_resolve_imports_fills_content() {
        let mut codelab = lab_with_imports(&["https://host/frag"]);
        let mut resources = FetchedResources::default();
        resources.fragments.insert(
            "https://host/frag".into(),
            Fragment::new("md", "Shared text\n\n![pic](https://img/p.png)\n"),
        );
        resources
            .images
            .insert("https://img/p.png".into(), "img/p.png".into());

        resolve_imports(
            &mut codelab,
            &FormatRegistry::default(),
            &ParseOptions::default(),
            &resources,
        )
        .unwrap();

        let import = imported(&codelab, 0);
        assert!(!import.is_empty());
        let mut nodes = import.content.nodes.clone();
        let images = image_nodes_mut(&mut nodes);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].src, "img/p.png");
    }

    #[test]
    fn test_resolve_imports_collects_every_failure() {
        let mut codelab = lab_with_imports(&["https://a", "https://b", "https://c"]);
        let mut resources = FetchedResources::default();
        resources
            .fragments
            .insert("https://b".into(), Fragment::new("docx", "x"));
        resources
            .fragments
            .insert("https://c".into(), Fragment::new("md", "ok"));

        let err = resolve_imports(
            &mut codelab,
            &FormatRegistry::default(),
            &ParseOptions::default(),
            &resources,
        )
        .unwrap_err();

        let ParseError::Imports(errors) = err else {
            panic!("expected an aggregate error");
        };
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            &errors[0],
            ParseError::Import { url, source } if url == "https://a"
                && matches!(**source, ParseError::FragmentNotFetched)
        ));
        assert!(matches!(
            &errors[1],
            ParseError::Import { url, source } if url == "https://b"
                && matches!(**source, ParseError::FormatNotFound(_))
        ));
        // The good import is still spliced in.
        assert!(!imported(&codelab, 2).is_empty());
    }

    #[test]
    fn test_resolve_imports_rejects_nested_import() {
        let mut codelab = lab_with_imports(&["https://a"]);
        let mut resources = FetchedResources::default();
        resources.fragments.insert(
            "https://a".into(),
            Fragment::new("md", "[[**import** [x](https://other)]]\n"),
        );

        let err = resolve_imports(
            &mut codelab,
            &FormatRegistry::default(),
            &ParseOptions::default(),
            &resources,
        )
        .unwrap_err();
        let ParseError::Imports(errors) = err else {
            panic!("expected an aggregate error");
        };
        assert!(matches!(
            &errors[0],
            ParseError::Import { source, .. } if matches!(**source, ParseError::NestedImport(_))
        ));
    }

    #[test]
    fn test_no_imports_is_ok() {
        let mut codelab = Codelab::new();
        let mut step = Step::new("one");
        step.content.append(vec![TextNode::new("plain").into()]);
        codelab.steps.push(step);
        assert!(resolve_imports(
            &mut codelab,
            &FormatRegistry::default(),
            &ParseOptions::default(),
            &FetchedResources::default(),
        )
        .is_ok());
    }
}
