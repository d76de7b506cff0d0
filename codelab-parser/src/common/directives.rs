//! Directive resolution
//!
//!     After a step is squashed and compacted, paragraphs of the literal shape
//!     `[[` **keyword** content `]]` are rewritten into dedicated nodes. The only keyword
//!     understood today is `import`, whose content must be exactly one link; the paragraph is
//!     replaced by an [`ImportNode`] pointing at the link target.
//!
//!     Anything that does not match the shape, or uses an unknown keyword, is left as ordinary
//!     content.

use crate::ir::nodes::{ImportNode, Node};

pub const DIRECTIVE_OPEN: &str = "[[";
pub const DIRECTIVE_CLOSE: &str = "]]";
pub const DIRECTIVE_IMPORT: &str = "import";

/// Replace every directive paragraph among the top-level `nodes`.
pub fn resolve_directives(nodes: &mut [Node]) {
    for node in nodes.iter_mut() {
        let Node::List(list) = node else {
            continue;
        };
        let Some((keyword, body)) = directive_parts(&list.nodes) else {
            continue;
        };
        match transform(&keyword, body) {
            Some(mut replacement) => {
                replacement.mutate_env(list.env());
                *node = replacement;
            }
            None => tracing::debug!(keyword = %keyword, "leaving unresolved directive as content"),
        }
    }
}

/// Split a directive paragraph into its lower-cased keyword and body.
fn directive_parts(nodes: &[Node]) -> Option<(String, &[Node])> {
    if nodes.len() < 4 {
        return None;
    }
    let is_marker = |n: &Node, marker: &str| matches!(n, Node::Text(t) if t.value.trim() == marker);
    if !is_marker(&nodes[0], DIRECTIVE_OPEN) || !is_marker(&nodes[nodes.len() - 1], DIRECTIVE_CLOSE)
    {
        return None;
    }
    match &nodes[1] {
        Node::Text(t) if t.bold && !t.italic && !t.code => Some((
            t.value.trim().to_lowercase(),
            &nodes[2..nodes.len() - 1],
        )),
        _ => None,
    }
}

fn transform(keyword: &str, body: &[Node]) -> Option<Node> {
    match (keyword, body) {
        (DIRECTIVE_IMPORT, [Node::Url(link)]) => Some(ImportNode::new(link.url.clone()).into()),
        _ => None,
    }
}
