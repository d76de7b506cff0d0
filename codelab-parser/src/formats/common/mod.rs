//! Machinery shared by the HTML-based formats
//!
//! Both supported sources end up as an HTML tree: word-processor exports are HTML already and
//! Markdown is rendered first. This module holds the tree navigation helpers, the traversal
//! context and the generic walk; each format only supplies its [`walk::Walker`].

pub(crate) mod dom;
pub(crate) mod state;
pub(crate) mod walk;

use crate::error::ParseError;
use crate::ir::nodes::{import_nodes_mut, BlockMarker, IframeNode, Node, NodeType, YouTubeNode};
use crate::options::ParseOptions;
use url::Url;

const HEADER_LEARN: &str = "what you'll learn";
const HEADER_COVER: &str = "what we've covered";
const HEADER_FAQ: &str = "frequently asked questions";

/// Header variant for the given header text, compared case-insensitively.
pub(crate) fn header_kind(text: &str) -> NodeType {
    match text.trim().to_lowercase().as_str() {
        HEADER_LEARN | HEADER_COVER => NodeType::HEADER_CHECK,
        HEADER_FAQ => NodeType::HEADER_FAQ,
        _ => NodeType::HEADER,
    }
}

/// Items list variant following a header of type `header`.
pub(crate) fn items_kind(header: Option<NodeType>) -> NodeType {
    match header {
        Some(t) if t == NodeType::HEADER_CHECK => NodeType::ITEMS_CHECK,
        Some(t) if t == NodeType::HEADER_FAQ => NodeType::ITEMS_FAQ,
        _ => NodeType::ITEMS_LIST,
    }
}

/// Whether a link text marks a download button.
pub(crate) fn is_download_text(text: &str) -> bool {
    text.trim().to_lowercase().starts_with("download ")
}

/// What an image's alt text asks to embed instead of the image.
pub(crate) enum Embed {
    /// A video or iframe; `None` when the URL lacks the required parts.
    Accepted(Option<Node>),
    /// An iframe the options do not allow, with the alt text explaining why.
    Rejected(String),
    /// A plain image.
    Plain,
}

/// Inspect an image's alt text for a video or iframe URL.
pub(crate) fn embed_from_alt(alt: &str, options: &ParseOptions) -> Embed {
    let alt = alt.trim();
    if alt.contains("youtube.com/watch") {
        return Embed::Accepted(youtube(alt));
    }
    if !alt.contains("https://") {
        return Embed::Plain;
    }
    let Ok(url) = Url::parse(alt) else {
        return Embed::Plain;
    };
    let host = url.host_str().unwrap_or_default();
    if !options.iframe_allowed(host) {
        tracing::warn!(host = %host, "iframe domain not allow-listed");
        return Embed::Rejected(format!(
            "The domain of the requested iframe ({host}) has not been whitelisted."
        ));
    }
    if url.scheme() != "https" {
        tracing::warn!(url = %url, "iframe without https");
        return Embed::Rejected(format!("The requested iframe ({url}) must use https."));
    }
    let mut node: Node = IframeNode::new(url.as_str()).into();
    node.mutate_block(Some(BlockMarker::STANDALONE));
    Embed::Accepted(Some(node))
}

fn youtube(alt: &str) -> Option<Node> {
    let url = Url::parse(alt).ok()?;
    let (_, id) = url.query_pairs().find(|(k, v)| k == "v" && !v.is_empty())?;
    let mut node: Node = YouTubeNode::new(id.into_owned()).into();
    node.mutate_block(Some(BlockMarker::STANDALONE));
    Some(node)
}

/// Fail if a fragment's nodes contain an import of their own.
pub(crate) fn reject_nested_imports(mut nodes: Vec<Node>) -> Result<Vec<Node>, ParseError> {
    if let Some(import) = import_nodes_mut(&mut nodes).first() {
        return Err(ParseError::NestedImport(import.url.clone()));
    }
    Ok(nodes)
}
