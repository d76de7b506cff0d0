//! Markdown format implementation
//!
//! This module parses codelabs written in Markdown.
//!
//! # Library Choice
//!
//! We use the `comrak` crate to render Markdown to HTML, then walk the
//! rendered tree with the same machinery as the word-processor format:
//! - CommonMark compliant, with the table, strikethrough and autolink extensions
//! - Raw HTML is passed through, which is how authors write buttons, asides,
//!   surveys and videos
//!
//! # Element Mapping Table
//!
//! | Markdown                                   | Node                          |
//! |--------------------------------------------|-------------------------------|
//! | first `# Title`                            | codelab title                 |
//! | first paragraph of `key: value` lines      | metadata (an `id` is required)|
//! | `## Step`                                  | new step                      |
//! | `###`..`######`                            | Header, levels 2..5           |
//! | `Duration: 5` / `Environment: web` line    | step instructions             |
//! | `- item` / `1. item`                       | ItemsList                     |
//! | fenced code, `console` info string         | Code, terminal                |
//! | fenced code                                | Code with language            |
//! | `` `code` ``                               | code-styled Text              |
//! | `<button><a href>..</a></button>`          | Url wrapping a Button         |
//! | `<aside class="positive">`, `> aside ..`   | Infobox                       |
//! | `<form>` of `<name>` and `<input>`         | Survey                        |
//! | table                                      | Grid                          |
//! | `<video id>`, image with a video alt text  | YouTube                       |
//! | image with an iframe URL alt text          | Iframe                        |

mod parser;
mod predicates;
mod render;

use crate::error::ParseError;
use crate::format::Format;
use crate::ir::codelab::Codelab;
use crate::ir::nodes::Node;
use crate::options::ParseOptions;

/// Format implementation for Markdown
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownFormat;

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "md"
    }

    fn description(&self) -> &str {
        "CommonMark Markdown codelab"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn parse(&self, source: &[u8], options: &ParseOptions) -> Result<Codelab, ParseError> {
        parser::parse_document(source, options)
    }

    fn parse_fragment(
        &self,
        source: &[u8],
        options: &ParseOptions,
    ) -> Result<Vec<Node>, ParseError> {
        parser::parse_fragment(source, options)
    }
}
