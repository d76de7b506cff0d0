//! Word-processor export format
//!
//! Parses the HTML a word processor produces when a document is exported.
//! The export has almost no semantic markup: code, buttons, infoboxes, surveys
//! and step instructions are told apart by the styling conventions configured
//! in [`GdocStyles`](crate::options::GdocStyles), resolved through the
//! document's embedded style sheet.
//!
//! # Element Mapping Table
//!
//! | Export construct                          | Node                         |
//! |-------------------------------------------|------------------------------|
//! | `.title` paragraph before the first step  | codelab title (and id slug)  |
//! | table before the first step               | metadata fields              |
//! | `h1`                                      | new step                     |
//! | `h2`..`h6`                                | Header (checklist, FAQ)      |
//! | meta-coloured text                        | step duration / environment  |
//! | `ul` / `ol`                               | ItemsList                    |
//! | code font inside a table cell             | Code block                   |
//! | console font inside a table cell          | Code block, terminal         |
//! | button-coloured element wrapping a link   | Url wrapping a Button        |
//! | tinted single cell                        | Infobox (positive/negative)  |
//! | survey-coloured cell                      | Survey                       |
//! | table with several rows or cells          | Grid                         |
//! | `img`, alt text with a video/iframe URL   | Image / YouTube / Iframe     |
//! | bordered `div`                            | end of document (comments)   |

pub(crate) mod css;
mod parser;
mod predicates;

use crate::error::ParseError;
use crate::format::Format;
use crate::ir::codelab::Codelab;
use crate::ir::nodes::Node;
use crate::options::ParseOptions;

/// Format implementation for word-processor HTML exports
#[derive(Debug, Default, Clone, Copy)]
pub struct GdocFormat;

impl Format for GdocFormat {
    fn name(&self) -> &str {
        "gdoc"
    }

    fn description(&self) -> &str {
        "HTML exported from a word-processor document"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
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
