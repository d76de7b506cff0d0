//! Format trait definition
//!
//! This module defines the Format trait that every source format implements.
//! A format turns raw source bytes into a [`Codelab`], or into the bare node
//! list of an imported fragment.

use crate::error::ParseError;
use crate::ir::codelab::Codelab;
use crate::ir::nodes::Node;
use crate::options::ParseOptions;

/// Trait for codelab source formats
///
/// Implementors are stateless: every call builds its own parse context, so a
/// single instance can serve concurrent parses.
///
/// # Examples
///
/// ```ignore
/// struct MyFormat;
///
/// impl Format for MyFormat {
///     fn name(&self) -> &str {
///         "my-format"
///     }
///
///     fn parse(&self, source: &[u8], options: &ParseOptions) -> Result<Codelab, ParseError> {
///         todo!()
///     }
///
///     fn parse_fragment(&self, source: &[u8], options: &ParseOptions) -> Result<Vec<Node>, ParseError> {
///         todo!()
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// The name of this format (e.g., "gdoc", "md")
    fn name(&self) -> &str;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }

    /// File extensions associated with this format (e.g., ["md", "markdown"])
    ///
    /// Returns a slice of file extensions without the leading dot.
    /// Used for automatic format detection from filenames.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// Parse a complete source document: metadata, steps and their content.
    fn parse(&self, source: &[u8], options: &ParseOptions) -> Result<Codelab, ParseError>;

    /// Parse a fragment meant to be spliced into an import directive.
    ///
    /// Fragments have no metadata. A step boundary or an import of their own
    /// is an error.
    fn parse_fragment(&self, source: &[u8], options: &ParseOptions)
        -> Result<Vec<Node>, ParseError>;
}
