//! Format implementations
//!
//! This module contains the source formats a codelab can be written in. Both
//! end up as an HTML tree walked by the shared machinery in [`common`].

pub(crate) mod common;
pub mod gdoc;
pub mod markdown;

pub use gdoc::GdocFormat;
pub use markdown::MarkdownFormat;
