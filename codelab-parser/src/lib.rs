//! Codelab document parsing
//!
//!     This crate turns codelab sources into a single document model: a [`ir::Codelab`] made of
//!     metadata and ordered steps, each step a tree of [`ir::Node`] values ready for renderers.
//!
//!     TLDR: For format authors:
//!         - A format never renders anything, it only recognizes constructs in its source and
//!           emits nodes.
//!         - Both formats are HTML trees by the time they are walked: word-processor exports are
//!           HTML already and Markdown is rendered by comrak first.
//!         - Each format supplies its predicates and a walker (see ./formats/common/walk.rs); the
//!           traversal, the state machine and the normalization passes are shared.
//!
//! Architecture
//!
//!     The goal here is to, as much as possible, split the common logic for both formats into a
//!     format agnostic layer. This is done by the document model (./ir/mod.rs) and the common
//!     passes in ./common/mod.rs, so that format specific code stays focused on recognizing its
//!     markup.
//!
//!     This is a pure lib: no fetching, no rendering and no filesystem or shell assumptions.
//!     Imported fragments and images are retrieved by the caller and handed back through
//!     [`imports::FetchedResources`].
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── imports.rs              # Splicing fetched fragments into import nodes
//!     ├── options.rs              # ParseOptions
//!     ├── formats
//!     │   ├── <format>
//!     │   │   ├── parser.rs       # Walker implementation
//!     │   │   ├── predicates.rs   # Construct recognition
//!     │   │   └── mod.rs
//!     │   └── common              # DOM helpers, traversal state and the generic walk
//!     ├── lib.rs
//!     ├── ir                      # Document model
//!     └── common                  # Squashing, compaction, directives, metadata
//!
//! Testing
//!     tests
//!     ├── lib.rs
//!     └── <area>
//!         └── mod.rs
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.
//!
//! Core Algorithms
//!
//!     The walk is a depth-first traversal driven by a small state machine (./formats/common/state.rs)
//!     that tracks the current step, the active environment and flags suppressing nested constructs.
//!     Once a step ends, its flat node stream is normalized: nodes sharing a source block are
//!     squashed into lists (./common/squash.rs), adjacent compatible runs are merged
//!     (./common/compact.rs) and bracketed directives become dedicated nodes
//!     (./common/directives.rs).
//!
//! Formats
//!
//!     - gdoc: HTML exported from a word-processor document, where constructs are conveyed by
//!       styling (colours, fonts, table shapes).
//!     - md: CommonMark Markdown with a metadata preamble, where constructs are semantic tags or
//!       raw HTML.
//!
//!     Both are registered by [`FormatRegistry::with_defaults`].

pub mod error;
pub mod format;
pub mod formats;
pub mod imports;
pub mod options;
pub mod registry;

pub mod common;
pub mod ir;

pub use error::ParseError;
pub use format::Format;
pub use imports::{resolve_imports, FetchedResources, Fragment};
pub use ir::{Codelab, Meta, Node, Step};
pub use options::ParseOptions;
pub use registry::FormatRegistry;
