//! Format-agnostic processing over the document model.
//!
//! Both parsers feed their raw node streams through the same passes here:
//! block squashing ([`squash`]), compaction ([`compact`]) and directive
//! resolution ([`directives`]), plus the metadata key table and text helpers
//! they share.

pub mod compact;
pub mod directives;
pub mod metadata;
pub mod squash;
pub mod text;

pub use compact::compact_nodes;
pub use directives::resolve_directives;
pub use squash::block_nodes;
