//! Document model shared by every source format.
//!
//! Parsers produce a [`codelab::Codelab`] made of steps whose content is a
//! tree of [`nodes::Node`] values. Renderers consume the same model, walking
//! it through the node capability set only.

pub mod codelab;
pub mod nodes;

pub use codelab::{Codelab, LegacyStatus, Meta, Step};
pub use nodes::{BlockMarker, Node, NodeType};
