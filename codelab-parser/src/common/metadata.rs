//! Codelab-level metadata and step-level instructions.
//!
//! Both source formats reduce their metadata block to `key: value` pairs with
//! normalized keys; [`apply_field`] maps them onto [`Meta`]. Step instructions
//! are single `key: value` lines recognized inside a step.

use super::text::{normalized_split_lower, parse_duration, slug, snake_case};
use crate::ir::codelab::{LegacyStatus, Meta};
use std::collections::BTreeSet;
use std::time::Duration;

/// Assign one metadata field.
///
/// `key` is normalized to snake case first. Keys outside the fixed table are
/// kept in [`Meta::extra`] only when listed in `pass_metadata`.
pub fn apply_field(meta: &mut Meta, key: &str, value: &str, pass_metadata: &BTreeSet<String>) {
    let key = snake_case(key);
    let value = value.trim();
    match key.as_str() {
        "id" | "url" => meta.id = value.to_string(),
        "author" | "authors" => meta.authors = value.to_string(),
        "summary" => meta.summary = value.to_string(),
        "category" | "categories" => {
            meta.categories = normalized_split_lower(value);
            meta.theme = meta.categories.first().map(|c| slug(c)).unwrap_or_default();
        }
        "environment" | "environments" | "tags" => {
            meta.tags.extend(normalized_split_lower(value));
        }
        "status" | "state" => meta.status = Some(LegacyStatus(normalized_split_lower(value))),
        "feedback" | "feedback_link" => meta.feedback = value.to_string(),
        "analytics" | "analytics_account" | "google_analytics" => meta.ga = value.to_string(),
        _ if pass_metadata.contains(&key) => {
            meta.extra.insert(key, value.to_string());
        }
        _ => tracing::debug!(key = %key, "ignoring unknown metadata field"),
    }
}

/// A recognized step instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Duration(Duration),
    Environment(Vec<String>),
}

/// Parse a `key: value` step instruction. Unknown keys yield `None`.
pub fn parse_instruction(text: &str) -> Option<Instruction> {
    let (key, value) = text.trim().split_once(':')?;
    let value = value.trim();
    match key.trim().to_lowercase().as_str() {
        "duration" => Some(Instruction::Duration(parse_duration(value))),
        "environment" => Some(Instruction::Environment(normalized_split_lower(value))),
        _ => None,
    }
}

/// True if `text` starts with a step instruction key.
pub fn is_instruction(text: &str) -> bool {
    let lower = text.trim_start().to_lowercase();
    lower.starts_with("duration:") || lower.starts_with("environment:")
}
