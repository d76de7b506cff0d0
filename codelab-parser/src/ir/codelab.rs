//! Codelab, its metadata and steps.

use super::nodes::{image_nodes_mut, import_nodes_mut, ImageNode, ImportNode, ListNode};
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Publication status values.
///
/// Older metadata stores the status as a Python list literal inside a JSON
/// string, e.g. `"['draft', u'hidden']"`. Both that form and a plain JSON array
/// are accepted on input; output is always an array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyStatus(pub Vec<String>);

impl LegacyStatus {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LegacyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        write!(f, "[{}]", self.0.join(","))
    }
}

impl Serialize for LegacyStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LegacyStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LegacyStatusVisitor)
    }
}

struct LegacyStatusVisitor;

impl<'de> Visitor<'de> for LegacyStatusVisitor {
    type Value = LegacyStatus;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of strings or a legacy status string")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<LegacyStatus, A::Error> {
        let mut values = Vec::new();
        while let Some(v) = seq.next_element::<String>()? {
            values.push(v);
        }
        Ok(LegacyStatus(values))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<LegacyStatus, E> {
        // Status values never contain single quotes.
        let json = v.replace("u'", "\"").replace('\'', "\"");
        serde_json::from_str::<Vec<String>>(&json)
            .map(LegacyStatus)
            .map_err(|e| E::custom(format!("{e}: {json}")))
    }

    fn visit_unit<E: de::Error>(self) -> Result<LegacyStatus, E> {
        Ok(LegacyStatus::default())
    }
}

/// Codelab metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    /// Also part of the codelab URL.
    pub id: String,
    /// Total duration in minutes.
    pub duration: u64,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub authors: String,
    pub summary: String,
    /// Source document reference, filled by whoever fetched it.
    pub source: String,
    /// Slug of the first category.
    pub theme: String,
    pub status: Option<LegacyStatus>,
    #[serde(rename = "category")]
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub feedback: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ga: String,
    /// Pass-through metadata keys allowed by the caller.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
    /// Legacy alias of `id`.
    pub url: String,
}

/// A single codelab step.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub title: String,
    pub tags: Vec<String>,
    pub duration: Duration,
    pub content: ListNode,
}

impl Step {
    pub fn new(title: impl Into<String>) -> Self {
        Step {
            title: title.into(),
            tags: Vec::new(),
            duration: Duration::ZERO,
            content: ListNode::default(),
        }
    }
}

/// A parsed codelab: metadata plus ordered steps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Codelab {
    pub meta: Meta,
    pub steps: Vec<Step>,
}

impl Codelab {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every image node across all steps.
    pub fn image_nodes_mut(&mut self) -> Vec<&mut ImageNode> {
        self.steps
            .iter_mut()
            .flat_map(|s| image_nodes_mut(&mut s.content.nodes))
            .collect()
    }

    /// Every import node across all steps.
    pub fn import_nodes_mut(&mut self) -> Vec<&mut ImportNode> {
        self.steps
            .iter_mut()
            .flat_map(|s| import_nodes_mut(&mut s.content.nodes))
            .collect()
    }
}
