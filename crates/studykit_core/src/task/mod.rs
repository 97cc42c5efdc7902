//! Task-category documents.
//!
//! Step-level task decoding belongs to the host's task engine; this module
//! keeps the identifying fields and raw steps, plus the tracked item catalog
//! that seeds logging collections.

use crate::factory::decoder::decode_fields;
use crate::factory::error::DecodeResult;
use crate::factory::registry::{Tasks, TypeRegistry};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const TASK_GENERIC: &str = "generic";
pub const TASK_TRACKING: &str = "tracking";

/// Decoded task-category document.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskDescription {
    Generic(GenericTask),
    Tracking(TrackingTask),
}

impl TaskDescription {
    pub fn identifier(&self) -> &str {
        match self {
            Self::Generic(task) => &task.identifier,
            Self::Tracking(task) => &task.identifier,
        }
    }
}

/// Task whose steps are interpreted outside this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericTask {
    pub identifier: String,
    pub schema_identifier: Option<String>,
    pub steps: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenericTaskFields {
    #[serde(default)]
    task_identifier: Option<String>,
    #[serde(default)]
    identifier: Option<String>,
    #[serde(default)]
    schema_identifier: Option<String>,
    #[serde(default)]
    steps: Vec<Value>,
}

impl GenericTask {
    fn decode(document: &Value) -> DecodeResult<Self> {
        let fields: GenericTaskFields = decode_fields(document)?;
        Ok(Self {
            identifier: fields
                .task_identifier
                .or(fields.identifier)
                .unwrap_or_default(),
            schema_identifier: fields.schema_identifier,
            steps: fields.steps,
        })
    }
}

/// Something a participant can repeatedly log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedItem {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl TrackedItem {
    pub fn new(identifier: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            text: Some(text.into()),
            detail: None,
        }
    }
}

/// Ordered catalog of tracked items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackedItemCatalog {
    items: Vec<TrackedItem>,
}

impl TrackedItemCatalog {
    pub fn new(items: Vec<TrackedItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[TrackedItem] {
        &self.items
    }

    pub fn get(&self, identifier: &str) -> Option<&TrackedItem> {
        self.items.iter().find(|item| item.identifier == identifier)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Task logging occurrences of catalog items.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingTask {
    #[serde(alias = "taskIdentifier")]
    pub identifier: String,
    #[serde(default)]
    pub items: TrackedItemCatalog,
}

pub(crate) fn register_standard(registry: &mut TypeRegistry) {
    registry.register::<Tasks, _>(TASK_GENERIC, |_, document| {
        GenericTask::decode(document).map(TaskDescription::Generic)
    });
    registry.register::<Tasks, _>(TASK_TRACKING, |_, document| {
        decode_fields::<TrackingTask>(document).map(TaskDescription::Tracking)
    });
}

#[cfg(test)]
mod tests {
    use super::{TrackedItem, TrackedItemCatalog};

    #[test]
    fn catalog_lookup_by_identifier() {
        let catalog = TrackedItemCatalog::new(vec![
            TrackedItem::new("pillA", "Pill A"),
            TrackedItem::new("pillB", "Pill B"),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.get("pillB").and_then(|item| item.text.as_deref()),
            Some("Pill B")
        );
        assert!(catalog.get("pillC").is_none());
    }

    #[test]
    fn catalog_decodes_from_plain_array() {
        let catalog: TrackedItemCatalog = serde_json::from_value(serde_json::json!([
            { "identifier": "walk", "text": "Walk", "detail": "30 minutes" }
        ]))
        .unwrap();
        assert_eq!(catalog.items()[0].detail.as_deref(), Some("30 minutes"));
    }
}
