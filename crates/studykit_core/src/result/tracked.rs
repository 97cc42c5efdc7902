//! Logging results for tracked items.
//!
//! # Responsibility
//! - Keep one entry per selected tracked item, in selection order.
//! - Record logging timestamps and typed sub-results from live interaction.
//! - Encode entries with one key per sub-result, shaped by its answer type.
//!
//! # Invariants
//! - Entry identifiers are unique within a collection.
//! - `update_selected` is idempotent and never touches existing entries.
//! - Decoding reads entry scalars only; sub-results come from `append_result`.
//! - Encoding always writes `loggedDate`, as `null` until logged.

use crate::factory::error::{DecodeError, DecodeResult};
use crate::result::answer::{encode_timestamp, StepResult};
use crate::result::{EncodeError, EncodeResult};
use crate::task::{TrackedItem, TrackedItemCatalog};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

const KEY_IDENTIFIER: &str = "identifier";
const KEY_TEXT: &str = "text";
const KEY_DETAIL: &str = "detail";
const KEY_LOGGED_DATE: &str = "loggedDate";
const KEY_TASK_RUN_UUID: &str = "taskRunUUID";
const KEY_ITEMS: &str = "items";

const ENTRY_KEYS: &[&str] = &[KEY_IDENTIFIER, KEY_TEXT, KEY_DETAIL, KEY_LOGGED_DATE];

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryFields {
    identifier: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    logged_date: Option<DateTime<Utc>>,
}

/// Per-item record of whether and when it was logged.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "EntryFields")]
pub struct LoggingResultEntry {
    pub identifier: String,
    pub text: Option<String>,
    pub detail: Option<String>,
    logged_at: Option<DateTime<Utc>>,
    results: Vec<StepResult>,
}

impl From<EntryFields> for LoggingResultEntry {
    fn from(fields: EntryFields) -> Self {
        Self {
            identifier: fields.identifier,
            text: fields.text,
            detail: fields.detail,
            logged_at: fields.logged_date,
            results: Vec::new(),
        }
    }
}

impl LoggingResultEntry {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            text: None,
            detail: None,
            logged_at: None,
            results: Vec::new(),
        }
    }

    pub fn from_tracked_item(item: &TrackedItem) -> Self {
        Self {
            text: item.text.clone(),
            detail: item.detail.clone(),
            ..Self::new(item.identifier.clone())
        }
    }

    pub fn logged_at(&self) -> Option<DateTime<Utc>> {
        self.logged_at
    }

    /// Records the logging time; a later call overwrites an earlier one.
    pub fn set_logged(&mut self, timestamp: DateTime<Utc>) {
        if let Some(previous) = self.logged_at {
            debug!(
                "event=set_logged module=result status=ok overwrite=true identifier={} previous={}",
                self.identifier,
                encode_timestamp(&previous)
            );
        }
        self.logged_at = Some(timestamp);
    }

    /// Held sub-results in append order.
    pub fn results(&self) -> &[StepResult] {
        &self.results
    }

    pub fn result(&self, identifier: &str) -> Option<&StepResult> {
        self.results
            .iter()
            .find(|result| result.identifier() == identifier)
    }

    /// Adds a sub-result, replacing one with the same identifier in place.
    pub fn append_result(&mut self, result: impl Into<StepResult>) {
        let result = result.into();
        match self
            .results
            .iter_mut()
            .find(|held| held.identifier() == result.identifier())
        {
            Some(held) => *held = result,
            None => self.results.push(result),
        }
    }

    pub fn encode(&self) -> EncodeResult<Map<String, Value>> {
        let mut object = Map::new();
        object.insert(
            KEY_IDENTIFIER.to_string(),
            Value::String(self.identifier.clone()),
        );
        if let Some(text) = &self.text {
            object.insert(KEY_TEXT.to_string(), Value::String(text.clone()));
        }
        if let Some(detail) = &self.detail {
            object.insert(KEY_DETAIL.to_string(), Value::String(detail.clone()));
        }
        object.insert(
            KEY_LOGGED_DATE.to_string(),
            self.logged_at
                .as_ref()
                .map_or(Value::Null, |date| Value::String(encode_timestamp(date))),
        );

        for result in &self.results {
            let answer = result
                .as_answer()
                .ok_or_else(|| EncodeError::NotAnAnswerResult {
                    entry: self.identifier.clone(),
                    identifier: result.identifier().to_string(),
                })?;
            if ENTRY_KEYS.contains(&answer.identifier.as_str()) {
                warn!(
                    "event=encode_entry module=result status=skip reason=key_collision identifier={} key={}",
                    self.identifier, answer.identifier
                );
                continue;
            }
            if let Some(value) = answer.answer.encode() {
                object.insert(answer.identifier.clone(), value);
            }
        }
        Ok(object)
    }
}

impl Serialize for LoggingResultEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.encode() {
            Ok(object) => object.serialize(serializer),
            Err(err) => Err(serde::ser::Error::custom(err)),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionFields {
    identifier: String,
    #[serde(default, rename = "taskRunUUID")]
    task_run_uuid: Option<Uuid>,
    #[serde(default)]
    items: Vec<LoggingResultEntry>,
}

/// Ordered logging results for one tracking task run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "CollectionFields")]
pub struct LoggingResultCollection {
    pub identifier: String,
    pub task_run_uuid: Uuid,
    entries: Vec<LoggingResultEntry>,
}

impl From<CollectionFields> for LoggingResultCollection {
    fn from(fields: CollectionFields) -> Self {
        let mut entries: Vec<LoggingResultEntry> = Vec::with_capacity(fields.items.len());
        for entry in fields.items {
            if entries
                .iter()
                .any(|held| held.identifier == entry.identifier)
            {
                warn!(
                    "event=decode_collection module=result status=skip reason=duplicate identifier={}",
                    entry.identifier
                );
                continue;
            }
            entries.push(entry);
        }
        Self {
            identifier: fields.identifier,
            task_run_uuid: fields.task_run_uuid.unwrap_or_else(Uuid::new_v4),
            entries,
        }
    }
}

impl LoggingResultCollection {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            task_run_uuid: Uuid::new_v4(),
            entries: Vec::new(),
        }
    }

    /// Creates a collection with one fresh entry per catalog item.
    pub fn seeded(identifier: impl Into<String>, catalog: &TrackedItemCatalog) -> Self {
        let mut collection = Self::new(identifier);
        let selected: Vec<&str> = catalog
            .items()
            .iter()
            .map(|item| item.identifier.as_str())
            .collect();
        collection.update_selected(selected.as_slice(), catalog);
        collection
    }

    pub fn decode(document: &Value) -> DecodeResult<Self> {
        serde_path_to_error::deserialize(document).map_err(DecodeError::from_path_error)
    }

    pub fn decode_slice(bytes: &[u8]) -> DecodeResult<Self> {
        let document: Value = serde_json::from_slice(bytes).map_err(DecodeError::Syntax)?;
        Self::decode(&document)
    }

    pub fn entries(&self) -> &[LoggingResultEntry] {
        &self.entries
    }

    pub fn entry(&self, identifier: &str) -> Option<&LoggingResultEntry> {
        self.entries
            .iter()
            .find(|entry| entry.identifier == identifier)
    }

    fn entry_mut(&mut self, identifier: &str) -> Option<&mut LoggingResultEntry> {
        self.entries
            .iter_mut()
            .find(|entry| entry.identifier == identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rebuilds entries in the order of `selected`.
    ///
    /// Existing entries are reused as-is; missing ones are created from
    /// `catalog`. Entries not in `selected` are dropped.
    pub fn update_selected<S: AsRef<str>>(&mut self, selected: &[S], catalog: &TrackedItemCatalog) {
        let mut previous = std::mem::take(&mut self.entries);
        let mut next: Vec<LoggingResultEntry> = Vec::with_capacity(selected.len());
        for identifier in selected {
            let identifier = identifier.as_ref();
            if next.iter().any(|entry| entry.identifier == identifier) {
                continue;
            }
            let entry = match previous
                .iter()
                .position(|entry| entry.identifier == identifier)
            {
                Some(index) => previous.remove(index),
                None => match catalog.get(identifier) {
                    Some(item) => LoggingResultEntry::from_tracked_item(item),
                    None => {
                        warn!(
                            "event=update_selected module=result status=ok reason=not_in_catalog identifier={identifier}"
                        );
                        LoggingResultEntry::new(identifier)
                    }
                },
            };
            next.push(entry);
        }
        self.entries = next;
    }

    /// Records `timestamp` on the entry; unknown identifiers are ignored.
    pub fn set_logged(&mut self, identifier: &str, timestamp: DateTime<Utc>) {
        match self.entry_mut(identifier) {
            Some(entry) => entry.set_logged(timestamp),
            None => debug!(
                "event=set_logged module=result status=skip reason=not_found identifier={identifier}"
            ),
        }
    }

    /// Appends a sub-result to an entry; returns `false` when it is absent.
    pub fn append_result(&mut self, identifier: &str, result: impl Into<StepResult>) -> bool {
        match self.entry_mut(identifier) {
            Some(entry) => {
                entry.append_result(result);
                true
            }
            None => false,
        }
    }

    pub fn encode(&self) -> EncodeResult<Value> {
        let mut items = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            items.push(Value::Object(entry.encode()?));
        }
        let mut object = Map::new();
        object.insert(
            KEY_IDENTIFIER.to_string(),
            Value::String(self.identifier.clone()),
        );
        object.insert(
            KEY_TASK_RUN_UUID.to_string(),
            Value::String(self.task_run_uuid.to_string()),
        );
        object.insert(KEY_ITEMS.to_string(), Value::Array(items));
        Ok(Value::Object(object))
    }

    pub fn to_json_string(&self) -> EncodeResult<String> {
        Ok(serde_json::to_string(&self.encode()?)?)
    }
}

impl Serialize for LoggingResultCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.encode() {
            Ok(document) => document.serialize(serializer),
            Err(err) => Err(serde::ser::Error::custom(err)),
        }
    }
}
