//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose decode, filter and logging flows as JSON-in/struct-out calls.
//! - Keep error semantics simple: `ok` flag plus a human-readable message.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - All calls are synchronous, CPU-bound and perform no I/O beyond logging.
//! - Logging collections live in a process-level session map; the host never
//!   round-trips collection JSON back into the core.

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, OnceLock};
use studykit_core::{
    core_version as core_version_inner, init_core as init_core_inner, ping as ping_inner, Answer,
    AnswerResult, CoreConfig, Decoded, Factory, InMemoryItemStore, LoggingResultCollection,
    Membership, ProfileDataSource, TaskDescription,
};

/// Open logging collections keyed by tracking task identifier.
static LOGGING_SESSIONS: OnceLock<Mutex<BTreeMap<String, LoggingResultCollection>>> =
    OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Runs the core initialization phase from a JSON config.
///
/// # FFI contract
/// - Sync call; may create the log directory on first use.
/// - Repeating the same config is a no-op; a different log level or
///   directory is rejected.
/// - Never panics; returns an empty string on success and an error message
///   on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_core(config_json: String) -> String {
    let result = CoreConfig::from_json_str(&config_json).and_then(|config| init_core_inner(&config));
    match result {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One rendered profile row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRowView {
    pub title: Option<String>,
    pub detail: Option<String>,
    pub editable: bool,
    pub on_selected: String,
}

/// One rendered profile section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSectionView {
    pub title: Option<String>,
    pub icon: Option<String>,
    pub rows: Vec<ProfileRowView>,
}

/// Response envelope for profile rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileResponse {
    pub ok: bool,
    pub sections: Vec<ProfileSectionView>,
    pub message: String,
}

impl ProfileResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            sections: vec![],
            message: message.into(),
        }
    }
}

/// Decodes a profile data source and renders its visible rows.
///
/// Input semantics:
/// - `data_source_json`: category-tagged `profileDataSource` document.
/// - `data_groups`: current cohort membership of the participant.
/// - `values_json`: object of current profile values by key.
/// - `readonly_keys`: keys the host reports as read-only.
///
/// # FFI contract
/// - Sync call, non-blocking; holds no state between calls.
/// - Never panics.
/// - Returns `ok=false` with the decode error message on malformed input.
#[flutter_rust_bridge::frb(sync)]
pub fn render_profile(
    data_source_json: String,
    data_groups: Vec<String>,
    values_json: String,
    readonly_keys: Vec<String>,
) -> ProfileResponse {
    let source = match decode_data_source(&data_source_json) {
        Ok(source) => source,
        Err(message) => return ProfileResponse::failure(message),
    };
    let store = match build_store(&values_json, readonly_keys) {
        Ok(store) => store,
        Err(message) => return ProfileResponse::failure(message),
    };
    let membership: Membership = data_groups.into_iter().collect();

    let sections = source
        .sections()
        .iter()
        .map(|section| ProfileSectionView {
            title: section.title.clone(),
            icon: section.icon.clone(),
            rows: section
                .items(&membership)
                .into_iter()
                .map(|item| ProfileRowView {
                    title: item.title().map(str::to_string),
                    detail: item.detail(&store),
                    editable: item.is_editable(&store),
                    on_selected: item.on_selected(&store).as_str().to_string(),
                })
                .collect(),
        })
        .collect();

    ProfileResponse {
        ok: true,
        sections,
        message: "ok".to_string(),
    }
}

/// Response envelope for logging collection calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingResponse {
    pub ok: bool,
    /// Encoded collection document after the call.
    pub collection_json: Option<String>,
    pub message: String,
}

impl LoggingResponse {
    fn from_collection(collection: &LoggingResultCollection) -> Self {
        match collection.to_json_string() {
            Ok(json) => Self {
                ok: true,
                collection_json: Some(json),
                message: "ok".to_string(),
            },
            Err(err) => Self::failure(err.to_string()),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            collection_json: None,
            message: message.into(),
        }
    }
}

/// Applies a selection of tracked items to the held session for the task.
///
/// The first call for a tracking task opens its session; later calls reuse
/// the held entries, so logged dates and sub-answers survive reselection.
///
/// # FFI contract
/// - Sync call, non-blocking; no I/O beyond logging.
/// - Never panics.
/// - Returns the encoded collection, or `ok=false` with the decode error.
#[flutter_rust_bridge::frb(sync)]
pub fn select_tracked_items(tracking_task_json: String, selected: Vec<String>) -> LoggingResponse {
    let task = match Factory::global().decode_category_slice(tracking_task_json.as_bytes()) {
        Ok((_, Decoded::Task(TaskDescription::Tracking(task)))) => task,
        Ok((category, _)) => {
            return LoggingResponse::failure(format!(
                "expected tracking task document, got `{category}`"
            ))
        }
        Err(err) => return LoggingResponse::failure(err.to_string()),
    };
    let mut sessions = match lock_sessions() {
        Ok(sessions) => sessions,
        Err(message) => return LoggingResponse::failure(message),
    };
    let collection = sessions
        .entry(task.identifier.clone())
        .or_insert_with(|| LoggingResultCollection::new(task.identifier.clone()));
    collection.update_selected(selected.as_slice(), &task.items);
    LoggingResponse::from_collection(collection)
}

/// Marks one entry of a held session as logged at `logged_at_ms`.
///
/// `logged_at_ms` is Unix epoch milliseconds. An identifier that is not
/// selected is ignored and the collection is returned unchanged.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics.
/// - Fails when no session is open for `task_identifier` or the timestamp is
///   out of range.
#[flutter_rust_bridge::frb(sync)]
pub fn mark_logged(task_identifier: String, identifier: String, logged_at_ms: i64) -> LoggingResponse {
    let Some(timestamp) = DateTime::<Utc>::from_timestamp_millis(logged_at_ms) else {
        return LoggingResponse::failure(format!("timestamp out of range: {logged_at_ms}"));
    };
    with_session(&task_identifier, |collection| {
        collection.set_logged(&identifier, timestamp);
        LoggingResponse::from_collection(collection)
    })
}

/// Appends a typed sub-answer to one entry of a held session.
///
/// Input semantics:
/// - `answer_type`: one of `boolean|numeric|text|date|choice`.
/// - `value_json`: JSON value for the answer; `null` records an empty
///   answer. Dates accept an RFC 3339 string or epoch milliseconds. A
///   scalar choice is treated as a one-element selection.
///
/// An answer with the same identifier replaces the earlier one.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics.
/// - Fails on unknown sessions, unselected entries, unsupported answer
///   types and values that do not fit the declared type.
#[flutter_rust_bridge::frb(sync)]
pub fn append_answer(
    task_identifier: String,
    entry_identifier: String,
    answer_identifier: String,
    answer_type: String,
    value_json: String,
) -> LoggingResponse {
    let answer = match parse_answer(&answer_type, &value_json) {
        Ok(answer) => answer,
        Err(message) => return LoggingResponse::failure(message),
    };
    with_session(&task_identifier, |collection| {
        let result = AnswerResult::new(answer_identifier, answer);
        if collection.append_result(&entry_identifier, result) {
            LoggingResponse::from_collection(collection)
        } else {
            LoggingResponse::failure(format!("entry `{entry_identifier}` is not selected"))
        }
    })
}

/// Returns the current document of a held session.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics.
/// - Fails when no session is open for `task_identifier`.
#[flutter_rust_bridge::frb(sync)]
pub fn logging_session_json(task_identifier: String) -> LoggingResponse {
    with_session(&task_identifier, |collection| {
        LoggingResponse::from_collection(collection)
    })
}

/// Closes a held session and returns its final document.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics.
/// - Fails when no session is open for `task_identifier`; the session is
///   released even if encoding fails.
#[flutter_rust_bridge::frb(sync)]
pub fn end_logging_session(task_identifier: String) -> LoggingResponse {
    let mut sessions = match lock_sessions() {
        Ok(sessions) => sessions,
        Err(message) => return LoggingResponse::failure(message),
    };
    match sessions.remove(&task_identifier) {
        Some(collection) => {
            info!(
                "event=end_logging_session module=ffi status=ok entries={}",
                collection.len()
            );
            LoggingResponse::from_collection(&collection)
        }
        None => LoggingResponse::failure(no_session_message(&task_identifier)),
    }
}

type Sessions = BTreeMap<String, LoggingResultCollection>;

fn lock_sessions() -> Result<MutexGuard<'static, Sessions>, String> {
    LOGGING_SESSIONS
        .get_or_init(|| Mutex::new(BTreeMap::new()))
        .lock()
        .map_err(|_| {
            error!("event=logging_session module=ffi status=error reason=poisoned");
            "logging session store is unavailable".to_string()
        })
}

fn with_session(
    task_identifier: &str,
    apply: impl FnOnce(&mut LoggingResultCollection) -> LoggingResponse,
) -> LoggingResponse {
    let mut sessions = match lock_sessions() {
        Ok(sessions) => sessions,
        Err(message) => return LoggingResponse::failure(message),
    };
    match sessions.get_mut(task_identifier) {
        Some(collection) => apply(collection),
        None => LoggingResponse::failure(no_session_message(task_identifier)),
    }
}

fn no_session_message(task_identifier: &str) -> String {
    format!("no logging session for task `{task_identifier}`")
}

fn parse_answer(answer_type: &str, value_json: &str) -> Result<Answer, String> {
    let value: Value =
        serde_json::from_str(value_json).map_err(|err| format!("invalid answer value: {err}"))?;
    let mismatch = || format!("value {value} does not fit answer type `{answer_type}`");
    match answer_type.trim().to_ascii_lowercase().as_str() {
        "boolean" => match &value {
            Value::Null => Ok(Answer::Boolean(None)),
            Value::Bool(flag) => Ok(Answer::Boolean(Some(*flag))),
            _ => Err(mismatch()),
        },
        "numeric" => match &value {
            Value::Null => Ok(Answer::Numeric(None)),
            Value::Number(number) => number
                .as_f64()
                .map(|n| Answer::Numeric(Some(n)))
                .ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
        "text" => match &value {
            Value::Null => Ok(Answer::Text(None)),
            Value::String(text) => Ok(Answer::Text(Some(text.clone()))),
            _ => Err(mismatch()),
        },
        "date" => match &value {
            Value::Null => Ok(Answer::Date(None)),
            Value::String(text) => DateTime::parse_from_rfc3339(text)
                .map(|date| Answer::Date(Some(date.with_timezone(&Utc))))
                .map_err(|_| mismatch()),
            Value::Number(number) => number
                .as_i64()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .map(|date| Answer::Date(Some(date)))
                .ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
        "choice" => match &value {
            Value::Null => Ok(Answer::Choice(vec![])),
            Value::Array(values) => Ok(Answer::Choice(values.clone())),
            other => Ok(Answer::Choice(vec![other.clone()])),
        },
        other => {
            warn!("event=append_answer module=ffi status=error reason=unsupported_type answer_type={other}");
            Err(format!("unsupported answer type `{answer_type}`"))
        }
    }
}

fn decode_data_source(raw: &str) -> Result<ProfileDataSource, String> {
    match Factory::global().decode_category_slice(raw.as_bytes()) {
        Ok((_, Decoded::ProfileDataSource(source))) => Ok(source),
        Ok((category, _)) => {
            warn!("event=render_profile module=ffi status=error reason=wrong_category category={category}");
            Err(format!("expected profileDataSource document, got `{category}`"))
        }
        Err(err) => Err(err.to_string()),
    }
}

fn build_store(values_json: &str, readonly_keys: Vec<String>) -> Result<InMemoryItemStore, String> {
    let values: serde_json::Map<String, Value> = if values_json.trim().is_empty() {
        serde_json::Map::new()
    } else {
        serde_json::from_str(values_json).map_err(|err| format!("invalid values: {err}"))?
    };
    let mut store = InMemoryItemStore::new();
    for (key, value) in values {
        store.force_value(key, value);
    }
    for key in readonly_keys {
        store.set_readonly(key, true);
    }
    Ok(store)
}
