//! Typed sub-results collected while logging an item.
//!
//! Each answer kind owns its encoding rule. An answer with no usable value
//! encodes to `None` and its key is left out of the enclosing document.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Number, Value};

/// Declared answer type of a sub-result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerType {
    Boolean,
    Numeric,
    Text,
    Date,
    Choice,
    Compound,
}

/// Answer value tagged with its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Boolean(Option<bool>),
    Numeric(Option<f64>),
    Text(Option<String>),
    Date(Option<DateTime<Utc>>),
    Choice(Vec<Value>),
    Compound(Vec<AnswerResult>),
}

impl Answer {
    pub fn answer_type(&self) -> AnswerType {
        match self {
            Self::Boolean(_) => AnswerType::Boolean,
            Self::Numeric(_) => AnswerType::Numeric,
            Self::Text(_) => AnswerType::Text,
            Self::Date(_) => AnswerType::Date,
            Self::Choice(_) => AnswerType::Choice,
            Self::Compound(_) => AnswerType::Compound,
        }
    }

    /// Renders the value under its declared type.
    pub fn encode(&self) -> Option<Value> {
        match self {
            Self::Boolean(value) => value.map(Value::Bool),
            Self::Numeric(value) => value.and_then(Number::from_f64).map(Value::Number),
            Self::Text(value) => value.clone().map(Value::String),
            Self::Date(value) => value.as_ref().map(|date| Value::String(encode_timestamp(date))),
            Self::Choice(values) if values.is_empty() => None,
            Self::Choice(values) => Some(Value::Array(values.clone())),
            Self::Compound(children) => {
                let mut object = Map::new();
                for child in children {
                    if let Some(value) = child.answer.encode() {
                        object.insert(child.identifier.clone(), value);
                    }
                }
                (!object.is_empty()).then_some(Value::Object(object))
            }
        }
    }
}

/// Sub-result that carries a typed answer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerResult {
    pub identifier: String,
    pub answer: Answer,
}

impl AnswerResult {
    pub fn new(identifier: impl Into<String>, answer: Answer) -> Self {
        Self {
            identifier: identifier.into(),
            answer,
        }
    }
}

/// Any result a logging step can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum StepResult {
    Answer(AnswerResult),
    /// Result without an answer, e.g. an instruction step.
    Plain { identifier: String },
}

impl StepResult {
    pub fn identifier(&self) -> &str {
        match self {
            Self::Answer(result) => &result.identifier,
            Self::Plain { identifier } => identifier,
        }
    }

    pub fn as_answer(&self) -> Option<&AnswerResult> {
        match self {
            Self::Answer(result) => Some(result),
            Self::Plain { .. } => None,
        }
    }
}

impl From<AnswerResult> for StepResult {
    fn from(value: AnswerResult) -> Self {
        Self::Answer(value)
    }
}

/// RFC 3339 with sub-second precision kept, UTC designator `Z`.
pub fn encode_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
