//! Logging results and their document encoding.

pub mod answer;
pub mod tracked;

use thiserror::Error;

pub type EncodeResult<T> = Result<T, EncodeError>;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("result `{identifier}` in entry `{entry}` does not carry an answer")]
    NotAnAnswerResult { entry: String, identifier: String },
    #[error("failed to render document: {0}")]
    Json(#[from] serde_json::Error),
}
