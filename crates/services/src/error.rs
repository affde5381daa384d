//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{QuestionId, Subject};
use storage::StorageError;

/// Errors emitted by graders.
///
/// Every variant is recoverable: the session is left as it was before the
/// request and the caller may retry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GradingError {
    #[error("question {0} has no answer key and no AI grader is configured")]
    MissingAnswerKey(QuestionId),
    #[error("grader returned an empty response")]
    EmptyResponse,
    #[error("grader request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("grader returned a malformed verdict: {0}")]
    Malformed(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("{subject} has no part {part}")]
    UnknownPart { subject: Subject, part: usize },
    #[error(transparent)]
    Storage(#[from] StorageError),
}
