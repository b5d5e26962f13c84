//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::QuestionId;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the content-retrieval collaborator.
///
/// These never reach the learner: `BankLoader` falls back to the embedded bank.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("content provider is not configured")]
    Disabled,
    #[error("content provider returned no usable questions")]
    EmptyResult,
    #[error("content provider request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by the round controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RoundError {
    /// No question is left to study; the caller should return to the plan view.
    #[error("no questions left to study")]
    PoolExhausted,
    #[error("round already completed")]
    Completed,
    #[error("question {0} is not part of this round")]
    NotInRound(QuestionId),
    #[error("question {0} is not in the bank")]
    UnknownQuestion(QuestionId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services or reading the plan.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
