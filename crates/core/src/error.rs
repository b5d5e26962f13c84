use thiserror::Error;

use crate::matching::MatchingError;
use crate::model::{ProfileError, QuestionError};

/// Any validation failure raised by the domain layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Matching(#[from] MatchingError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
}
