use thiserror::Error;

use crate::model::{QuestionError, SubjectParseError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Subject(#[from] SubjectParseError),
}
