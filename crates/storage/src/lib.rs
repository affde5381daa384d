#![forbid(unsafe_code)]

pub mod json;
pub mod repository;

pub use json::JsonQuestionBank;
pub use repository::{InMemoryQuestionBank, QuestionBankRepository, StorageError};
