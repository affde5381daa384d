use async_trait::async_trait;
use quiz_core::model::{Question, QuestionId, Subject};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by question bank adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("question bank not found: {0}")]
    NotFound(Subject),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("question id {0} appears more than once in the bank")]
    DuplicateId(QuestionId),

    #[error("invalid question in bank: {0}")]
    Invalid(#[from] quiz_core::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Source of the ordered question list for a subject.
///
/// Implementations return questions in source order with the answer key
/// already applied; shuffling is the session planner's job.
#[async_trait]
pub trait QuestionBankRepository: Send + Sync {
    /// Load every question for `subject`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the subject has no bank, or other
    /// storage errors if the bank cannot be read.
    async fn load_subject(&self, subject: Subject) -> Result<Vec<Question>, StorageError>;
}

/// Reject banks where two questions share an id.
///
/// # Errors
///
/// Returns `StorageError::DuplicateId` with the first repeated id.
pub fn ensure_unique_ids(questions: &[Question]) -> Result<(), StorageError> {
    let mut seen = HashSet::with_capacity(questions.len());
    match questions.iter().map(Question::id).find(|id| !seen.insert(*id)) {
        Some(id) => Err(StorageError::DuplicateId(id)),
        None => Ok(()),
    }
}

/// Psychology followed by culturology, with culturology renumbered to continue
/// after the highest psychology id so the combined ids stay unique.
#[must_use]
pub fn compose_psychocultural(psychology: Vec<Question>, culturology: Vec<Question>) -> Vec<Question> {
    let offset = psychology
        .iter()
        .map(|question| question.id().value())
        .max()
        .unwrap_or(0);

    let mut combined = psychology;
    combined.extend(culturology.into_iter().zip(1_u32..).map(|(question, n)| {
        let id = QuestionId::new(offset.saturating_add(n));
        question.with_id(id)
    }));
    combined
}

/// Simple in-memory bank for tests/dev.
#[derive(Clone, Default)]
pub struct InMemoryQuestionBank {
    banks: Arc<Mutex<HashMap<Subject, Vec<Question>>>>,
}

impl InMemoryQuestionBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the bank stored for `subject`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::DuplicateId` if two questions share an id, or
    /// `StorageError::Connection` if the lock is poisoned.
    pub fn insert(&self, subject: Subject, questions: Vec<Question>) -> Result<(), StorageError> {
        ensure_unique_ids(&questions)?;
        let mut guard = self
            .banks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(subject, questions);
        Ok(())
    }

    fn get(&self, subject: Subject) -> Result<Option<Vec<Question>>, StorageError> {
        let guard = self
            .banks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&subject).cloned())
    }
}

#[async_trait]
impl QuestionBankRepository for InMemoryQuestionBank {
    async fn load_subject(&self, subject: Subject) -> Result<Vec<Question>, StorageError> {
        if let Some(questions) = self.get(subject)? {
            return Ok(questions);
        }
        if subject == Subject::Psychocultural {
            let psychology = self.get(Subject::Psychology)?;
            let culturology = self.get(Subject::Culturology)?;
            if let (Some(psychology), Some(culturology)) = (psychology, culturology) {
                return Ok(compose_psychocultural(psychology, culturology));
            }
        }
        Err(StorageError::NotFound(subject))
    }
}
