use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {id} has empty text")]
    EmptyText { id: QuestionId },

    #[error("question {id} has no options")]
    NoOptions { id: QuestionId },

    #[error("question {id}: correct option {index} is outside 0..{len}")]
    CorrectOptionOutOfRange {
        id: QuestionId,
        index: usize,
        len: usize,
    },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Immutable multiple-choice question.
///
/// `correct_option`, when present, is the authoritative answer key entry and is
/// always a valid index into `options`. Deserialization goes through
/// `Question::new`, so the same checks apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionFields")]
pub struct Question {
    id: QuestionId,
    text: String,
    options: Vec<String>,
    correct_option: Option<usize>,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text is blank, there are no options,
    /// or the correct option does not index into `options`.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        options: Vec<String>,
        correct_option: Option<usize>,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText { id });
        }
        if options.is_empty() {
            return Err(QuestionError::NoOptions { id });
        }
        if let Some(index) = correct_option.filter(|&index| index >= options.len()) {
            return Err(QuestionError::CorrectOptionOutOfRange {
                id,
                index,
                len: options.len(),
            });
        }

        Ok(Self {
            id,
            text,
            options,
            correct_option,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn has_option(&self, index: usize) -> bool {
        index < self.options.len()
    }

    /// Authoritative correct option, if the bank carries an answer key for it.
    #[must_use]
    pub fn correct_option(&self) -> Option<usize> {
        self.correct_option
    }

    /// Returns the same question with a different id.
    ///
    /// Used when merging banks whose id ranges overlap.
    #[must_use]
    pub fn with_id(mut self, id: QuestionId) -> Self {
        self.id = id;
        self
    }
}

#[derive(Deserialize)]
struct QuestionFields {
    id: QuestionId,
    text: String,
    options: Vec<String>,
    #[serde(default)]
    correct_option: Option<usize>,
}

impl TryFrom<QuestionFields> for Question {
    type Error = QuestionError;

    fn try_from(fields: QuestionFields) -> Result<Self, Self::Error> {
        Question::new(fields.id, fields.text, fields.options, fields.correct_option)
    }
}

//
// ─── ANSWER KEY ────────────────────────────────────────────────────────────────
//

/// Mapping from question id to the correct option index, applied at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerKey {
    entries: HashMap<QuestionId, usize>,
}

impl AnswerKey {
    #[must_use]
    pub fn get(&self, id: QuestionId) -> Option<usize> {
        self.entries.get(&id).copied()
    }

    /// Assign key entries to the given questions.
    ///
    /// An entry that does not fit the question's option list is ignored and the
    /// question keeps whatever key it already had.
    #[must_use]
    pub fn apply(&self, questions: Vec<Question>) -> Vec<Question> {
        questions
            .into_iter()
            .map(|mut question| {
                if let Some(index) = self.get(question.id).filter(|&i| question.has_option(i)) {
                    question.correct_option = Some(index);
                }
                question
            })
            .collect()
    }
}

impl FromIterator<(QuestionId, usize)> for AnswerKey {
    fn from_iter<T: IntoIterator<Item = (QuestionId, usize)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

//
// ─── ANALYSIS ──────────────────────────────────────────────────────────────────
//

/// Grader verdict for a question: the correct option and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub correct_option: usize,
    pub explanation: String,
}

impl Analysis {
    #[must_use]
    pub fn new(correct_option: usize, explanation: impl Into<String>) -> Self {
        Self {
            correct_option,
            explanation: explanation.into(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
