use async_trait::async_trait;
use quiz_core::model::{Analysis, Question};

use super::Grader;
use crate::error::GradingError;

pub(crate) const STATIC_EXPLANATION: &str = "Answer verified against the official answer key.";

/// Grades against the question's own answer key. Synchronous in practice.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticGrader;

#[async_trait]
impl Grader for StaticGrader {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn grade(&self, question: &Question, _selected: usize) -> Result<Analysis, GradingError> {
        let correct = question
            .correct_option()
            .ok_or(GradingError::MissingAnswerKey(question.id()))?;
        Ok(Analysis::new(correct, STATIC_EXPLANATION))
    }
}
