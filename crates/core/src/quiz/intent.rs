use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::QuestionId;
use crate::quiz::session::QuizSession;

/// Synchronous user intents, replayable against a session.
///
/// Grading is not an intent here: it spans an async grader call and goes
/// through `begin_grading` / `commit_grading` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizIntent {
    SelectOption {
        question_id: QuestionId,
        option: usize,
    },
    Next,
    Previous,
    Finish,
}

impl QuizSession {
    /// Pure transition: consume the session, apply `intent`, return the result.
    #[must_use]
    pub fn apply(mut self, intent: QuizIntent, now: DateTime<Utc>) -> Self {
        match intent {
            QuizIntent::SelectOption {
                question_id,
                option,
            } => {
                self.select_option(question_id, option);
            }
            QuizIntent::Next => {
                self.next(now);
            }
            QuizIntent::Previous => {
                self.previous();
            }
            QuizIntent::Finish => {
                self.finish(now);
            }
        }
        self
    }

    /// Fold a recorded intent log over a session.
    #[must_use]
    pub fn replay(self, intents: impl IntoIterator<Item = QuizIntent>, now: DateTime<Utc>) -> Self {
        intents
            .into_iter()
            .fold(self, |session, intent| session.apply(intent, now))
    }
}
