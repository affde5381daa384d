use std::fmt;

use serde::{Deserialize, Serialize};

/// Rules a session runs under. Fixed for the session's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuizMode {
    /// Immediate grading feedback with a mistake-review loop after every batch.
    #[default]
    Practice,
    /// Truncated, ungraded until the end, scored on finish.
    Exam,
}

impl QuizMode {
    #[must_use]
    pub fn is_exam(self) -> bool {
        matches!(self, QuizMode::Exam)
    }
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizMode::Practice => f.write_str("practice"),
            QuizMode::Exam => f.write_str("exam"),
        }
    }
}
