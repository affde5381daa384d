#![forbid(unsafe_code)]

pub mod error;
pub mod grading;
pub mod sessions;

pub use quiz_core::Clock;

pub use error::{GradingError, SessionError};
pub use grading::{AiGrader, Grader, GraderConfig, StaticGrader, grader_for};
pub use sessions::{
    ActiveQuiz, ExamTimer, NextAction, QuizLoopService, QuizView, RestartOutcome, ResultsView,
    SessionPlan, SessionPlanBuilder, format_elapsed,
};
