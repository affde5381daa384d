//! Quiz progression engine.
//!
//! A `QuizSession` is advanced by user intents. Practice sessions grade each
//! answer and loop back over mistakes at the end of every batch; exam sessions
//! run straight through and are scored once on finish.

mod intent;
mod progression;
mod scoring;
mod session;

pub use intent::QuizIntent;
pub use progression::Transition;
pub use scoring::{percentage, ExamResult, PracticeStats};
pub use session::{GradingCommit, GradingTicket, QuizSession};

/// Practice positions per batch; mistakes are reviewed at each batch end.
pub const BATCH_SIZE: usize = 15;

/// Exam sessions take this many questions from the shuffled bank.
pub const EXAM_QUESTION_COUNT: usize = 40;

/// Coarse position in the progression state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    Normal,
    Reviewing,
    Finished,
}
