mod active;
mod plan;
mod service;
mod timer;
mod view;

pub use active::ActiveQuiz;
pub use plan::{SessionPlan, SessionPlanBuilder};
pub use service::{QuizLoopService, RestartOutcome};
pub use timer::ExamTimer;
pub use view::{NextAction, QuizView, ResultsView, format_elapsed};
