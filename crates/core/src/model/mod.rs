mod ids;
mod mode;
mod question;
mod subject;

pub use ids::{QuestionId, SequencePosition};
pub use mode::QuizMode;
pub use question::{Analysis, AnswerKey, Question, QuestionError};
pub use subject::{PartConfig, Subject, SubjectParseError};
