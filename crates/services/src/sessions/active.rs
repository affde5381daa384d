use std::sync::{Arc, Mutex, PoisonError};

use quiz_core::Clock;
use quiz_core::model::{Analysis, QuizMode, Subject};
use quiz_core::quiz::{GradingCommit, QuizSession, Transition};
use tracing::{debug, info, warn};

use super::view::{QuizView, ResultsView};
use crate::error::GradingError;
use crate::grading::Grader;

/// Shared handle to one running quiz.
///
/// Clones refer to the same session. The lock is only held for synchronous
/// engine calls, never across the grader await.
#[derive(Clone)]
pub struct ActiveQuiz {
    subject: Subject,
    clock: Clock,
    grader: Arc<dyn Grader>,
    session: Arc<Mutex<QuizSession>>,
}

impl ActiveQuiz {
    pub(crate) fn new(
        subject: Subject,
        session: QuizSession,
        clock: Clock,
        grader: Arc<dyn Grader>,
    ) -> Self {
        Self {
            subject,
            clock,
            grader,
            session: Arc::new(Mutex::new(session)),
        }
    }

    #[must_use]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    #[must_use]
    pub fn mode(&self) -> QuizMode {
        self.with_session(|session| session.mode())
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.with_session(|session| session.is_finished())
    }

    /// Copy of the current session state.
    #[must_use]
    pub fn snapshot(&self) -> QuizSession {
        self.with_session(|session| session.clone())
    }

    /// Select `option` for the question under the cursor.
    pub fn select_option(&self, option: usize) -> bool {
        self.with_session(|session| {
            let Some(id) = session.current_question().map(|question| question.id()) else {
                return false;
            };
            let accepted = session.select_option(id, option);
            debug!(question = %id, option, accepted, "select option");
            accepted
        })
    }

    /// Grade the current selection.
    ///
    /// Returns `Ok(None)` when grading is not allowed right now (exam mode,
    /// nothing selected, already graded, another request in flight) or when
    /// the cursor moved before the verdict arrived.
    ///
    /// # Errors
    ///
    /// Returns the grader's error. The session keeps no history for the
    /// position and a retry is allowed.
    pub async fn request_grading(&self) -> Result<Option<Analysis>, GradingError> {
        let Some(ticket) = self.with_session(QuizSession::begin_grading) else {
            debug!("grading request ignored");
            return Ok(None);
        };

        match self.grader.grade(ticket.question(), ticket.selected()).await {
            Ok(analysis) => {
                let commit =
                    self.with_session(|session| session.commit_grading(&ticket, analysis.clone()));
                match commit {
                    GradingCommit::Recorded { correct } => {
                        debug!(
                            position = %ticket.position(),
                            correct,
                            grader = self.grader.name(),
                            "grading recorded"
                        );
                        Ok(Some(analysis))
                    }
                    GradingCommit::Stale => {
                        warn!(position = %ticket.position(), "discarding stale grading result");
                        Ok(None)
                    }
                }
            }
            Err(err) => {
                self.with_session(|session| session.abandon_grading(&ticket));
                warn!(
                    position = %ticket.position(),
                    grader = self.grader.name(),
                    error = %err,
                    "grading failed"
                );
                Err(err)
            }
        }
    }

    pub fn next(&self) -> Transition {
        let now = self.clock.now();
        let transition = self.with_session(|session| session.next(now));
        self.log_transition("next", &transition);
        transition
    }

    pub fn previous(&self) -> Transition {
        let transition = self.with_session(QuizSession::previous);
        self.log_transition("previous", &transition);
        transition
    }

    pub fn finish(&self) -> Transition {
        let now = self.clock.now();
        let transition = self.with_session(|session| session.finish(now));
        self.log_transition("finish", &transition);
        transition
    }

    /// Presentation snapshot for the cursor question.
    #[must_use]
    pub fn view(&self) -> QuizView {
        let now = self.clock.now();
        self.with_session(|session| QuizView::from_session(session, self.subject, now))
    }

    /// Summary for a finished quiz.
    #[must_use]
    pub fn results(&self) -> Option<ResultsView> {
        self.with_session(|session| ResultsView::from_session(session, self.subject))
    }

    /// Whole seconds since an exam started, sampled against `clock`.
    /// Practice quizzes report zero.
    pub(crate) fn elapsed_secs(&self, clock: &Clock) -> (u64, bool) {
        self.with_session(|session| {
            let secs = session.started_at().map_or(0, |start| {
                let elapsed = match session.ended_at() {
                    Some(end) => end.signed_duration_since(start),
                    None => clock.elapsed_since(start),
                };
                u64::try_from(elapsed.num_seconds()).unwrap_or(0)
            });
            (secs, session.is_finished())
        })
    }

    fn with_session<T>(&self, f: impl FnOnce(&mut QuizSession) -> T) -> T {
        let mut guard = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    fn log_transition(&self, intent: &'static str, transition: &Transition) {
        match transition {
            Transition::Ignored => debug!(intent, "intent ignored"),
            Transition::Finished => {
                let snapshot = self.snapshot();
                info!(
                    subject = %self.subject,
                    mode = %snapshot.mode(),
                    score = ?snapshot.score(),
                    answered = snapshot.answered_count(),
                    "quiz finished"
                );
            }
            other => debug!(intent, transition = ?other, "quiz transition"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::StaticGrader;
    use quiz_core::model::{Question, QuestionId};
    use quiz_core::time::fixed_clock;

    fn quiz(mode: QuizMode, count: u32) -> ActiveQuiz {
        let questions = (1..=count)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    format!("Q{id}"),
                    vec!["a".into(), "b".into()],
                    Some(1),
                )
                .unwrap()
            })
            .collect();
        let clock = fixed_clock();
        let session = QuizSession::new(mode, questions, clock.now());
        ActiveQuiz::new(Subject::Philosophy, session, clock, Arc::new(StaticGrader))
    }

    #[tokio::test]
    async fn grading_records_history_and_locks_selection() {
        let quiz = quiz(QuizMode::Practice, 3);
        assert!(quiz.select_option(0));

        let analysis = quiz.request_grading().await.unwrap().unwrap();

        assert_eq!(analysis.correct_option, 1);
        let snapshot = quiz.snapshot();
        assert_eq!(snapshot.answer_history().values().copied().collect::<Vec<_>>(), vec![false]);
        assert!(!quiz.select_option(1));
        assert_eq!(quiz.request_grading().await.unwrap(), None);
    }

    #[tokio::test]
    async fn exam_quiz_ignores_grading_requests() {
        let quiz = quiz(QuizMode::Exam, 2);
        quiz.select_option(1);
        assert_eq!(quiz.request_grading().await.unwrap(), None);
        assert!(quiz.snapshot().answer_history().is_empty());
    }

    #[test]
    fn clones_share_one_session() {
        let quiz = quiz(QuizMode::Exam, 2);
        let other = quiz.clone();
        other.select_option(1);
        assert!(matches!(quiz.next(), Transition::Moved { .. }));
        assert_eq!(other.snapshot().cursor().value(), 1);
    }
}
