use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::{Question, QuizMode, Subject};
use quiz_core::quiz::QuizSession;
use rand::Rng;
use storage::QuestionBankRepository;
use tracing::{info, warn};

use super::active::ActiveQuiz;
use super::plan::SessionPlanBuilder;
use crate::error::SessionError;
use crate::grading::Grader;

/// What a restart request resolved to.
pub enum RestartOutcome {
    /// The quiz had already finished; show mode selection instead.
    ReturnToMenu,
    Restarted(ActiveQuiz),
}

/// Orchestrates quiz start and restart over a question bank and a grader.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    bank: Arc<dyn QuestionBankRepository>,
    grader: Arc<dyn Grader>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(clock: Clock, bank: Arc<dyn QuestionBankRepository>, grader: Arc<dyn Grader>) -> Self {
        Self {
            clock,
            bank,
            grader,
        }
    }

    /// Start a quiz over `subject`, optionally limited to one zero-based part.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the bank cannot be loaded or the part does
    /// not exist.
    pub async fn start(
        &self,
        mode: QuizMode,
        subject: Subject,
        part: Option<usize>,
    ) -> Result<ActiveQuiz, SessionError> {
        let source = self.bank.load_subject(subject).await?;
        let mut rng = rand::rng();
        self.start_with(mode, subject, part, source, &mut rng)
    }

    /// Like `start`, with a caller-supplied random source.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the bank cannot be loaded or the part does
    /// not exist.
    pub async fn start_seeded<R: Rng + Send>(
        &self,
        mode: QuizMode,
        subject: Subject,
        part: Option<usize>,
        rng: &mut R,
    ) -> Result<ActiveQuiz, SessionError> {
        let source = self.bank.load_subject(subject).await?;
        self.start_with(mode, subject, part, source, rng)
    }

    /// Replace `current` with a fresh quiz, defaulting to practice.
    ///
    /// A finished quiz is not restarted in place: the caller gets
    /// `RestartOutcome::ReturnToMenu`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the new bank cannot be loaded.
    pub async fn restart(
        &self,
        current: &ActiveQuiz,
        subject: Subject,
        mode: Option<QuizMode>,
    ) -> Result<RestartOutcome, SessionError> {
        if current.is_finished() {
            info!(subject = %current.subject(), "finished quiz, returning to menu");
            return Ok(RestartOutcome::ReturnToMenu);
        }
        let quiz = self.start(mode.unwrap_or_default(), subject, None).await?;
        Ok(RestartOutcome::Restarted(quiz))
    }

    fn start_with<R: Rng>(
        &self,
        mode: QuizMode,
        subject: Subject,
        part: Option<usize>,
        source: Vec<Question>,
        rng: &mut R,
    ) -> Result<ActiveQuiz, SessionError> {
        let mut builder = SessionPlanBuilder::new(mode);
        if let Some(part) = part {
            builder = builder.with_part(subject, part);
        }
        let plan = builder.build(source, rng)?;
        if plan.is_empty() {
            warn!(%subject, %mode, part = ?part, "quiz has no questions");
        }

        info!(
            %subject,
            %mode,
            part = ?part,
            questions = plan.total(),
            available = plan.source_total,
            grader = self.grader.name(),
            "quiz started"
        );

        let session = QuizSession::new(mode, plan.questions, self.clock.now());
        Ok(ActiveQuiz::new(subject, session, self.clock, Arc::clone(&self.grader)))
    }
}
