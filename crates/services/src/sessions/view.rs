use chrono::{DateTime, Utc};

use quiz_core::model::{Analysis, QuestionId, QuizMode, Subject};
use quiz_core::quiz::{PracticeStats, QuizSession, percentage};

/// Label of the forward button for the cursor question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    NextQuestion,
    FinishExam,
    FinishReview,
}

impl NextAction {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::NextQuestion => "Next Question",
            Self::FinishExam => "Finish Exam",
            Self::FinishReview => "Finish Review",
        }
    }
}

/// Presentation-agnostic snapshot of an unfinished quiz.
///
/// Holds raw values only; the caller decides how to render them.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizView {
    pub subject: Subject,
    pub mode: QuizMode,
    /// Zero-based cursor position.
    pub position: usize,
    pub total: usize,
    /// Percent of the main sequence covered; held at the batch end while reviewing.
    pub progress_percent: u32,
    pub question_id: Option<QuestionId>,
    pub text: String,
    pub options: Vec<String>,
    pub selected: Option<usize>,
    pub analysis: Option<Analysis>,
    pub grading: bool,
    pub reviewing: bool,
    /// Review positions still queued, the current one included.
    pub review_remaining: usize,
    /// Queue length when the review began.
    pub review_total: usize,
    pub next_action: NextAction,
    /// Whether the forward intent would currently be accepted.
    pub can_advance: bool,
    pub can_go_back: bool,
    pub practice_stats: Option<PracticeStats>,
    /// Whole seconds since an exam started.
    pub elapsed_secs: Option<u64>,
    pub finished: bool,
}

impl QuizView {
    #[must_use]
    pub fn from_session(session: &QuizSession, subject: Subject, now: DateTime<Utc>) -> Self {
        let mode = session.mode();
        let total = session.len();
        let position = session.cursor().value();
        let displayed = if session.is_reviewing() {
            session.main_progress_index().value()
        } else {
            position
        };
        let progress_percent = if total == 0 {
            0
        } else {
            percentage(displayed + 1, total)
        };

        let question = session.current_question();
        let next_action = match mode {
            QuizMode::Exam if position + 1 >= total => NextAction::FinishExam,
            QuizMode::Practice if session.is_reviewing() && session.review_queue().len() == 1 => {
                NextAction::FinishReview
            }
            _ => NextAction::NextQuestion,
        };
        // Exams need an answer before moving on; practice needs a verdict.
        let can_advance = !session.is_finished()
            && question.is_some()
            && match mode {
                QuizMode::Exam => session.current_answer().is_some(),
                QuizMode::Practice => session.analysis().is_some(),
            };

        Self {
            subject,
            mode,
            position,
            total,
            progress_percent,
            question_id: question.map(|q| q.id()),
            text: question.map(|q| q.text().to_owned()).unwrap_or_default(),
            options: question.map(|q| q.options().to_vec()).unwrap_or_default(),
            selected: session.current_answer(),
            analysis: session.analysis().cloned(),
            grading: session.is_grading(),
            reviewing: session.is_reviewing(),
            review_remaining: session.review_queue().len(),
            review_total: session.review_total(),
            next_action,
            can_advance,
            can_go_back: mode.is_exam() && position > 0 && !session.is_finished(),
            practice_stats: (!mode.is_exam()).then(|| session.practice_stats()),
            elapsed_secs: session.started_at().map(|start| {
                let end = session.ended_at().unwrap_or(now);
                u64::try_from(end.signed_duration_since(start).num_seconds()).unwrap_or(0)
            }),
            finished: session.is_finished(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// One-based review step and queue size, as in "reviewing k of n".
    #[must_use]
    pub fn review_step(&self) -> Option<(usize, usize)> {
        self.reviewing
            .then(|| (self.review_total + 1 - self.review_remaining, self.review_total))
    }
}

/// Summary of a finished quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsView {
    pub subject: Subject,
    pub mode: QuizMode,
    pub total: usize,
    pub answered: usize,
    pub skipped: usize,
    /// Exam only.
    pub correct: Option<usize>,
    /// Exam only. Unanswered questions count as incorrect.
    pub incorrect: Option<usize>,
    /// Exam only, `0..=100`.
    pub score: Option<u32>,
    /// Exam only.
    pub duration_secs: Option<u64>,
}

impl ResultsView {
    /// `None` until the session is finished.
    #[must_use]
    pub fn from_session(session: &QuizSession, subject: Subject) -> Option<Self> {
        if !session.is_finished() {
            return None;
        }
        let total = session.len();
        let answered = session.answered_count().min(total);
        let result = session.exam_result();
        let duration_secs = session
            .started_at()
            .zip(session.ended_at())
            .map(|(start, end)| u64::try_from(end.signed_duration_since(start).num_seconds()).unwrap_or(0));

        Some(Self {
            subject,
            mode: session.mode(),
            total,
            answered,
            skipped: total - answered,
            correct: result.map(|r| r.correct_count),
            incorrect: result.map(|r| r.incorrect_count()),
            score: result.map(|r| r.score),
            duration_secs,
        })
    }

    #[must_use]
    pub fn duration_label(&self) -> Option<String> {
        self.duration_secs.map(format_elapsed)
    }
}

/// `m:ss`, minutes unbounded.
#[must_use]
pub fn format_elapsed(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
