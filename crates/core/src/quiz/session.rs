use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::{DateTime, Utc};

use crate::model::{Analysis, Question, QuestionId, QuizMode, SequencePosition};
use crate::quiz::QuizState;
use crate::quiz::scoring::{ExamResult, PracticeStats};

//
// ─── GRADING HANDSHAKE ─────────────────────────────────────────────────────────
//

/// Proof that a grading request was accepted for a position.
///
/// Issued by `QuizSession::begin_grading` and handed back on completion, so a
/// result can be matched against the position it was requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradingTicket {
    position: SequencePosition,
    question: Question,
    selected: usize,
}

impl GradingTicket {
    #[must_use]
    pub fn position(&self) -> SequencePosition {
        self.position
    }

    #[must_use]
    pub fn question(&self) -> &Question {
        &self.question
    }

    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }
}

/// What happened to a grading result handed back to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradingCommit {
    /// History was written for the ticket position.
    Recorded { correct: bool },
    /// The cursor moved (or the session finished) while grading was pending.
    Stale,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Complete state of one quiz attempt.
///
/// All mutation goes through the transition methods; intents that violate a
/// precondition leave the session untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    pub(super) mode: QuizMode,
    pub(super) sequence: Vec<Question>,
    pub(super) cursor: SequencePosition,
    pub(super) user_answers: HashMap<QuestionId, usize>,
    pub(super) answer_history: BTreeMap<SequencePosition, bool>,
    pub(super) reviewing: bool,
    pub(super) review_queue: VecDeque<SequencePosition>,
    /// Queue length when the current review began.
    pub(super) review_total: usize,
    pub(super) main_progress_index: SequencePosition,
    pub(super) finished: bool,
    pub(super) started_at: Option<DateTime<Utc>>,
    pub(super) ended_at: Option<DateTime<Utc>>,
    pub(super) exam_result: Option<ExamResult>,
    pub(super) analysis: Option<Analysis>,
    pub(super) grading: Option<SequencePosition>,
}

impl QuizSession {
    /// Fresh session over an already ordered sequence.
    ///
    /// `started_at` is recorded for exams only. An empty sequence is valid.
    #[must_use]
    pub fn new(mode: QuizMode, sequence: Vec<Question>, started_at: DateTime<Utc>) -> Self {
        Self {
            mode,
            sequence,
            cursor: SequencePosition::default(),
            user_answers: HashMap::new(),
            answer_history: BTreeMap::new(),
            reviewing: false,
            review_queue: VecDeque::new(),
            review_total: 0,
            main_progress_index: SequencePosition::default(),
            finished: false,
            started_at: mode.is_exam().then_some(started_at),
            ended_at: None,
            exam_result: None,
            analysis: None,
            grading: None,
        }
    }

    #[must_use]
    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    #[must_use]
    pub fn sequence(&self) -> &[Question] {
        &self.sequence
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    #[must_use]
    pub fn cursor(&self) -> SequencePosition {
        self.cursor
    }

    #[must_use]
    pub fn question_at(&self, position: SequencePosition) -> Option<&Question> {
        self.sequence.get(position.value())
    }

    /// Question currently displayed, if any.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.question_at(self.cursor)
    }

    #[must_use]
    pub fn user_answers(&self) -> &HashMap<QuestionId, usize> {
        &self.user_answers
    }

    #[must_use]
    pub fn answer_for(&self, id: QuestionId) -> Option<usize> {
        self.user_answers.get(&id).copied()
    }

    /// Selected option for the question at the cursor.
    #[must_use]
    pub fn current_answer(&self) -> Option<usize> {
        self.current_question()
            .and_then(|question| self.answer_for(question.id()))
    }

    #[must_use]
    pub fn answer_history(&self) -> &BTreeMap<SequencePosition, bool> {
        &self.answer_history
    }

    #[must_use]
    pub fn is_reviewing(&self) -> bool {
        self.reviewing
    }

    #[must_use]
    pub fn review_queue(&self) -> &VecDeque<SequencePosition> {
        &self.review_queue
    }

    /// Size of the review queue at entry; zero outside review.
    #[must_use]
    pub fn review_total(&self) -> usize {
        self.review_total
    }

    #[must_use]
    pub fn main_progress_index(&self) -> SequencePosition {
        self.main_progress_index
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn state(&self) -> QuizState {
        if self.finished {
            QuizState::Finished
        } else if self.reviewing {
            QuizState::Reviewing
        } else {
            QuizState::Normal
        }
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    #[must_use]
    pub fn exam_result(&self) -> Option<ExamResult> {
        self.exam_result
    }

    #[must_use]
    pub fn score(&self) -> Option<u32> {
        self.exam_result.map(|result| result.score)
    }

    #[must_use]
    pub fn correct_count(&self) -> Option<usize> {
        self.exam_result.map(|result| result.correct_count)
    }

    /// Grading result on display for the cursor position.
    #[must_use]
    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    #[must_use]
    pub fn is_grading(&self) -> bool {
        self.grading.is_some()
    }

    /// Number of questions with a recorded selection.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.user_answers.len()
    }

    #[must_use]
    pub fn practice_stats(&self) -> PracticeStats {
        PracticeStats::from_history(&self.answer_history, self.sequence.len())
    }

    //
    // ─── ANSWER SELECTION ──────────────────────────────────────────────────────
    //

    /// Record `option` as the answer to `question_id`.
    ///
    /// Only the question at the cursor can be answered. Returns `false` (and
    /// changes nothing) while it has a stored analysis or is being graded,
    /// after finish, or when the id or option does not match it.
    pub fn select_option(&mut self, question_id: QuestionId, option: usize) -> bool {
        if self.finished || self.analysis.is_some() || self.grading == Some(self.cursor) {
            return false;
        }
        let accepted = self
            .current_question()
            .is_some_and(|question| question.id() == question_id && question.has_option(option));
        if !accepted {
            return false;
        }

        self.user_answers.insert(question_id, option);
        true
    }

    pub(super) fn clear_answer_at(&mut self, position: SequencePosition) {
        if let Some(question) = self.sequence.get(position.value()) {
            self.user_answers.remove(&question.id());
        }
    }

    //
    // ─── GRADING ───────────────────────────────────────────────────────────────
    //

    /// Mark the cursor position as being graded.
    ///
    /// Returns `None` when grading is not allowed right now: exam mode, finished,
    /// nothing selected, already graded, or another request still in flight.
    pub fn begin_grading(&mut self) -> Option<GradingTicket> {
        if self.finished
            || self.mode.is_exam()
            || self.grading.is_some()
            || self.analysis.is_some()
        {
            return None;
        }
        let question = self.current_question()?.clone();
        let selected = self.answer_for(question.id())?;

        self.grading = Some(self.cursor);
        Some(GradingTicket {
            position: self.cursor,
            question,
            selected,
        })
    }

    /// Apply a grader verdict for `ticket`.
    ///
    /// The in-flight flag is always released. History and the stored analysis
    /// are only written when the cursor still sits on the ticket position.
    pub fn commit_grading(&mut self, ticket: &GradingTicket, analysis: Analysis) -> GradingCommit {
        if self.grading != Some(ticket.position) {
            return GradingCommit::Stale;
        }
        self.grading = None;

        if self.finished || self.cursor != ticket.position {
            return GradingCommit::Stale;
        }

        let correct = self.answer_for(ticket.question.id()) == Some(analysis.correct_option);
        self.answer_history.insert(ticket.position, correct);
        self.analysis = Some(analysis);
        GradingCommit::Recorded { correct }
    }

    /// Release the in-flight flag after a failed grading attempt.
    pub fn abandon_grading(&mut self, ticket: &GradingTicket) {
        if self.grading == Some(ticket.position) {
            self.grading = None;
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
