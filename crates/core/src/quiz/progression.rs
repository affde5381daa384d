use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::model::{QuizMode, SequencePosition};
use crate::quiz::scoring::ExamResult;
use crate::quiz::session::QuizSession;
use crate::quiz::BATCH_SIZE;

/// Outcome of a progression intent, mostly useful for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Preconditions not met; nothing changed.
    Ignored,
    /// Cursor moved within the main flow.
    Moved { to: SequencePosition },
    /// Batch ended with mistakes; review begins at the first queued position.
    EnteredReview { queue: Vec<SequencePosition> },
    /// Review moved on to the next queued position.
    ReviewAdvanced { to: SequencePosition },
    /// Review queue drained; main flow resumes after the batch end.
    ReviewDrained { resume: SequencePosition },
    Finished,
}

impl QuizSession {
    /// Advance the session by one step.
    pub fn next(&mut self, now: DateTime<Utc>) -> Transition {
        if self.finished || self.sequence.is_empty() {
            return Transition::Ignored;
        }

        let transition = if self.reviewing {
            self.advance_review(now)
        } else {
            match self.mode {
                QuizMode::Exam => self.advance_exam(now),
                QuizMode::Practice => self.advance_practice(now),
            }
        };

        if transition != Transition::Ignored {
            self.analysis = None;
        }
        transition
    }

    /// Step back one question. Exam mode only.
    pub fn previous(&mut self) -> Transition {
        if self.finished || !self.mode.is_exam() {
            return Transition::Ignored;
        }
        let Some(to) = self.cursor.prev() else {
            return Transition::Ignored;
        };

        self.cursor = to;
        self.analysis = None;
        Transition::Moved { to }
    }

    /// Mark the session finished and, for exams, compute the result.
    ///
    /// Calling this again on a finished session changes nothing.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Transition {
        if self.finished {
            return Transition::Ignored;
        }

        self.finished = true;
        self.reviewing = false;
        self.review_total = 0;
        self.analysis = None;
        if self.mode.is_exam() {
            self.ended_at = Some(now);
            self.exam_result = Some(ExamResult::compute(&self.sequence, &self.user_answers));
        }
        Transition::Finished
    }

    fn last_position(&self) -> SequencePosition {
        SequencePosition::new(self.sequence.len().saturating_sub(1))
    }

    /// Move forward in the main flow, finishing at the end of the sequence.
    fn step_forward(&mut self, now: DateTime<Utc>) -> Transition {
        if self.cursor < self.last_position() {
            self.cursor = self.cursor.next();
            Transition::Moved { to: self.cursor }
        } else {
            self.finish(now)
        }
    }

    fn advance_exam(&mut self, now: DateTime<Utc>) -> Transition {
        if self.current_answer().is_none() {
            return Transition::Ignored;
        }
        self.step_forward(now)
    }

    fn advance_practice(&mut self, now: DateTime<Utc>) -> Transition {
        let cursor = self.cursor.value();
        let is_batch_end = (cursor + 1) % BATCH_SIZE == 0 || self.cursor == self.last_position();
        if !is_batch_end {
            return self.step_forward(now);
        }

        let batch_start = cursor / BATCH_SIZE * BATCH_SIZE;
        let incorrect: VecDeque<SequencePosition> = (batch_start..=cursor)
            .map(SequencePosition::new)
            .filter(|position| self.answer_history.get(position) == Some(&false))
            .collect();

        let Some(&first) = incorrect.front() else {
            return self.step_forward(now);
        };

        for &position in &incorrect {
            self.clear_answer_at(position);
        }
        self.reviewing = true;
        self.main_progress_index = self.cursor;
        self.cursor = first;
        self.review_total = incorrect.len();
        self.review_queue = incorrect;

        Transition::EnteredReview {
            queue: self.review_queue.iter().copied().collect(),
        }
    }

    fn advance_review(&mut self, now: DateTime<Utc>) -> Transition {
        self.review_queue.pop_front();

        if let Some(&front) = self.review_queue.front() {
            self.cursor = front;
            self.clear_answer_at(front);
            return Transition::ReviewAdvanced { to: front };
        }

        self.reviewing = false;
        self.review_total = 0;
        let resume = self.main_progress_index.next();
        if resume.value() >= self.sequence.len() {
            return self.finish(now);
        }
        self.cursor = resume;
        Transition::ReviewDrained { resume }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Analysis, QuestionId};
    use crate::quiz::test_support::{exam_session, practice_session};
    use crate::quiz::QuizState;
    use crate::time::fixed_now;

    fn pos(i: usize) -> SequencePosition {
        SequencePosition::new(i)
    }

    /// Answer and grade the cursor question, picking option 0 when `correct`.
    /// Test questions are keyed to option 0.
    fn grade_current(session: &mut QuizSession, correct: bool) {
        let id = session.current_question().unwrap().id();
        session.select_option(id, if correct { 0 } else { 1 });
        let ticket = session.begin_grading().unwrap();
        session.commit_grading(&ticket, Analysis::new(0, "key"));
    }

    /// Walk a practice session from position 0 through `last`, grading each
    /// position and advancing between them (but not past `last`).
    fn play_batch(session: &mut QuizSession, last: usize, wrong: &[usize]) {
        for i in 0..=last {
            assert_eq!(session.cursor(), pos(i));
            grade_current(session, !wrong.contains(&i));
            if i < last {
                session.next(fixed_now());
            }
        }
    }

    #[test]
    fn practice_advances_inside_a_batch() {
        let mut session = practice_session(20);
        grade_current(&mut session, false);

        let transition = session.next(fixed_now());

        assert_eq!(transition, Transition::Moved { to: pos(1) });
        assert!(!session.is_reviewing());
        assert!(session.analysis().is_none());
    }

    #[test]
    fn batch_end_with_mistakes_enters_review() {
        let mut session = practice_session(30);
        play_batch(&mut session, 14, &[3, 9]);

        let transition = session.next(fixed_now());

        assert_eq!(
            transition,
            Transition::EnteredReview {
                queue: vec![pos(3), pos(9)]
            }
        );
        assert!(session.is_reviewing());
        assert_eq!(session.review_queue(), &VecDeque::from(vec![pos(3), pos(9)]));
        assert_eq!(session.review_total(), 2);
        assert_eq!(session.cursor(), pos(3));
        assert_eq!(session.main_progress_index(), pos(14));
        assert_eq!(session.state(), QuizState::Reviewing);
    }

    #[test]
    fn entering_review_clears_answers_but_keeps_history() {
        let mut session = practice_session(30);
        play_batch(&mut session, 14, &[3, 9]);
        let id3 = session.question_at(pos(3)).unwrap().id();
        let id9 = session.question_at(pos(9)).unwrap().id();
        let id4 = session.question_at(pos(4)).unwrap().id();

        session.next(fixed_now());

        assert_eq!(session.answer_for(id3), None);
        assert_eq!(session.answer_for(id9), None);
        assert_eq!(session.answer_for(id4), Some(0));
        assert_eq!(session.answer_history().get(&pos(3)), Some(&false));
        assert_eq!(session.answer_history().get(&pos(9)), Some(&false));
    }

    #[test]
    fn review_drains_back_to_the_resume_point() {
        let mut session = practice_session(30);
        play_batch(&mut session, 14, &[3, 9]);
        session.next(fixed_now());

        grade_current(&mut session, true);
        assert_eq!(
            session.next(fixed_now()),
            Transition::ReviewAdvanced { to: pos(9) }
        );
        assert_eq!(session.cursor(), pos(9));
        assert!(session.is_reviewing());
        assert_eq!(session.review_total(), 2);

        grade_current(&mut session, true);
        assert_eq!(
            session.next(fixed_now()),
            Transition::ReviewDrained { resume: pos(15) }
        );
        assert!(!session.is_reviewing());
        assert_eq!(session.review_total(), 0);
        assert_eq!(session.cursor(), pos(15));
        assert_eq!(session.answer_history().get(&pos(3)), Some(&true));
    }

    #[test]
    fn repeated_mistake_in_review_does_not_nest() {
        let mut session = practice_session(30);
        play_batch(&mut session, 14, &[3]);
        session.next(fixed_now());

        grade_current(&mut session, false);
        let transition = session.next(fixed_now());

        assert_eq!(transition, Transition::ReviewDrained { resume: pos(15) });
        assert_eq!(session.answer_history().get(&pos(3)), Some(&false));
        assert!(session.review_queue().is_empty());
    }

    #[test]
    fn clean_batch_moves_straight_on() {
        let mut session = practice_session(30);
        play_batch(&mut session, 14, &[]);

        assert_eq!(session.next(fixed_now()), Transition::Moved { to: pos(15) });
        assert!(!session.is_reviewing());
    }

    #[test]
    fn ungraded_positions_do_not_enter_review() {
        let mut session = practice_session(15);
        for _ in 0..14 {
            session.next(fixed_now());
        }
        assert_eq!(session.cursor(), pos(14));

        assert_eq!(session.next(fixed_now()), Transition::Finished);
        assert!(session.is_finished());
    }

    #[test]
    fn short_final_batch_is_reviewed_at_the_last_position() {
        let mut session = practice_session(18);
        play_batch(&mut session, 14, &[]);
        session.next(fixed_now());
        for i in 15..18 {
            grade_current(&mut session, i != 16);
            if i < 17 {
                session.next(fixed_now());
            }
        }

        let transition = session.next(fixed_now());

        assert_eq!(
            transition,
            Transition::EnteredReview {
                queue: vec![pos(16)]
            }
        );
        assert_eq!(session.main_progress_index(), pos(17));
    }

    #[test]
    fn review_at_session_end_finishes_without_moving() {
        let mut session = practice_session(5);
        play_batch(&mut session, 4, &[1]);
        session.next(fixed_now());
        assert_eq!(session.cursor(), pos(1));

        grade_current(&mut session, true);
        let transition = session.next(fixed_now());

        assert_eq!(transition, Transition::Finished);
        assert!(session.is_finished());
        assert_eq!(session.cursor(), pos(1));
        assert_eq!(session.score(), None);
        assert_eq!(session.ended_at(), None);
    }

    #[test]
    fn exam_refuses_to_advance_past_unanswered_question() {
        let mut session = exam_session(3);

        assert_eq!(session.next(fixed_now()), Transition::Ignored);
        assert_eq!(session.cursor(), pos(0));

        session.select_option(session.current_question().unwrap().id(), 2);
        assert_eq!(session.next(fixed_now()), Transition::Moved { to: pos(1) });
    }

    #[test]
    fn exam_never_enters_review() {
        let mut session = exam_session(15);
        for _ in 0..15 {
            let id = session.current_question().unwrap().id();
            session.select_option(id, 1);
            session.next(fixed_now());
        }

        assert!(session.is_finished());
        assert!(!session.is_reviewing());
        assert!(session.review_queue().is_empty());
        assert_eq!(session.score(), Some(0));
    }

    #[test]
    fn previous_is_exam_only_and_stops_at_zero() {
        let mut practice = practice_session(3);
        practice.next(fixed_now());
        assert_eq!(practice.previous(), Transition::Ignored);
        assert_eq!(practice.cursor(), pos(1));

        let mut exam = exam_session(3);
        assert_eq!(exam.previous(), Transition::Ignored);
        let id = exam.current_question().unwrap().id();
        exam.select_option(id, 0);
        exam.next(fixed_now());

        assert_eq!(exam.previous(), Transition::Moved { to: pos(0) });
        assert_eq!(exam.answer_for(id), Some(0));
        assert!(exam.select_option(id, 1));
    }

    #[test]
    fn exam_score_is_computed_once() {
        let mut session = exam_session(40);
        for i in 0..40 {
            let id = session.current_question().unwrap().id();
            session.select_option(id, if i < 28 { 0 } else { 1 });
            session.next(fixed_now());
        }

        assert!(session.is_finished());
        assert_eq!(session.correct_count(), Some(28));
        assert_eq!(session.score(), Some(70));
        assert_eq!(session.ended_at(), Some(fixed_now()));

        let later = fixed_now() + chrono::Duration::minutes(5);
        assert_eq!(session.finish(later), Transition::Ignored);
        assert_eq!(session.score(), Some(70));
        assert_eq!(session.ended_at(), Some(fixed_now()));
    }

    #[test]
    fn early_exam_finish_scores_the_whole_sequence() {
        let mut session = exam_session(4);
        let id = session.current_question().unwrap().id();
        session.select_option(id, 0);

        session.finish(fixed_now());

        assert_eq!(session.correct_count(), Some(1));
        assert_eq!(session.score(), Some(25));
    }

    #[test]
    fn next_on_empty_or_finished_session_is_ignored() {
        let mut empty = QuizSession::new(QuizMode::Practice, Vec::new(), fixed_now());
        assert_eq!(empty.next(fixed_now()), Transition::Ignored);

        let mut session = practice_session(1);
        assert_eq!(session.next(fixed_now()), Transition::Finished);
        assert_eq!(session.next(fixed_now()), Transition::Ignored);
        assert!(!session.select_option(QuestionId::new(1), 0));
    }
}
