use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::{Question, QuestionId, SequencePosition};

/// Final exam tally, computed once when an exam session finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamResult {
    pub correct_count: usize,
    pub total: usize,
    /// Percentage in `0..=100`, rounded half up.
    pub score: u32,
}

impl ExamResult {
    /// Score every question in `sequence` against its own answer key.
    ///
    /// Unanswered questions and questions without a key count as incorrect.
    /// An empty sequence scores zero.
    #[must_use]
    pub fn compute(sequence: &[Question], user_answers: &HashMap<QuestionId, usize>) -> Self {
        let correct_count = sequence
            .iter()
            .filter(|question| {
                let selected = user_answers.get(&question.id()).copied();
                selected.is_some() && selected == question.correct_option()
            })
            .count();

        Self {
            correct_count,
            total: sequence.len(),
            score: percentage(correct_count, sequence.len()),
        }
    }

    #[must_use]
    pub fn incorrect_count(&self) -> usize {
        self.total.saturating_sub(self.correct_count)
    }
}

/// `round(part / whole * 100)` with halves rounded up, in integer arithmetic.
#[must_use]
pub fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let part = part.min(whole) as u64;
    let whole = whole as u64;
    let rounded = (200 * part + whole) / (2 * whole);
    u32::try_from(rounded).unwrap_or(100)
}

/// Running practice tallies over graded positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PracticeStats {
    /// Positions graded at least once.
    pub passed: usize,
    pub correct: usize,
    pub incorrect: usize,
    /// Positions never graded.
    pub remaining: usize,
}

impl PracticeStats {
    #[must_use]
    pub fn from_history(history: &BTreeMap<SequencePosition, bool>, total: usize) -> Self {
        let correct = history.values().filter(|&&was_correct| was_correct).count();
        let passed = history.len();
        Self {
            passed,
            correct,
            incorrect: passed - correct,
            remaining: total.saturating_sub(passed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed_questions(n: u32) -> Vec<Question> {
        (1..=n)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    format!("Q{id}"),
                    vec!["a".into(), "b".into(), "c".into()],
                    Some(1),
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(28, 40), 70);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(40, 40), 100);
    }

    #[test]
    fn exam_result_counts_unanswered_as_incorrect() {
        let questions = keyed_questions(4);
        let answers: HashMap<QuestionId, usize> = [
            (QuestionId::new(1), 1),
            (QuestionId::new(2), 0),
            (QuestionId::new(3), 1),
        ]
        .into_iter()
        .collect();

        let result = ExamResult::compute(&questions, &answers);

        assert_eq!(result.correct_count, 2);
        assert_eq!(result.total, 4);
        assert_eq!(result.score, 50);
        assert_eq!(result.incorrect_count(), 2);
    }

    #[test]
    fn exam_result_ignores_questions_without_key() {
        let unkeyed = Question::new(QuestionId::new(9), "Q", vec!["a".into()], None).unwrap();
        let answers: HashMap<QuestionId, usize> = [(QuestionId::new(9), 0)].into_iter().collect();

        let result = ExamResult::compute(&[unkeyed], &answers);

        assert_eq!(result.correct_count, 0);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn practice_stats_tally_history() {
        let history: BTreeMap<SequencePosition, bool> = [
            (SequencePosition::new(0), true),
            (SequencePosition::new(1), false),
            (SequencePosition::new(4), true),
        ]
        .into_iter()
        .collect();

        let stats = PracticeStats::from_history(&history, 10);

        assert_eq!(
            stats,
            PracticeStats {
                passed: 3,
                correct: 2,
                incorrect: 1,
                remaining: 7,
            }
        );
    }
}
