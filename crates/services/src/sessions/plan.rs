use rand::Rng;

use quiz_core::model::{Question, QuizMode, Subject};
use quiz_core::quiz::EXAM_QUESTION_COUNT;

use crate::error::SessionError;

/// Ordered question sequence for a new quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub questions: Vec<Question>,
    /// Questions available before part slicing and exam truncation.
    pub source_total: usize,
}

impl SessionPlan {
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Builds a quiz sequence: optional part slice, shuffle, then exam truncation.
#[derive(Debug, Clone, Copy)]
pub struct SessionPlanBuilder {
    mode: QuizMode,
    part: Option<(Subject, usize)>,
}

impl SessionPlanBuilder {
    #[must_use]
    pub fn new(mode: QuizMode) -> Self {
        Self { mode, part: None }
    }

    /// Restrict the plan to one zero-based part of `subject`'s source list.
    #[must_use]
    pub fn with_part(mut self, subject: Subject, part: usize) -> Self {
        self.part = Some((subject, part));
        self
    }

    /// Build the plan from the subject's source list.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownPart` if the selected part does not exist
    /// for the subject.
    pub fn build<R: Rng>(
        self,
        source: Vec<Question>,
        rng: &mut R,
    ) -> Result<SessionPlan, SessionError> {
        let source_total = source.len();
        let mut questions = match self.part {
            Some((subject, part)) => {
                let range = subject
                    .parts()
                    .range(part)
                    .ok_or(SessionError::UnknownPart { subject, part })?;
                let end = range.end.min(source_total);
                let start = range.start.min(end);
                source.into_iter().skip(start).take(end - start).collect()
            }
            None => source,
        };

        fisher_yates(&mut questions, rng);

        if self.mode.is_exam() {
            questions.truncate(EXAM_QUESTION_COUNT);
        }

        Ok(SessionPlan {
            questions,
            source_total,
        })
    }
}

/// Unbiased in-place shuffle: each index from the last down to 1 swaps with a
/// uniformly chosen index at or below it.
fn fisher_yates<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn questions(count: u32) -> Vec<Question> {
        (1..=count)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    format!("Q{id}"),
                    vec!["a".into(), "b".into()],
                    Some(0),
                )
                .unwrap()
            })
            .collect()
    }

    fn sorted_ids(questions: &[Question]) -> Vec<u32> {
        let mut ids: Vec<u32> = questions.iter().map(|q| q.id().value()).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn practice_plan_is_a_permutation_of_the_source() {
        for seed in 0..20 {
            for count in [0, 1, 2, 7, 60] {
                let mut rng = StdRng::seed_from_u64(seed);
                let plan = SessionPlanBuilder::new(QuizMode::Practice)
                    .build(questions(count), &mut rng)
                    .unwrap();
                assert_eq!(sorted_ids(&plan.questions), sorted_ids(&questions(count)));
                assert_eq!(plan.source_total, count as usize);
            }
        }
    }

    #[test]
    fn shuffle_actually_reorders() {
        let mut rng = StdRng::seed_from_u64(7);
        let plan = SessionPlanBuilder::new(QuizMode::Practice)
            .build(questions(50), &mut rng)
            .unwrap();
        let ids: Vec<u32> = plan.questions.iter().map(|q| q.id().value()).collect();
        assert_ne!(ids, (1..=50).collect::<Vec<_>>());
    }

    #[test]
    fn exam_plan_is_truncated_to_forty() {
        for count in [0_u32, 5, 39, 40, 41, 200] {
            let mut rng = StdRng::seed_from_u64(u64::from(count));
            let plan = SessionPlanBuilder::new(QuizMode::Exam)
                .build(questions(count), &mut rng)
                .unwrap();
            assert_eq!(plan.total(), (count as usize).min(EXAM_QUESTION_COUNT));
            let source_ids = sorted_ids(&questions(count));
            assert!(sorted_ids(&plan.questions)
                .iter()
                .all(|id| source_ids.binary_search(id).is_ok()));
        }
    }

    #[test]
    fn part_slice_selects_the_configured_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let plan = SessionPlanBuilder::new(QuizMode::Practice)
            .with_part(Subject::Psychology, 1)
            .build(questions(91), &mut rng)
            .unwrap();
        assert_eq!(sorted_ids(&plan.questions), (31..=60).collect::<Vec<_>>());
        assert_eq!(plan.source_total, 91);
    }

    #[test]
    fn part_slice_is_clamped_to_a_short_source() {
        let mut rng = StdRng::seed_from_u64(1);
        let plan = SessionPlanBuilder::new(QuizMode::Practice)
            .with_part(Subject::Psychology, 2)
            .build(questions(70), &mut rng)
            .unwrap();
        assert_eq!(sorted_ids(&plan.questions), (61..=70).collect::<Vec<_>>());

        let plan = SessionPlanBuilder::new(QuizMode::Practice)
            .with_part(Subject::Psychology, 2)
            .build(questions(20), &mut rng)
            .unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn unknown_part_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = SessionPlanBuilder::new(QuizMode::Exam)
            .with_part(Subject::Psychology, 3)
            .build(questions(91), &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::UnknownPart {
                subject: Subject::Psychology,
                part: 3
            }
        ));
    }
}
