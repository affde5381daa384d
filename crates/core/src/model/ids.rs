use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable, source-defined identifier of a question.
///
/// Ids are not necessarily contiguous or zero-based; they key `user_answers`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(u32);

impl QuestionId {
    /// Creates a new `QuestionId`
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the underlying u32 value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

/// Zero-based index into a session's question sequence.
///
/// Distinct from `QuestionId`: answer history and the review queue are keyed by
/// position, user answers by question id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequencePosition(usize);

impl SequencePosition {
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub fn value(&self) -> usize {
        self.0
    }

    /// The following position.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// The preceding position, or `None` at the start of the sequence.
    #[must_use]
    pub fn prev(self) -> Option<Self> {
        self.0.checked_sub(1).map(Self)
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

impl fmt::Debug for SequencePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SequencePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

impl FromStr for QuestionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_id_parses_with_whitespace() {
        let id: QuestionId = " 105 ".parse().unwrap();
        assert_eq!(id, QuestionId::new(105));
        assert!("abc".parse::<QuestionId>().is_err());
    }

    #[test]
    fn position_prev_stops_at_zero() {
        assert_eq!(SequencePosition::new(0).prev(), None);
        assert_eq!(
            SequencePosition::new(3).prev(),
            Some(SequencePosition::new(2))
        );
        assert_eq!(SequencePosition::new(3).next(), SequencePosition::new(4));
    }

    #[test]
    fn ids_format_for_logs() {
        assert_eq!(format!("{:?}", QuestionId::new(7)), "QuestionId(7)");
        assert_eq!(format!("{}", SequencePosition::new(14)), "14");
    }
}
