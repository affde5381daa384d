use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown subject: {0}")]
pub struct SubjectParseError(pub String);

/// Question bank a session draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Philosophy,
    Psychology,
    Culturology,
    /// Psychology followed by culturology, with culturology ids renumbered.
    Psychocultural,
}

impl Subject {
    pub const ALL: [Subject; 4] = [
        Subject::Philosophy,
        Subject::Psychology,
        Subject::Culturology,
        Subject::Psychocultural,
    ];

    /// Stable lowercase key, also used as the bank file stem.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Philosophy => "philosophy",
            Subject::Psychology => "psychology",
            Subject::Culturology => "culturology",
            Subject::Psychocultural => "psychocultural",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Subject::Philosophy => "Philosophy",
            Subject::Psychology => "Psychology",
            Subject::Culturology => "Culturology",
            Subject::Psychocultural => "Psychology + Culture",
        }
    }

    /// How the subject's source list is split into practice parts.
    #[must_use]
    pub fn parts(self) -> PartConfig {
        match self {
            Subject::Philosophy => PartConfig::new(&[50, 50, 50, 50]),
            Subject::Psychology => PartConfig::new(&[30, 30, 31]),
            Subject::Culturology => PartConfig::new(&[40, 40, 40, 40]),
            Subject::Psychocultural => PartConfig::new(&[50, 50, 50, 50, 51]),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = SubjectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Subject::ALL
            .into_iter()
            .find(|subject| subject.as_str() == normalized)
            .ok_or_else(|| SubjectParseError(s.to_owned()))
    }
}

/// Sizes of the consecutive parts a subject's source list is divided into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartConfig {
    sizes: &'static [usize],
}

impl PartConfig {
    #[must_use]
    pub const fn new(sizes: &'static [usize]) -> Self {
        Self { sizes }
    }

    #[must_use]
    pub fn part_count(&self) -> usize {
        self.sizes.len()
    }

    #[must_use]
    pub fn size(&self, part: usize) -> Option<usize> {
        self.sizes.get(part).copied()
    }

    /// Source-list indices covered by `part` (zero-based), or `None` if the
    /// subject has no such part.
    #[must_use]
    pub fn range(&self, part: usize) -> Option<Range<usize>> {
        let size = self.size(part)?;
        let start: usize = self.sizes[..part].iter().sum();
        Some(start..start + size)
    }
}
