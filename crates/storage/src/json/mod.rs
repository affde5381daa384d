use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use quiz_core::model::{Question, Subject};

use crate::repository::{QuestionBankRepository, StorageError, compose_psychocultural};

mod mapping;

/// Question banks stored as `<dir>/<subject>.json`.
#[derive(Debug, Clone)]
pub struct JsonQuestionBank {
    dir: PathBuf,
}

impl JsonQuestionBank {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn path_for(&self, subject: Subject) -> PathBuf {
        self.dir.join(format!("{}.json", subject.as_str()))
    }

    /// Read the file for `subject` if present.
    async fn read_file(&self, subject: Subject) -> Result<Option<Vec<Question>>, StorageError> {
        let path = self.path_for(subject);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let questions = mapping::into_questions(mapping::parse_bank(&raw)?)?;
        debug!(
            path = %path.display(),
            count = questions.len(),
            "loaded question bank"
        );
        Ok(Some(questions))
    }
}

#[async_trait]
impl QuestionBankRepository for JsonQuestionBank {
    async fn load_subject(&self, subject: Subject) -> Result<Vec<Question>, StorageError> {
        if let Some(questions) = self.read_file(subject).await? {
            return Ok(questions);
        }
        if subject == Subject::Psychocultural {
            let psychology = self.read_file(Subject::Psychology).await?;
            let culturology = self.read_file(Subject::Culturology).await?;
            if let (Some(psychology), Some(culturology)) = (psychology, culturology) {
                return Ok(compose_psychocultural(psychology, culturology));
            }
        }
        Err(StorageError::NotFound(subject))
    }
}
