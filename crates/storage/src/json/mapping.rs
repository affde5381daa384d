use std::collections::BTreeMap;

use serde::Deserialize;

use quiz_core::model::{AnswerKey, Question, QuestionId};

use crate::repository::{StorageError, ensure_unique_ids};

/// On-disk shape of a subject bank.
///
/// ```json
/// {
///   "questions": [{ "id": 1, "text": "...", "options": ["...", "..."] }],
///   "answer_key": { "1": 0 }
/// }
/// ```
#[derive(Debug, Deserialize)]
pub(crate) struct BankFile {
    pub questions: Vec<QuestionRecord>,
    #[serde(default)]
    pub answer_key: BTreeMap<String, usize>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionRecord {
    pub id: u32,
    pub text: String,
    pub options: Vec<String>,
}

pub(crate) fn parse_bank(raw: &str) -> Result<BankFile, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn parse_answer_key(raw: &BTreeMap<String, usize>) -> Result<AnswerKey, StorageError> {
    raw.iter()
        .map(|(id, index)| {
            id.parse::<QuestionId>()
                .map(|id| (id, *index))
                .map_err(|_| StorageError::Serialization(format!("invalid answer key id: {id}")))
        })
        .collect()
}

/// Validate records and apply the file's answer key.
pub(crate) fn into_questions(bank: BankFile) -> Result<Vec<Question>, StorageError> {
    let key = parse_answer_key(&bank.answer_key)?;
    let questions = bank
        .questions
        .into_iter()
        .map(|record| {
            Question::new(QuestionId::new(record.id), record.text, record.options, None)
                .map_err(|e| StorageError::Invalid(e.into()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    ensure_unique_ids(&questions)?;
    Ok(key.apply(questions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_without_key_has_unkeyed_questions() {
        let bank = parse_bank(r#"{ "questions": [{ "id": 4, "text": "Q", "options": ["a"] }] }"#)
            .unwrap();
        let questions = into_questions(bank).unwrap();
        assert_eq!(questions[0].correct_option(), None);
    }

    #[test]
    fn non_numeric_key_id_is_a_serialization_error() {
        let bank = parse_bank(
            r#"{ "questions": [], "answer_key": { "first": 0 } }"#,
        )
        .unwrap();
        let err = into_questions(bank).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn question_without_options_is_invalid() {
        let bank = parse_bank(r#"{ "questions": [{ "id": 1, "text": "Q", "options": [] }] }"#)
            .unwrap();
        let err = into_questions(bank).unwrap_err();
        assert!(matches!(err, StorageError::Invalid(_)));
    }
}
