use std::path::PathBuf;

use quiz_core::model::{QuestionId, Subject};
use storage::{JsonQuestionBank, QuestionBankRepository, StorageError};

async fn bank_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("quiz-storage-{name}-{}", std::process::id()));
    let _ = tokio::fs::remove_dir_all(&dir).await;
    tokio::fs::create_dir_all(&dir).await.unwrap();
    dir
}

const PSYCHOLOGY: &str = r#"{
  "questions": [
    { "id": 1, "text": "Psychology studies:", "options": ["the psyche", "the stars", "the soil"] },
    { "id": 2, "text": "Founder of psychoanalysis:", "options": ["Jung", "Freud"] },
    { "id": 3, "text": "Unkeyed question", "options": ["yes", "no"] }
  ],
  "answer_key": { "1": 0, "2": 1, "3": 7 }
}"#;

const CULTUROLOGY: &str = r#"{
  "questions": [
    { "id": 1, "text": "Culture is:", "options": ["nature", "second nature"] }
  ],
  "answer_key": { "1": 1 }
}"#;

#[tokio::test]
async fn json_bank_applies_answer_key_in_bounds() {
    let dir = bank_dir("key").await;
    tokio::fs::write(dir.join("psychology.json"), PSYCHOLOGY)
        .await
        .unwrap();

    let bank = JsonQuestionBank::new(&dir);
    let questions = bank.load_subject(Subject::Psychology).await.unwrap();

    assert_eq!(questions.len(), 3);
    assert_eq!(questions[0].correct_option(), Some(0));
    assert_eq!(questions[1].correct_option(), Some(1));
    assert_eq!(questions[2].correct_option(), None);
}

#[tokio::test]
async fn json_bank_composes_psychocultural() {
    let dir = bank_dir("compose").await;
    tokio::fs::write(dir.join("psychology.json"), PSYCHOLOGY)
        .await
        .unwrap();
    tokio::fs::write(dir.join("culturology.json"), CULTUROLOGY)
        .await
        .unwrap();

    let bank = JsonQuestionBank::new(&dir);
    let combined = bank.load_subject(Subject::Psychocultural).await.unwrap();

    assert_eq!(combined.len(), 4);
    assert_eq!(combined[3].id(), QuestionId::new(4));
    assert_eq!(combined[3].correct_option(), Some(1));
}

#[tokio::test]
async fn json_bank_reports_missing_and_malformed_files() {
    let dir = bank_dir("errors").await;
    tokio::fs::write(dir.join("philosophy.json"), "{ not json")
        .await
        .unwrap();

    let bank = JsonQuestionBank::new(&dir);

    let missing = bank.load_subject(Subject::Culturology).await.unwrap_err();
    assert!(matches!(missing, StorageError::NotFound(Subject::Culturology)));

    let malformed = bank.load_subject(Subject::Philosophy).await.unwrap_err();
    assert!(matches!(malformed, StorageError::Serialization(_)));
}

#[tokio::test]
async fn json_bank_rejects_repeated_question_ids() {
    let dir = bank_dir("duplicates").await;
    tokio::fs::write(
        dir.join("philosophy.json"),
        r#"{
  "questions": [
    { "id": 5, "text": "First", "options": ["a", "b"] },
    { "id": 5, "text": "Second", "options": ["a", "b"] }
  ],
  "answer_key": { "5": 0 }
}"#,
    )
    .await
    .unwrap();

    let bank = JsonQuestionBank::new(&dir);
    let err = bank.load_subject(Subject::Philosophy).await.unwrap_err();

    assert!(matches!(err, StorageError::DuplicateId(id) if id == QuestionId::new(5)));
}
