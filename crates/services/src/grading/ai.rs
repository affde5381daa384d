use async_trait::async_trait;
use quiz_core::model::{Analysis, Question};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Grader, GraderConfig};
use crate::error::GradingError;

/// Asks an OpenAI-compatible chat model which option is correct.
#[derive(Clone)]
pub struct AiGrader {
    client: Client,
    config: GraderConfig,
}

impl AiGrader {
    #[must_use]
    pub fn new(config: GraderConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &GraderConfig {
        &self.config
    }
}

#[async_trait]
impl Grader for AiGrader {
    fn name(&self) -> &'static str {
        "ai"
    }

    async fn grade(&self, question: &Question, selected: usize) -> Result<Analysis, GradingError> {
        let payload = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_prompt(question),
                },
            ],
            temperature: 0.2,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        debug!(question = %question.id(), selected, model = %self.config.model, "requesting ai verdict");
        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GradingError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GradingError::EmptyResponse)?;

        parse_verdict(&content, question)
    }
}

const SYSTEM_PROMPT: &str = "You are a subject-matter expert grading multiple-choice questions. \
Reply with a JSON object {\"correctOptionIndex\": <0-based integer>, \"explanation\": <short string>}.";

fn build_prompt(question: &Question) -> String {
    let options = question
        .options()
        .iter()
        .enumerate()
        .map(|(i, option)| format!("{i}: {option}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Analyze the following multiple-choice question and identify the correct answer.\n\n\
Question: {}\nOptions:\n{options}\n\n\
Provide the index (0-based) of the correct option and a brief explanation.",
        question.text()
    )
}

fn parse_verdict(content: &str, question: &Question) -> Result<Analysis, GradingError> {
    let json = strip_code_fence(content);
    let verdict: Verdict =
        serde_json::from_str(json).map_err(|err| GradingError::Malformed(err.to_string()))?;

    let index = usize::try_from(verdict.correct_option_index)
        .ok()
        .filter(|&index| question.has_option(index))
        .ok_or_else(|| {
            GradingError::Malformed(format!(
                "option index {} out of range for {} options",
                verdict.correct_option_index,
                question.option_count()
            ))
        })?;

    Ok(Analysis::new(index, verdict.explanation.trim()))
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Verdict {
    correct_option_index: i64,
    explanation: String,
}
