//! Answer graders: the static answer key and an AI-backed judge.

mod ai;
mod config;
mod static_key;

use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::{Analysis, Question};

use crate::error::GradingError;

pub use ai::AiGrader;
pub use config::GraderConfig;
pub use static_key::StaticGrader;

/// Judges a selected option and explains the correct one.
///
/// Failures must be reported as errors, never as an "incorrect" verdict.
#[async_trait]
pub trait Grader: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    /// Grade `selected` for `question`.
    ///
    /// # Errors
    ///
    /// Returns `GradingError` when no verdict can be produced.
    async fn grade(&self, question: &Question, selected: usize) -> Result<Analysis, GradingError>;
}

/// AI grader when configured, the static answer key otherwise.
#[must_use]
pub fn grader_for(config: Option<GraderConfig>) -> Arc<dyn Grader> {
    match config {
        Some(config) => Arc::new(AiGrader::new(config)),
        None => Arc::new(StaticGrader),
    }
}
