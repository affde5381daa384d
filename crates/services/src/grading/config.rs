use std::env;
use std::fmt;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Connection settings for the AI grader.
///
/// Passed into `AiGrader::new`; there is no process-wide key.
#[derive(Clone)]
pub struct GraderConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl GraderConfig {
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Read `QUIZ_AI_API_KEY`, `QUIZ_AI_BASE_URL` and `QUIZ_AI_MODEL`.
    ///
    /// Returns `None` when no non-blank API key is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let api_key = lookup("QUIZ_AI_API_KEY")?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = lookup("QUIZ_AI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let model = lookup("QUIZ_AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into());
        Some(Self {
            base_url,
            api_key: api_key.trim().to_owned(),
            model,
        })
    }

    pub(crate) fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for GraderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}
