use std::env;
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::ContentRequest;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::mapping::ProviderQuestion;
use crate::error::ContentError;

const DEFAULT_TIMEOUT_SECS: u64 = 8;

/// Source of questions for a course concept.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Fetch raw provider records for the request.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` when the provider is unreachable, answers with a
    /// non-success status, or sends a body that cannot be decoded.
    async fn fetch_questions(
        &self,
        request: &ContentRequest,
    ) -> Result<Vec<ProviderQuestion>, ContentError>;
}

#[derive(Clone, Debug)]
pub struct ContentConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl ContentConfig {
    /// Reads `QUIZ_CONTENT_BASE_URL`, `QUIZ_CONTENT_API_KEY` and
    /// `QUIZ_CONTENT_TIMEOUT_SECS`. Returns `None` without a base URL.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("QUIZ_CONTENT_BASE_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        let api_key = env::var("QUIZ_CONTENT_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let timeout_secs = env::var("QUIZ_CONTENT_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Some(Self {
            base_url,
            api_key,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// HTTP question provider: `POST {base_url}/questions` with the request as JSON.
#[derive(Clone)]
pub struct HttpContentProvider {
    client: Client,
    config: Option<ContentConfig>,
}

impl HttpContentProvider {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ContentConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<ContentConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl ContentProvider for HttpContentProvider {
    #[instrument(level = "debug", skip(self, request), fields(concept = %request.concept))]
    async fn fetch_questions(
        &self,
        request: &ContentRequest,
    ) -> Result<Vec<ProviderQuestion>, ContentError> {
        let config = self.config.as_ref().ok_or(ContentError::Disabled)?;

        let url = format!("{}/questions", config.base_url.trim_end_matches('/'));
        let mut builder = self
            .client
            .post(url)
            .timeout(config.timeout)
            .json(request);
        if let Some(key) = &config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(ContentError::HttpStatus(response.status()));
        }

        let body: ProviderResponse = response.json().await?;
        let questions = body.into_questions();
        debug!(count = questions.len(), "provider returned questions");
        Ok(questions)
    }
}

/// Providers answer with either a bare list or `{ "questions": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProviderResponse {
    Bare(Vec<ProviderQuestion>),
    Wrapped {
        #[serde(default)]
        questions: Vec<ProviderQuestion>,
    },
}

impl ProviderResponse {
    fn into_questions(self) -> Vec<ProviderQuestion> {
        match self {
            Self::Bare(questions) | Self::Wrapped { questions } => questions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_accepts_both_shapes() {
        let bare: ProviderResponse =
            serde_json::from_str(r#"[{"question": "Q?", "answer": "A"}]"#).unwrap();
        assert_eq!(bare.into_questions().len(), 1);

        let wrapped: ProviderResponse =
            serde_json::from_str(r#"{"questions": [{"prompt": "Q?"}, {"prompt": "R?"}]}"#)
                .unwrap();
        assert_eq!(wrapped.into_questions().len(), 2);
    }

    #[tokio::test]
    async fn disabled_provider_errors_without_network() {
        let provider = HttpContentProvider::new(None);
        assert!(!provider.enabled());
        let request = ContentRequest {
            institution: None,
            course: "Biology".into(),
            goal: "Exam".into(),
            concept: "Cells".into(),
        };
        let err = provider.fetch_questions(&request).await.unwrap_err();
        assert!(matches!(err, ContentError::Disabled));
    }
}
