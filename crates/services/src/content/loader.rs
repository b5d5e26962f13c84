use std::sync::Arc;

use quiz_core::model::ContentRequest;
use tracing::{info, warn};

use super::mapping::map_provider_questions;
use super::provider::ContentProvider;
use crate::bank::{BankSource, QuestionBank};
use crate::error::ContentError;

/// Builds the question bank for a round, preferring the provider and falling
/// back to the embedded bank on any failure.
#[derive(Clone, Default)]
pub struct BankLoader {
    provider: Option<Arc<dyn ContentProvider>>,
}

impl BankLoader {
    #[must_use]
    pub fn new(provider: Option<Arc<dyn ContentProvider>>) -> Self {
        Self { provider }
    }

    #[must_use]
    pub fn embedded_only() -> Self {
        Self { provider: None }
    }

    /// Fetch and map provider questions; never fails.
    ///
    /// Without a provider or a request (learner not onboarded yet) the
    /// embedded bank is returned directly.
    pub async fn load(&self, request: Option<&ContentRequest>) -> QuestionBank {
        let (Some(provider), Some(request)) = (&self.provider, request) else {
            return QuestionBank::seeded();
        };

        match self.fetch(provider.as_ref(), request).await {
            Ok(bank) => {
                info!(
                    concept = %request.concept,
                    questions = bank.len(),
                    "loaded question bank from provider"
                );
                bank
            }
            Err(err) => {
                warn!(
                    concept = %request.concept,
                    error = %err,
                    "content provider unavailable; using embedded question bank"
                );
                QuestionBank::seeded()
            }
        }
    }

    async fn fetch(
        &self,
        provider: &dyn ContentProvider,
        request: &ContentRequest,
    ) -> Result<QuestionBank, ContentError> {
        let raw = provider.fetch_questions(request).await?;
        let questions = map_provider_questions(raw);
        if questions.is_empty() {
            return Err(ContentError::EmptyResult);
        }
        Ok(QuestionBank::new(questions, BankSource::Provider))
    }
}
