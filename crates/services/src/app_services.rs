use std::sync::Arc;

use quiz_core::model::ContentRequest;
use storage::ProgressStore;
use storage::repository::Storage;
use tracing::info;

use crate::Clock;
use crate::bank::QuestionBank;
use crate::content::{BankLoader, ContentProvider, HttpContentProvider};
use crate::error::AppServicesError;
use crate::plan_service::StudyPlanService;
use crate::sessions::{RoundConfig, RoundController};

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    rounds: Arc<RoundController>,
    plan: Arc<StudyPlanService>,
    loader: BankLoader,
}

impl AppServices {
    /// Build services backed by `SQLite` storage, with the content provider
    /// and round size taken from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let provider = HttpContentProvider::from_env();
        let loader = if provider.enabled() {
            info!("content provider configured");
            BankLoader::new(Some(Arc::new(provider) as Arc<dyn ContentProvider>))
        } else {
            info!("no content provider configured; using embedded question bank");
            BankLoader::embedded_only()
        };
        Ok(Self::from_storage(
            &storage,
            clock,
            RoundConfig::from_env(),
            loader,
        ))
    }

    /// Build services over in-memory storage and the embedded bank.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(
            &Storage::in_memory(),
            clock,
            RoundConfig::default(),
            BankLoader::embedded_only(),
        )
    }

    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        config: RoundConfig,
        loader: BankLoader,
    ) -> Self {
        let store = ProgressStore::new(Arc::clone(&storage.kv));
        Self {
            rounds: Arc::new(RoundController::new(clock, store.clone(), config)),
            plan: Arc::new(StudyPlanService::new(store)),
            loader,
        }
    }

    #[must_use]
    pub fn rounds(&self) -> Arc<RoundController> {
        Arc::clone(&self.rounds)
    }

    #[must_use]
    pub fn plan(&self) -> Arc<StudyPlanService> {
        Arc::clone(&self.plan)
    }

    /// Load the question bank for the learner's current round.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Storage` if reading the profile fails.
    /// Provider failures fall back to the embedded bank.
    pub async fn load_bank(&self) -> Result<QuestionBank, AppServicesError> {
        let request: Option<ContentRequest> = self.plan.content_request().await?;
        Ok(self.loader.load(request.as_ref()).await)
    }
}
