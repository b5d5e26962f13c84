use quiz_core::model::{ContentRequest, StudyPlan, StudyProfile};
use storage::ProgressStore;
use tracing::info;

use crate::error::AppServicesError;

/// Onboarding and the read-only study plan view.
#[derive(Clone)]
pub struct StudyPlanService {
    store: ProgressStore,
}

impl StudyPlanService {
    #[must_use]
    pub fn new(store: ProgressStore) -> Self {
        Self { store }
    }

    /// Save the learner's profile and start the plan over from round one.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Storage` if the backend fails.
    pub async fn onboard(&self, profile: &StudyProfile) -> Result<(), AppServicesError> {
        self.store.save_profile(profile).await?;
        self.store.reset().await?;
        info!(
            course = profile.course(),
            concepts = profile.concepts().len(),
            "learner onboarded"
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AppServicesError::Storage` if the backend fails.
    pub async fn profile(&self) -> Result<Option<StudyProfile>, AppServicesError> {
        Ok(self.store.load_profile().await?)
    }

    /// The plan for display, or `None` before onboarding.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Storage` if the backend fails.
    pub async fn plan_view(&self) -> Result<Option<StudyPlan>, AppServicesError> {
        let Some(profile) = self.store.load_profile().await? else {
            return Ok(None);
        };
        let state = self.store.load().await?;
        Ok(Some(StudyPlan::build(&profile, &state)))
    }

    /// What to ask the content provider for the round the learner is on.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Storage` if the backend fails.
    pub async fn content_request(&self) -> Result<Option<ContentRequest>, AppServicesError> {
        let Some(profile) = self.store.load_profile().await? else {
            return Ok(None);
        };
        let state = self.store.load().await?;
        let round = StudyPlan::build(&profile, &state)
            .current()
            .map_or(state.round_number, |entry| entry.round_number);
        Ok(Some(ContentRequest::for_round(&profile, round)))
    }
}
