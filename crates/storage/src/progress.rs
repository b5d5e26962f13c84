use std::sync::Arc;

use quiz_core::model::{RoundState, StudyProfile};
use tracing::{debug, warn};

use crate::mapping::{decode_round_state, ser};
use crate::repository::{KeyValueStore, StorageError};

/// Key holding the JSON-encoded `RoundState`.
pub const ROUND_STATE_KEY: &str = "quiz.round_state";

/// Key holding the JSON-encoded `StudyProfile`.
pub const PROFILE_KEY: &str = "quiz.profile";

/// The single place round progress and the onboarding profile are read from
/// and written to.
///
/// Corrupt round state never fails a load: unreadable fields fall back to
/// their defaults and the rest is kept.
#[derive(Clone)]
pub struct ProgressStore {
    kv: Arc<dyn KeyValueStore>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Load the persisted round state, or the default state when none exists.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the backend itself fails.
    pub async fn load(&self) -> Result<RoundState, StorageError> {
        let Some(raw) = self.kv.get(ROUND_STATE_KEY).await? else {
            return Ok(RoundState::default());
        };

        match decode_round_state(&raw) {
            Ok(decoded) => {
                if !decoded.repaired.is_empty() {
                    warn!(
                        target: "storage",
                        fields = ?decoded.repaired,
                        "persisted round state had invalid fields; reset to defaults"
                    );
                }
                Ok(decoded.state)
            }
            Err(err) => {
                warn!(target: "storage", error = %err, "discarding unreadable round state");
                Ok(RoundState::default())
            }
        }
    }

    /// Persist the round state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the backend write fails.
    pub async fn save(&self, state: &RoundState) -> Result<(), StorageError> {
        let raw = serde_json::to_string(state).map_err(ser)?;
        self.kv.set(ROUND_STATE_KEY, &raw).await?;
        debug!(
            target: "storage",
            round = state.round_number,
            progress = state.progress,
            "round state saved"
        );
        Ok(())
    }

    /// Load the onboarding profile, if the learner has completed onboarding.
    ///
    /// An unreadable profile is treated as missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only if the backend itself fails.
    pub async fn load_profile(&self) -> Result<Option<StudyProfile>, StorageError> {
        let Some(raw) = self.kv.get(PROFILE_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(err) => {
                warn!(target: "storage", error = %err, "discarding unreadable study profile");
                Ok(None)
            }
        }
    }

    /// Persist the onboarding profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the backend write fails.
    pub async fn save_profile(&self, profile: &StudyProfile) -> Result<(), StorageError> {
        let raw = serde_json::to_string(profile).map_err(ser)?;
        self.kv.set(PROFILE_KEY, &raw).await
    }

    /// Forget all round progress. The profile is kept.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend write fails.
    pub async fn reset(&self) -> Result<(), StorageError> {
        self.kv.remove(ROUND_STATE_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use quiz_core::model::QuestionId;

    fn store() -> (InMemoryRepository, ProgressStore) {
        let repo = InMemoryRepository::new();
        let store = ProgressStore::new(Arc::new(repo.clone()));
        (repo, store)
    }

    #[tokio::test]
    async fn missing_state_loads_default() {
        let (_, store) = store();
        assert_eq!(store.load().await.unwrap(), RoundState::default());
        assert!(store.load_profile().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load() {
        let (_, store) = store();
        let state = RoundState {
            round_number: 2,
            selected_question_ids: vec![QuestionId::new(5)],
            progress: 1,
            ..RoundState::default()
        };
        store.save(&state).await.unwrap();
        assert_eq!(store.load().await.unwrap(), state);

        store.reset().await.unwrap();
        assert_eq!(store.load().await.unwrap(), RoundState::default());
    }

    #[tokio::test]
    async fn garbage_state_falls_back_to_default() {
        let (repo, store) = store();
        repo.set(ROUND_STATE_KEY, "{not json").await.unwrap();
        assert_eq!(store.load().await.unwrap(), RoundState::default());

        repo.set(PROFILE_KEY, "42").await.unwrap();
        assert!(store.load_profile().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_round_trips() {
        let (_, store) = store();
        let profile =
            StudyProfile::new(None, "Biology", "Midterm", vec!["Cells".to_string()]).unwrap();
        store.save_profile(&profile).await.unwrap();
        assert_eq!(store.load_profile().await.unwrap(), Some(profile));
    }
}
