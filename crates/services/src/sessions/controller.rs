use quiz_core::Clock;
use quiz_core::model::{AnswerOutcome, QuestionId, RoundState};
use rand::SeedableRng;
use rand::rngs::StdRng;
use storage::ProgressStore;
use tracing::{debug, info, warn};

use super::config::RoundConfig;
use super::round::{AnswerResult, PresentedQuestion, RoundSession};
use super::selection::RoundSelector;
use crate::bank::QuestionBank;
use crate::error::RoundError;

/// Orchestrates round start and persisted answering.
#[derive(Clone)]
pub struct RoundController {
    clock: Clock,
    store: ProgressStore,
    selector: RoundSelector,
    seed: Option<u64>,
}

impl RoundController {
    #[must_use]
    pub fn new(clock: Clock, store: ProgressStore, config: RoundConfig) -> Self {
        Self {
            clock,
            store,
            selector: RoundSelector::new(config),
            seed: None,
        }
    }

    /// Use a fixed seed for shuffling so selections are reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn config(&self) -> RoundConfig {
        self.selector.config()
    }

    #[must_use]
    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    /// Load the persisted round state.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::Storage` if the backend fails.
    pub async fn round_state(&self) -> Result<RoundState, RoundError> {
        Ok(self.store.load().await?)
    }

    /// Resume the unfinished round or open the next one.
    ///
    /// Persisted formats are applied to `bank` first. A round already marked
    /// complete, or a selection whose questions are all in the bank and
    /// completed, opens round `n + 1`. A selection whose open questions are
    /// missing from the bank is redrawn within the same round.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::PoolExhausted` when no question is left to
    /// study, or `RoundError::Storage` if the backend fails.
    pub async fn start_round(&self, bank: &mut QuestionBank) -> Result<RoundSession, RoundError> {
        let mut state = self.store.load().await?;
        bank.apply_formats(&state.formats);

        let open = state.has_open_selection();
        let resumable = open
            && state
                .selected_question_ids
                .iter()
                .any(|id| bank.get(*id).is_some_and(|q| !q.is_completed()));
        let finished_unmarked = open
            && state
                .selected_question_ids
                .iter()
                .all(|id| bank.get(*id).is_some_and(|q| q.is_completed()));

        if state.round_complete || finished_unmarked {
            if finished_unmarked {
                state.completed_rounds = state.completed_rounds.saturating_add(1);
            }
            state.round_number = state.round_number.saturating_add(1);
            state.round_complete = false;
            state.selected_question_ids.clear();
            state.progress = 0;
            state.started_at = None;
            state.completed_at = None;
        } else if open && !resumable {
            // Selection belongs to another bank; redraw without crediting it.
            warn!(
                round = state.round_number,
                missing = state
                    .selected_question_ids
                    .iter()
                    .filter(|id| !bank.contains(**id))
                    .count(),
                "saved selection is not in the current bank; drawing a new one"
            );
            state.selected_question_ids.clear();
            state.progress = 0;
            state.started_at = None;
            state.completed_at = None;
        }

        let previous: &[QuestionId] = if resumable {
            &state.selected_question_ids
        } else {
            &[]
        };
        let selected = match self.seed {
            Some(seed) => self
                .selector
                .select(previous, bank, &mut StdRng::seed_from_u64(seed)),
            None => self.selector.select(previous, bank, &mut rand::rng()),
        };
        if selected.is_empty() {
            warn!(
                round = state.round_number,
                bank = bank.len(),
                "no questions left to study"
            );
            return Err(RoundError::PoolExhausted);
        }

        let now = self.clock.now();
        let started_at = if resumable {
            state.started_at.unwrap_or(now)
        } else {
            now
        };
        let session = RoundSession::new(state.round_number, selected, bank, started_at)?;

        state.selected_question_ids = session.selected().to_vec();
        state.progress = u32::try_from(session.progress().completed).unwrap_or(u32::MAX);
        state.started_at = Some(started_at);
        state.completed_at = None;
        state.formats.extend(bank.formats());
        self.store.save(&state).await?;

        info!(
            round = state.round_number,
            size = session.selected().len(),
            resumed = resumable,
            "round started"
        );
        Ok(session)
    }

    /// Pick the next question of `session`.
    ///
    /// When pacing shows the question in a different format than the one
    /// stored, the new format is persisted right away so it survives a quit
    /// before the answer.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::Storage` if the backend fails.
    pub async fn next_question(
        &self,
        session: &mut RoundSession,
        bank: &mut QuestionBank,
    ) -> Result<Option<PresentedQuestion>, RoundError> {
        let Some(shown) = session.next_question(bank) else {
            return Ok(None);
        };

        let mut state = self.store.load().await?;
        if state.formats.get(&shown.id) != Some(&shown.format) {
            state.formats.insert(shown.id, shown.format);
            self.store.save(&state).await?;
            debug!(question = %shown.id, format = %shown.format, "display format persisted");
        }
        Ok(Some(shown))
    }

    /// Record an answer and persist the updated round state.
    ///
    /// # Errors
    ///
    /// Returns the session's `RoundError` unchanged, or
    /// `RoundError::Storage` if the backend fails.
    pub async fn record_answer(
        &self,
        session: &mut RoundSession,
        bank: &mut QuestionBank,
        id: QuestionId,
        outcome: AnswerOutcome,
    ) -> Result<AnswerResult, RoundError> {
        let now = self.clock.now();
        let result = session.record_answer(bank, id, outcome, now)?;

        let mut state = self.store.load().await?;
        state.round_number = session.round_number();
        state.selected_question_ids = session.selected().to_vec();
        state.progress = u32::try_from(result.progress.completed).unwrap_or(u32::MAX);
        state.started_at = Some(session.started_at());
        if result.counted {
            state.total_answered = state.total_answered.saturating_add(1);
            if outcome.is_correct() {
                state.total_correct = state.total_correct.saturating_add(1);
            }
        }
        for question_id in session.selected() {
            if let Some(question) = bank.get(*question_id) {
                state.formats.insert(*question_id, question.format());
            }
        }
        if result.round_complete() && !state.round_complete {
            state.round_complete = true;
            state.completed_rounds = state.completed_rounds.saturating_add(1);
            state.completed_at = session.completed_at().or(Some(now));
        }

        self.store.save(&state).await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Question, QuestionFormat};
    use quiz_core::time::fixed_clock;
    use storage::Storage;

    use crate::bank::BankSource;
    use crate::sessions::Navigation;

    fn controller(size: usize) -> RoundController {
        let storage = Storage::in_memory();
        RoundController::new(
            fixed_clock(),
            ProgressStore::new(storage.kv),
            RoundConfig::default().with_target_size(size).with_shuffle(false),
        )
    }

    #[tokio::test]
    async fn start_round_persists_selection() {
        let controller = controller(3);
        let mut bank = QuestionBank::seeded();
        let session = controller.start_round(&mut bank).await.unwrap();
        assert_eq!(session.round_number(), 1);
        assert_eq!(session.selected().len(), 3);

        let state = controller.round_state().await.unwrap();
        assert_eq!(state.selected_question_ids, session.selected());
        assert_eq!(state.started_at, Some(session.started_at()));
    }

    #[tokio::test]
    async fn unfinished_round_is_resumed() {
        let controller = controller(3);
        let mut bank = QuestionBank::seeded();
        let first = controller.start_round(&mut bank).await.unwrap();

        let mut reloaded = QuestionBank::seeded();
        let second = controller.start_round(&mut reloaded).await.unwrap();
        assert_eq!(second.round_number(), 1);
        assert_eq!(second.selected(), first.selected());
    }

    #[tokio::test]
    async fn completed_round_opens_the_next_one() {
        let controller = controller(2);
        let mut bank = QuestionBank::seeded();
        let mut session = controller.start_round(&mut bank).await.unwrap();

        let mut last = None;
        while let Some(shown) = session.next_question(&mut bank) {
            let outcome = match shown.format {
                QuestionFormat::Flashcard | QuestionFormat::Matching => AnswerOutcome::Reviewed,
                _ => AnswerOutcome::Correct,
            };
            last = Some(
                controller
                    .record_answer(&mut session, &mut bank, shown.id, outcome)
                    .await
                    .unwrap(),
            );
        }
        assert_eq!(last.unwrap().navigation, Navigation::PlanView);

        let state = controller.round_state().await.unwrap();
        assert!(state.round_complete);
        assert_eq!(state.completed_rounds, 1);
        assert_eq!(state.total_answered, 2);
        assert_eq!(state.accuracy_percent(), 100);

        let mut reloaded = QuestionBank::seeded();
        let next = controller.start_round(&mut reloaded).await.unwrap();
        assert_eq!(next.round_number(), 2);
        assert!(next.selected().iter().all(|id| !session.selected().contains(id)));
    }

    #[tokio::test]
    async fn pacing_override_is_saved_before_the_answer() {
        let controller = controller(3);
        let questions = (1..=3)
            .map(|id| {
                Question::new(QuestionId::new(id), format!("Q{id}?"), format!("A{id}"), vec![])
                    .unwrap()
                    .with_format(QuestionFormat::Flashcard)
            })
            .collect();
        let mut bank = QuestionBank::new(questions, BankSource::Provider);
        let mut session = controller.start_round(&mut bank).await.unwrap();

        let first = controller
            .next_question(&mut session, &mut bank)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.format, QuestionFormat::Flashcard);
        let second = controller
            .next_question(&mut session, &mut bank)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.format, QuestionFormat::MultipleChoice);

        // No answer recorded: the override must already be stored.
        let state = controller.round_state().await.unwrap();
        assert_eq!(
            state.formats.get(&second.id),
            Some(&QuestionFormat::MultipleChoice)
        );
    }

    #[tokio::test]
    async fn exhausted_pool_is_reported() {
        let controller = controller(12);
        let mut bank = QuestionBank::seeded();
        for id in bank.ids() {
            bank.get_mut(id).unwrap().set_format(QuestionFormat::Completed);
        }
        let err = controller.start_round(&mut bank).await.unwrap_err();
        assert!(matches!(err, RoundError::PoolExhausted));
    }

    #[tokio::test]
    async fn seeded_controllers_draw_the_same_round() {
        let make = || {
            RoundController::new(
                fixed_clock(),
                ProgressStore::new(Storage::in_memory().kv),
                RoundConfig::default(),
            )
            .with_seed(11)
        };
        let a = make().start_round(&mut QuestionBank::seeded()).await.unwrap();
        let b = make().start_round(&mut QuestionBank::seeded()).await.unwrap();
        assert_eq!(a.selected(), b.selected());
    }
}
