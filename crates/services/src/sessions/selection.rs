use std::collections::HashSet;

use quiz_core::model::QuestionId;
use rand::Rng;
use rand::seq::SliceRandom;

use super::config::RoundConfig;
use crate::bank::QuestionBank;

/// Picks the questions of a round from the bank.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundSelector {
    config: RoundConfig,
}

impl RoundSelector {
    #[must_use]
    pub fn new(config: RoundConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> RoundConfig {
        self.config
    }

    /// Build a round selection.
    ///
    /// - ids from `previous` that are still in the bank and not completed are
    ///   kept first, in their original order
    /// - the rest is backfilled from the remaining non-completed questions,
    ///   shuffled when enabled and in bank order otherwise
    /// - the result never exceeds the configured target size and never holds
    ///   duplicates or completed questions
    pub fn select<R: Rng + ?Sized>(
        &self,
        previous: &[QuestionId],
        bank: &QuestionBank,
        rng: &mut R,
    ) -> Vec<QuestionId> {
        let target = self.config.target_size();
        let available = bank.available_ids();
        let available_set: HashSet<QuestionId> = available.iter().copied().collect();

        let mut taken = HashSet::new();
        let mut selected: Vec<QuestionId> = previous
            .iter()
            .copied()
            .filter(|id| available_set.contains(id) && taken.insert(*id))
            .take(target)
            .collect();

        let remaining = target.saturating_sub(selected.len());
        if remaining > 0 {
            let mut pool: Vec<QuestionId> = available
                .into_iter()
                .filter(|id| !taken.contains(id))
                .collect();
            if self.config.shuffle() {
                pool.as_mut_slice().shuffle(rng);
            }
            selected.extend(pool.into_iter().take(remaining));
        }

        selected
    }
}
