use std::env;

use quiz_core::model::DEFAULT_ROUND_SIZE;

/// Knobs for drawing a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundConfig {
    target_size: usize,
    shuffle: bool,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_ROUND_SIZE,
            shuffle: true,
        }
    }
}

impl RoundConfig {
    /// Defaults, with `QUIZ_ROUND_SIZE` overriding the target size when it
    /// holds a positive integer.
    #[must_use]
    pub fn from_env() -> Self {
        let config = Self::default();
        match env::var("QUIZ_ROUND_SIZE")
            .ok()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
        {
            Some(size) if size > 0 => config.with_target_size(size),
            _ => config,
        }
    }

    /// Sets the number of questions per round; zero is raised to one.
    #[must_use]
    pub fn with_target_size(mut self, size: usize) -> Self {
        self.target_size = size.max(1);
        self
    }

    /// Enable or disable shuffling of the backfill pool.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn target_size(&self) -> usize {
        self.target_size
    }

    #[must_use]
    pub fn shuffle(&self) -> bool {
        self.shuffle
    }
}
