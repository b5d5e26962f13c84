use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{QuestionFormat, QuestionId};

/// Number of questions drawn into a round when enough are available.
pub const DEFAULT_ROUND_SIZE: usize = 7;

/// Persisted state of the learner's current round plus lifetime counters.
///
/// `formats` holds the format of every question that has been touched, so it
/// carries over from one round to the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    pub round_number: u32,
    #[serde(default)]
    pub selected_question_ids: Vec<QuestionId>,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub round_complete: bool,
    #[serde(default)]
    pub completed_rounds: u32,
    #[serde(default)]
    pub total_answered: u32,
    #[serde(default)]
    pub total_correct: u32,
    #[serde(default)]
    pub formats: BTreeMap<QuestionId, QuestionFormat>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Default for RoundState {
    fn default() -> Self {
        Self {
            round_number: 1,
            selected_question_ids: Vec::new(),
            progress: 0,
            round_complete: false,
            completed_rounds: 0,
            total_answered: 0,
            total_correct: 0,
            formats: BTreeMap::new(),
            started_at: None,
            completed_at: None,
        }
    }
}

impl RoundState {
    /// Fraction of answers that were correct, `None` before the first answer.
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        if self.total_answered == 0 {
            None
        } else {
            Some(f64::from(self.total_correct) / f64::from(self.total_answered))
        }
    }

    /// Accuracy rounded to a whole percentage; 0 before the first answer.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn accuracy_percent(&self) -> u32 {
        self.accuracy()
            .map_or(0, |acc| (acc * 100.0).round().clamp(0.0, 100.0) as u32)
    }

    /// True when a selection exists and the round has not been marked complete.
    #[must_use]
    pub fn has_open_selection(&self) -> bool {
        !self.round_complete && !self.selected_question_ids.is_empty()
    }

    /// Clamps counters that cannot be valid into safe values.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if self.round_number == 0 {
            self.round_number = 1;
        }

        let mut seen = HashSet::new();
        self.selected_question_ids.retain(|id| seen.insert(*id));

        let size = u32::try_from(self.selected_question_ids.len()).unwrap_or(u32::MAX);
        self.progress = self.progress.min(size);
        self.total_correct = self.total_correct.min(self.total_answered);
        let max_completed = if self.round_complete {
            self.round_number
        } else {
            self.round_number - 1
        };
        self.completed_rounds = self.completed_rounds.min(max_completed);
        if let (Some(started), Some(completed)) = (self.started_at, self.completed_at) {
            if completed < started {
                self.completed_at = None;
            }
        }
        self
    }
}
