use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use quiz_core::matching::{MATCHING_PAIR_COUNT, MatchingBoard, MatchingError, MatchingPair};
use quiz_core::model::{AnswerOutcome, FormatTransition, QuestionFormat, QuestionId};
use quiz_core::scoring::AnswerScorer;
use quiz_core::selector::PacingGuard;
use tracing::{debug, info};

use super::progress::RoundProgress;
use crate::bank::QuestionBank;
use crate::error::RoundError;

/// Where the caller should go after an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Round finished; show the study plan.
    PlanView,
    /// Keep studying.
    StudyView,
}

/// A question as it should be rendered right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedQuestion {
    pub id: QuestionId,
    pub format: QuestionFormat,
    pub prompt: String,
    pub correct_answer: String,
    pub options: Vec<String>,
}

impl PresentedQuestion {
    /// Grade a multiple-choice pick.
    #[must_use]
    pub fn grade_choice(&self, choice: &str) -> AnswerOutcome {
        AnswerOutcome::from_correct(choice.trim().eq_ignore_ascii_case(self.correct_answer.trim()))
    }

    /// Grade a free-text answer.
    #[must_use]
    pub fn grade_written(&self, scorer: &dyn AnswerScorer, text: &str) -> AnswerOutcome {
        AnswerOutcome::from_correct(scorer.accepts(&self.correct_answer, text))
    }
}

/// Outcome of recording one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerResult {
    pub transition: FormatTransition,
    pub progress: RoundProgress,
    pub navigation: Navigation,
    /// Whether the answer counts toward overall accuracy.
    pub counted: bool,
}

impl AnswerResult {
    #[must_use]
    pub fn round_complete(&self) -> bool {
        self.progress.is_complete
    }
}

/// One round of study over a fixed selection of questions.
///
/// Questions cycle in selection order until each one reaches `Completed`.
/// The round is complete only when every selected question is completed.
#[derive(Debug, Clone)]
pub struct RoundSession {
    round_number: u32,
    selected: Vec<QuestionId>,
    completed: BTreeSet<QuestionId>,
    pacing: PacingGuard,
    cursor: usize,
    current: Option<QuestionId>,
    advancing: bool,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    answered: u32,
    correct: u32,
}

impl RoundSession {
    /// Opens a round over `selected`.
    ///
    /// Ids missing from the bank are dropped; already completed ones count
    /// toward progress.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::PoolExhausted` when nothing selectable remains.
    pub fn new(
        round_number: u32,
        selected: Vec<QuestionId>,
        bank: &QuestionBank,
        started_at: DateTime<Utc>,
    ) -> Result<Self, RoundError> {
        let mut unique = BTreeSet::new();
        let selected: Vec<QuestionId> = selected
            .into_iter()
            .filter(|id| bank.contains(*id) && unique.insert(*id))
            .collect();
        if selected.is_empty() {
            return Err(RoundError::PoolExhausted);
        }

        let completed = selected
            .iter()
            .copied()
            .filter(|id| bank.get(*id).is_some_and(|q| q.is_completed()))
            .collect();

        Ok(Self {
            round_number: round_number.max(1),
            selected,
            completed,
            pacing: PacingGuard::new(),
            cursor: 0,
            current: None,
            advancing: false,
            started_at,
            completed_at: None,
            answered: 0,
            correct: 0,
        })
    }

    #[must_use]
    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    #[must_use]
    pub fn selected(&self) -> &[QuestionId] {
        &self.selected
    }

    #[must_use]
    pub fn current(&self) -> Option<QuestionId> {
        self.current
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Answers counted toward accuracy in this round.
    #[must_use]
    pub fn answered(&self) -> u32 {
        self.answered
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn progress(&self) -> RoundProgress {
        RoundProgress::new(self.selected.len(), self.completed.len())
    }

    #[must_use]
    pub fn is_round_complete(&self) -> bool {
        self.progress().is_complete
    }

    /// Picks the next unfinished question, cycling through the selection.
    ///
    /// The pacing guard may downgrade a review format to multiple choice; the
    /// downgrade is written back to the question. Returns `None` once the
    /// round is complete.
    pub fn next_question(&mut self, bank: &mut QuestionBank) -> Option<PresentedQuestion> {
        if self.is_round_complete() {
            return None;
        }

        let can_match = bank.len() >= MATCHING_PAIR_COUNT;
        let count = self.selected.len();
        for step in 0..count {
            let index = (self.cursor + step) % count;
            let id = self.selected[index];
            if self.completed.contains(&id) {
                continue;
            }
            let Some(question) = bank.get_mut(id) else {
                continue;
            };
            if question.is_completed() {
                self.completed.insert(id);
                continue;
            }

            let mut candidate = question.format();
            if candidate == QuestionFormat::Matching && !can_match {
                candidate = QuestionFormat::MultipleChoice;
            }
            let shown = self.pacing.resolve(candidate);
            if shown != question.format() {
                debug!(
                    question = %id,
                    from = %question.format(),
                    to = %shown,
                    "format overridden before display"
                );
                question.set_format(shown);
            }

            self.cursor = (index + 1) % count;
            self.current = Some(id);
            return Some(PresentedQuestion {
                id,
                format: shown,
                prompt: question.prompt().to_owned(),
                correct_answer: question.correct_answer().to_owned(),
                options: question.options().to_vec(),
            });
        }

        None
    }

    /// Applies an answer to a question of this round.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::Completed` once the round is over,
    /// `RoundError::NotInRound` for ids outside the selection and
    /// `RoundError::UnknownQuestion` when the bank lost the question.
    pub fn record_answer(
        &mut self,
        bank: &mut QuestionBank,
        id: QuestionId,
        outcome: AnswerOutcome,
        at: DateTime<Utc>,
    ) -> Result<AnswerResult, RoundError> {
        if self.is_round_complete() {
            return Err(RoundError::Completed);
        }
        if !self.selected.contains(&id) {
            return Err(RoundError::NotInRound(id));
        }
        let question = bank.get_mut(id).ok_or(RoundError::UnknownQuestion(id))?;

        let was_completed = question.is_completed();
        let transition = question.apply_outcome(outcome);
        let counted = !was_completed && outcome != AnswerOutcome::Reviewed;
        if counted {
            self.answered = self.answered.saturating_add(1);
            if outcome.is_correct() {
                self.correct = self.correct.saturating_add(1);
            }
        }
        if transition.to.is_terminal() {
            self.completed.insert(id);
        }
        if self.current == Some(id) {
            self.current = None;
        }

        debug!(
            round = self.round_number,
            question = %id,
            from = %transition.from,
            to = %transition.to,
            ?outcome,
            "answer recorded"
        );

        let progress = self.progress();
        let navigation = if progress.is_complete {
            self.completed_at.get_or_insert(at);
            info!(
                round = self.round_number,
                questions = progress.total,
                "round complete"
            );
            Navigation::PlanView
        } else {
            Navigation::StudyView
        };

        Ok(AnswerResult {
            transition,
            progress,
            navigation,
            counted,
        })
    }

    /// Claims the "advance to next question" step.
    ///
    /// Returns false while another advance is in flight, so a double submit
    /// cannot skip a question.
    pub fn try_begin_advance(&mut self) -> bool {
        if self.advancing {
            debug!(round = self.round_number, "advance already in flight; ignored");
            return false;
        }
        self.advancing = true;
        true
    }

    pub fn finish_advance(&mut self) {
        self.advancing = false;
    }

    #[must_use]
    pub fn is_advancing(&self) -> bool {
        self.advancing
    }

    /// Three prompt/answer pairs for a matching exercise on `id`: the
    /// question itself plus two partners, preferring this round's selection.
    #[must_use]
    pub fn matching_pairs(&self, bank: &QuestionBank, id: QuestionId) -> Vec<MatchingPair> {
        let Some(anchor) = bank.get(id) else {
            return Vec::new();
        };
        let partners = self
            .selected
            .iter()
            .copied()
            .chain(bank.ids())
            .filter(|other| *other != id)
            .collect::<Vec<_>>();

        let mut seen = BTreeSet::from([id]);
        let mut pairs = vec![MatchingPair {
            question_id: id,
            prompt: anchor.prompt().to_owned(),
            answer: anchor.correct_answer().to_owned(),
        }];
        for other in partners {
            if pairs.len() == MATCHING_PAIR_COUNT {
                break;
            }
            if !seen.insert(other) {
                continue;
            }
            let Some(question) = bank.get(other) else {
                continue;
            };
            if pairs
                .iter()
                .any(|p| p.answer.eq_ignore_ascii_case(question.correct_answer()))
            {
                continue;
            }
            pairs.push(MatchingPair {
                question_id: other,
                prompt: question.prompt().to_owned(),
                answer: question.correct_answer().to_owned(),
            });
        }
        pairs
    }

    /// A shuffled matching board for `id`.
    ///
    /// # Errors
    ///
    /// Returns `MatchingError::WrongPairCount` when the bank cannot supply
    /// enough distinct partners.
    pub fn matching_board(
        &self,
        bank: &QuestionBank,
        id: QuestionId,
    ) -> Result<MatchingBoard, MatchingError> {
        MatchingBoard::shuffled(self.matching_pairs(bank, id), &mut rand::rng())
    }
}
