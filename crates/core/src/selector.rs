//! Format selection: which presentation format a question moves to after an
//! answer, and the session-wide pacing rule that keeps two review formats from
//! being shown back to back.

use crate::model::{AnswerOutcome, QuestionFormat};

//
// ─── TRANSITIONS ───────────────────────────────────────────────────────────────
//

/// Computes the next format for a question given the outcome in its current
/// format.
///
/// | current          | correct          | otherwise        |
/// |------------------|------------------|------------------|
/// | multiple_choice  | completed        | flashcard        |
/// | written          | completed        | matching         |
/// | flashcard        | multiple_choice  | multiple_choice  |
/// | matching         | multiple_choice  | multiple_choice  |
/// | completed        | completed        | completed        |
///
/// `Reviewed` counts as not-correct on the high-stakes formats.
#[must_use]
pub fn next_format(current: QuestionFormat, outcome: AnswerOutcome) -> QuestionFormat {
    match (current, outcome.is_correct()) {
        (QuestionFormat::MultipleChoice | QuestionFormat::Written, true) => {
            QuestionFormat::Completed
        }
        (QuestionFormat::MultipleChoice, false) => QuestionFormat::Flashcard,
        (QuestionFormat::Written, false) => QuestionFormat::Matching,
        (QuestionFormat::Flashcard | QuestionFormat::Matching, _) => {
            QuestionFormat::MultipleChoice
        }
        (QuestionFormat::Completed, _) => QuestionFormat::Completed,
    }
}

//
// ─── PACING ────────────────────────────────────────────────────────────────────
//

/// Rolling "last shown format" for a study session.
///
/// Tracks the format of the last displayed question, whichever question it
/// was, and downgrades a review format to multiple choice when a review
/// format was the last thing shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacingGuard {
    last_shown: Option<QuestionFormat>,
}

impl PacingGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the format to display for `candidate` and records it as shown.
    pub fn resolve(&mut self, candidate: QuestionFormat) -> QuestionFormat {
        let resolved = if candidate.is_review() && self.last_shown.is_some_and(QuestionFormat::is_review)
        {
            QuestionFormat::MultipleChoice
        } else {
            candidate
        };
        self.last_shown = Some(resolved);
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use QuestionFormat::{Completed, Flashcard, Matching, MultipleChoice, Written};

    #[test]
    fn transition_table_is_exact() {
        let table = [
            (MultipleChoice, AnswerOutcome::Correct, Completed),
            (MultipleChoice, AnswerOutcome::Incorrect, Flashcard),
            (Written, AnswerOutcome::Correct, Completed),
            (Written, AnswerOutcome::Incorrect, Matching),
            (Flashcard, AnswerOutcome::Correct, MultipleChoice),
            (Flashcard, AnswerOutcome::Incorrect, MultipleChoice),
            (Matching, AnswerOutcome::Correct, MultipleChoice),
            (Matching, AnswerOutcome::Incorrect, MultipleChoice),
        ];
        for (from, outcome, expected) in table {
            assert_eq!(next_format(from, outcome), expected, "{from} / {outcome:?}");
        }
    }

    #[test]
    fn reviewed_outcome_never_masters() {
        assert_eq!(next_format(MultipleChoice, AnswerOutcome::Reviewed), Flashcard);
        assert_eq!(next_format(Written, AnswerOutcome::Reviewed), Matching);
        assert_eq!(next_format(Flashcard, AnswerOutcome::Reviewed), MultipleChoice);
    }

    #[test]
    fn completed_is_absorbing() {
        for outcome in [
            AnswerOutcome::Correct,
            AnswerOutcome::Incorrect,
            AnswerOutcome::Reviewed,
        ] {
            assert_eq!(next_format(Completed, outcome), Completed);
        }
    }

    #[test]
    fn pacing_blocks_back_to_back_review_formats() {
        let mut guard = PacingGuard::new();
        assert_eq!(guard.resolve(Flashcard), Flashcard);
        assert_eq!(guard.resolve(Matching), MultipleChoice);
        assert_eq!(guard.resolve(Flashcard), Flashcard);
        assert_eq!(guard.resolve(Flashcard), MultipleChoice);
        assert_eq!(guard.resolve(Matching), Matching);
    }

    #[test]
    fn pacing_leaves_high_stakes_formats_alone() {
        let mut guard = PacingGuard::new();
        guard.resolve(Matching);
        assert_eq!(guard.resolve(Written), Written);
        assert_eq!(guard.resolve(Matching), Matching);
    }

    #[test]
    fn no_adjacent_review_pair_in_any_sequence() {
        // Exhaustive over all candidate sequences of length 4.
        let formats = [MultipleChoice, Written, Flashcard, Matching];
        for a in formats {
            for b in formats {
                for c in formats {
                    for d in formats {
                        let mut guard = PacingGuard::new();
                        let shown: Vec<_> = [a, b, c, d]
                            .into_iter()
                            .map(|f| guard.resolve(f))
                            .collect();
                        assert!(
                            shown.windows(2).all(|w| !(w[0].is_review() && w[1].is_review())),
                            "{shown:?}"
                        );
                    }
                }
            }
        }
    }
}
