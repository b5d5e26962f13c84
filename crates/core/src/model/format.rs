use serde::{Deserialize, Serialize};
use std::fmt;

//
// ─── QUESTION FORMAT ───────────────────────────────────────────────────────────
//

/// Presentation mode of a question.
///
/// `MultipleChoice` and `Written` are the high-stakes formats: a correct answer
/// retires the question. `Flashcard` and `Matching` are review formats that
/// re-expose the learner to the content before re-testing. `Completed` is
/// terminal.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum QuestionFormat {
    #[default]
    MultipleChoice,
    Written,
    Flashcard,
    Matching,
    Completed,
}

impl QuestionFormat {
    pub const ALL: [QuestionFormat; 5] = [
        QuestionFormat::MultipleChoice,
        QuestionFormat::Written,
        QuestionFormat::Flashcard,
        QuestionFormat::Matching,
        QuestionFormat::Completed,
    ];

    /// Flashcard or matching.
    #[must_use]
    pub fn is_review(self) -> bool {
        matches!(self, Self::Flashcard | Self::Matching)
    }

    /// Whether a correct answer in this format retires the question.
    #[must_use]
    pub fn counts_toward_mastery(self) -> bool {
        matches!(self, Self::MultipleChoice | Self::Written)
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple_choice",
            Self::Written => "written",
            Self::Flashcard => "flashcard",
            Self::Matching => "matching",
            Self::Completed => "completed",
        }
    }

    /// Parses the snake_case name, also accepting a few provider spellings
    /// (`"mcq"`, `"multiple-choice"`, `"open"`...).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "multiple_choice" | "multiplechoice" | "mcq" | "mc" => Some(Self::MultipleChoice),
            "written" | "open" | "short_answer" | "free_text" => Some(Self::Written),
            "flashcard" | "flash_card" => Some(Self::Flashcard),
            "matching" | "match" => Some(Self::Matching),
            "completed" | "done" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for QuestionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── ANSWER OUTCOME ────────────────────────────────────────────────────────────
//

/// What the learner did with the question that was shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    /// A review format was looked at without being graded (flashcard flipped).
    Reviewed,
}

impl AnswerOutcome {
    #[must_use]
    pub fn from_correct(correct: bool) -> Self {
        if correct { Self::Correct } else { Self::Incorrect }
    }

    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, Self::Correct)
    }
}
