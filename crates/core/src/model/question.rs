use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{AnswerOutcome, QuestionFormat, QuestionId};
use crate::selector::next_format;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("correct answer cannot be empty")]
    EmptyAnswer,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single question in the bank together with its mastery state.
///
/// `attempts` and `correct_count` only ever grow. Once `format` reaches
/// `Completed` the question is frozen: further outcomes are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    correct_answer: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    format: QuestionFormat,
    #[serde(default)]
    attempts: u32,
    #[serde(default)]
    correct_count: u32,
}

impl Question {
    /// Creates a question in the `MultipleChoice` format with zeroed counters.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyPrompt` or `QuestionError::EmptyAnswer` when
    /// the respective text is blank.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        correct_answer: impl Into<String>,
        options: Vec<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into().trim().to_owned();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        let correct_answer = correct_answer.into().trim().to_owned();
        if correct_answer.is_empty() {
            return Err(QuestionError::EmptyAnswer);
        }

        Ok(Self {
            id,
            prompt,
            correct_answer,
            options,
            format: QuestionFormat::MultipleChoice,
            attempts: 0,
            correct_count: 0,
        })
    }

    #[must_use]
    pub fn with_format(mut self, format: QuestionFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn format(&self) -> QuestionFormat {
        self.format
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.format.is_terminal()
    }

    /// True when `answer` is exactly one of the correct-answer spellings
    /// (case and surrounding whitespace ignored).
    #[must_use]
    pub fn is_correct_option(&self, answer: &str) -> bool {
        answer.trim().eq_ignore_ascii_case(&self.correct_answer)
    }

    pub fn set_options(&mut self, options: Vec<String>) {
        self.options = options;
    }

    /// Overrides the presentation format.
    ///
    /// A completed question stays completed; the call is ignored.
    pub fn set_format(&mut self, format: QuestionFormat) {
        if !self.is_completed() {
            self.format = format;
        }
    }

    /// Records an answer in the current format and moves to the next format.
    pub fn apply_outcome(&mut self, outcome: AnswerOutcome) -> FormatTransition {
        let from = self.format;
        if from.is_terminal() {
            return FormatTransition {
                question_id: self.id,
                from,
                to: from,
            };
        }

        self.attempts = self.attempts.saturating_add(1);
        if outcome.is_correct() {
            self.correct_count = self.correct_count.saturating_add(1);
        }
        self.format = next_format(from, outcome);

        FormatTransition {
            question_id: self.id,
            from,
            to: self.format,
        }
    }
}

/// The format change produced by one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatTransition {
    pub question_id: QuestionId,
    pub from: QuestionFormat,
    pub to: QuestionFormat,
}

impl FormatTransition {
    /// The answer moved the question into `Completed`.
    #[must_use]
    pub fn mastered(&self) -> bool {
        !self.from.is_terminal() && self.to.is_terminal()
    }

    #[must_use]
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
