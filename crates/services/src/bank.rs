use std::collections::BTreeMap;

use quiz_core::model::{Question, QuestionFormat, QuestionId};

use crate::seed::seed_questions;

/// Where the questions of a bank came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankSource {
    Embedded,
    Provider,
}

/// In-memory question bank for a study session.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
    source: BankSource,
}

impl QuestionBank {
    /// Wraps questions fetched from the content provider.
    ///
    /// Questions with a repeated id are dropped; the first one wins.
    #[must_use]
    pub fn new(questions: Vec<Question>, source: BankSource) -> Self {
        let mut unique: Vec<Question> = Vec::with_capacity(questions.len());
        for question in questions {
            if unique.iter().all(|q| q.id() != question.id()) {
                unique.push(question);
            }
        }
        Self {
            questions: unique,
            source,
        }
    }

    /// The embedded bank used when no provider is configured or reachable.
    #[must_use]
    pub fn seeded() -> Self {
        Self::new(seed_questions(), BankSource::Embedded)
    }

    #[must_use]
    pub fn source(&self) -> BankSource {
        self.source
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    pub fn get_mut(&mut self, id: QuestionId) -> Option<&mut Question> {
        self.questions.iter_mut().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: QuestionId) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<QuestionId> {
        self.questions.iter().map(Question::id).collect()
    }

    /// Ids of questions that still need work.
    #[must_use]
    pub fn available_ids(&self) -> Vec<QuestionId> {
        self.questions
            .iter()
            .filter(|q| !q.is_completed())
            .map(Question::id)
            .collect()
    }

    /// Restores persisted formats. Ids that are not in the bank are ignored.
    pub fn apply_formats(&mut self, formats: &BTreeMap<QuestionId, QuestionFormat>) {
        for question in &mut self.questions {
            if let Some(format) = formats.get(&question.id()) {
                question.set_format(*format);
            }
        }
    }

    #[must_use]
    pub fn formats(&self) -> BTreeMap<QuestionId, QuestionFormat> {
        self.questions.iter().map(|q| (q.id(), q.format())).collect()
    }
}
