use std::collections::HashSet;

use quiz_core::model::{Question, QuestionFormat, QuestionId};
use quiz_core::scoring::{ANSWER_RECONCILE_SIMILARITY, closest_option};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// A multiple-choice question is never shown with fewer options than this.
pub const MIN_OPTIONS: usize = 2;

/// Options kept per question; synthetic distractors fill up to this count.
pub const MAX_OPTIONS: usize = 4;

/// Last-resort distractors when the batch has no other answers to borrow.
pub const GENERIC_DISTRACTORS: [&str; 3] = [
    "None of the above",
    "All of the above",
    "Not enough information",
];

const PLACEHOLDERS: &[&str] = &[
    "",
    "n/a",
    "na",
    "undefined",
    "null",
    "none",
    "tbd",
    "?",
    "...",
    "placeholder",
    "answer",
    "correct answer",
];

/// Question record as the provider sends it. Every field is optional and
/// several spellings are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderQuestion {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, alias = "prompt", alias = "text")]
    pub question: Option<String>,
    #[serde(default, alias = "correct_answer", alias = "correctAnswer")]
    pub answer: Option<String>,
    #[serde(default, alias = "choices")]
    pub options: Option<Vec<Value>>,
    #[serde(default, alias = "type")]
    pub format: Option<String>,
}

/// True for empty strings and stand-ins such as `"N/A"` or `"undefined"`.
#[must_use]
pub fn is_placeholder(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    PLACEHOLDERS.contains(&lowered.as_str())
}

fn same_text(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn option_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_owned(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!is_placeholder(&text)).then_some(text)
}

fn provider_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Makes sure `answer` is among the options and that at least `MIN_OPTIONS`
/// are present, borrowing distractors from `pool` and then from
/// `GENERIC_DISTRACTORS`. The result holds at most `MAX_OPTIONS` entries and
/// always keeps the answer.
#[must_use]
pub fn ensure_min_options(mut options: Vec<String>, answer: &str, pool: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    options.retain(|o| !is_placeholder(o) && seen.insert(o.trim().to_lowercase()));

    if !options.iter().any(|o| same_text(o, answer)) {
        options.push(answer.to_owned());
    }

    if options.len() > MAX_OPTIONS {
        let mut kept: Vec<String> = options
            .iter()
            .filter(|o| !same_text(o, answer))
            .take(MAX_OPTIONS - 1)
            .cloned()
            .collect();
        let position = options
            .iter()
            .position(|o| same_text(o, answer))
            .unwrap_or(0)
            .min(kept.len());
        kept.insert(position, answer.to_owned());
        options = kept;
    }

    if options.len() < MIN_OPTIONS {
        let borrowed = pool
            .iter()
            .map(String::as_str)
            .chain(GENERIC_DISTRACTORS)
            .filter(|candidate| !is_placeholder(candidate));
        for candidate in borrowed {
            if options.len() >= MAX_OPTIONS {
                break;
            }
            if options.iter().any(|o| same_text(o, candidate)) {
                continue;
            }
            options.push(candidate.to_owned());
        }
        debug!(answer, count = options.len(), "added synthetic distractors");
    }

    options
}

struct Draft {
    id: Option<u64>,
    prompt: String,
    answer: String,
    options: Vec<String>,
    format: QuestionFormat,
}

fn clean(index: usize, raw: ProviderQuestion) -> Option<Draft> {
    let Some(prompt) = raw
        .question
        .map(|q| q.trim().to_owned())
        .filter(|q| !is_placeholder(q))
    else {
        debug!(index, "dropping provider record without a prompt");
        return None;
    };

    let mut seen = HashSet::new();
    let options: Vec<String> = raw
        .options
        .unwrap_or_default()
        .iter()
        .filter_map(option_text)
        .filter(|o| seen.insert(o.to_lowercase()))
        .collect();

    let provided = raw.answer.map(|a| a.trim().to_owned()).filter(|a| !is_placeholder(a));
    let answer = match provided {
        Some(answer) => {
            if options.is_empty() || options.iter().any(|o| same_text(o, &answer)) {
                answer
            } else if let Some(option) =
                closest_option(&answer, &options, ANSWER_RECONCILE_SIMILARITY)
            {
                debug!(index, %answer, %option, "reconciled provider answer with option");
                option.clone()
            } else {
                answer
            }
        }
        None => {
            let Some(first) = options.first() else {
                warn!(index, "dropping provider record with neither answer nor options");
                return None;
            };
            warn!(
                index,
                substitute = %first,
                "provider answer missing or placeholder; using first option"
            );
            first.clone()
        }
    };

    let format = raw
        .format
        .as_deref()
        .and_then(QuestionFormat::parse)
        .filter(|f| !f.is_terminal())
        .unwrap_or_default();

    Some(Draft {
        id: raw.id.as_ref().and_then(provider_id),
        prompt,
        answer,
        options,
        format,
    })
}

/// Next unused id after `next_id`, wrapping around to 1 past `u64::MAX`.
fn fresh_id(next_id: &mut u64, used: &mut HashSet<u64>) -> u64 {
    loop {
        *next_id = next_id.checked_add(1).unwrap_or(1);
        if used.insert(*next_id) {
            return *next_id;
        }
    }
}

/// Maps provider records into bank questions, repairing what can be repaired.
///
/// - records without a prompt, or without both an answer and options, are dropped
/// - a missing or placeholder answer becomes the first valid option
/// - an answer that only nearly matches an option takes that option's spelling
/// - every question ends up with at least `MIN_OPTIONS` options
/// - missing or repeated ids are replaced with fresh ones
#[must_use]
pub fn map_provider_questions(raw: Vec<ProviderQuestion>) -> Vec<Question> {
    let drafts: Vec<Draft> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| clean(index, record))
        .collect();

    let pool: Vec<String> = drafts.iter().map(|d| d.answer.clone()).collect();
    let mut next_id = drafts.iter().filter_map(|d| d.id).max().unwrap_or(0);
    let mut used = HashSet::new();

    drafts
        .into_iter()
        .filter_map(|draft| {
            let id = match draft.id {
                Some(id) if used.insert(id) => id,
                _ => fresh_id(&mut next_id, &mut used),
            };
            let options = ensure_min_options(draft.options, &draft.answer, &pool);
            Question::new(QuestionId::new(id), draft.prompt, draft.answer, options)
                .ok()
                .map(|q| q.with_format(draft.format))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> ProviderQuestion {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn accepts_alternate_field_names() {
        let q = record(json!({
            "id": "12",
            "prompt": "What is the powerhouse of the cell?",
            "correctAnswer": "Mitochondria",
            "choices": ["Nucleus", "Mitochondria", null, 3],
            "type": "written"
        }));
        let mapped = map_provider_questions(vec![q]);
        assert_eq!(mapped.len(), 1);
        let q = &mapped[0];
        assert_eq!(q.id(), QuestionId::new(12));
        assert_eq!(q.correct_answer(), "Mitochondria");
        assert_eq!(q.options(), ["Nucleus", "Mitochondria", "3"]);
        assert_eq!(q.format(), QuestionFormat::Written);
    }

    #[test]
    fn placeholder_answer_uses_first_option() {
        let q = record(json!({
            "question": "Which organelle holds DNA?",
            "answer": "undefined",
            "options": ["Nucleus", "Vacuole"]
        }));
        let mapped = map_provider_questions(vec![q]);
        assert_eq!(mapped[0].correct_answer(), "Nucleus");
    }

    #[test]
    fn zero_options_still_yields_two() {
        let q = record(json!({
            "question": "What is the basic unit of life?",
            "answer": "Cell",
            "options": []
        }));
        let mapped = map_provider_questions(vec![q]);
        assert!(mapped[0].options().len() >= MIN_OPTIONS);
        assert!(mapped[0].options().iter().any(|o| o == "Cell"));
    }

    #[test]
    fn distractors_are_borrowed_from_the_batch_first() {
        let batch = vec![
            record(json!({"question": "Q1?", "answer": "Alpha"})),
            record(json!({"question": "Q2?", "answer": "Beta"})),
        ];
        let mapped = map_provider_questions(batch);
        assert_eq!(mapped[0].options()[0], "Alpha");
        assert!(mapped[0].options().contains(&"Beta".to_string()));
        assert!(!mapped[0].options()[1..].contains(&"Alpha".to_string()));
    }

    #[test]
    fn unusable_records_are_dropped() {
        let batch = vec![
            record(json!({"answer": "No prompt"})),
            record(json!({"question": "No answer or options"})),
            record(json!({"question": "N/A", "answer": "x"})),
        ];
        assert!(map_provider_questions(batch).is_empty());
    }

    #[test]
    fn near_miss_answer_takes_option_spelling() {
        let q = record(json!({
            "question": "Powerhouse?",
            "answer": "mitochondrion",
            "options": ["Mitochondria", "Nucleus"]
        }));
        let mapped = map_provider_questions(vec![q]);
        assert_eq!(mapped[0].correct_answer(), "Mitochondria");
        assert_eq!(mapped[0].options().len(), 2);
    }

    #[test]
    fn missing_and_duplicate_ids_are_reassigned() {
        let batch = vec![
            record(json!({"id": 5, "question": "A?", "answer": "a"})),
            record(json!({"id": 5, "question": "B?", "answer": "b"})),
            record(json!({"question": "C?", "answer": "c"})),
        ];
        let ids: Vec<u64> = map_provider_questions(batch)
            .iter()
            .map(|q| q.id().value())
            .collect();
        assert_eq!(ids, vec![5, 6, 7]);
    }

    #[test]
    fn ids_are_assigned_after_max_id_without_overflow() {
        let batch = vec![
            record(json!({"id": u64::MAX, "question": "A?", "answer": "a"})),
            record(json!({"question": "B?", "answer": "b"})),
            record(json!({"id": u64::MAX, "question": "C?", "answer": "c"})),
        ];
        let ids: Vec<u64> = map_provider_questions(batch)
            .iter()
            .map(|q| q.id().value())
            .collect();
        assert_eq!(ids, vec![u64::MAX, 1, 2]);
    }

    #[test]
    fn ensure_min_options_caps_and_keeps_answer() {
        let options: Vec<String> = ["a", "b", "c", "d", "e", "answer-x"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        let out = ensure_min_options(options, "answer-x", &[]);
        assert_eq!(out.len(), MAX_OPTIONS);
        assert!(out.contains(&"answer-x".to_string()));
    }

    #[test]
    fn generic_distractors_cover_empty_pool() {
        let out = ensure_min_options(Vec::new(), "None of the above", &[]);
        assert!(out.len() >= MIN_OPTIONS);
        assert_eq!(out[0], "None of the above");
        assert_eq!(out.iter().filter(|o| o.as_str() == "None of the above").count(), 1);
    }
}
