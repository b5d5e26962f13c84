use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use quiz_core::model::{QuestionFormat, QuestionId, RoundState};
use serde_json::Value;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Reads a counter that may have been written as a number, a numeric string,
/// or garbage. Negative, NaN and non-numeric values yield `None`.
fn lenient_u32(value: &Value) -> Option<u32> {
    let float = match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                return Some(u32::try_from(u).unwrap_or(u32::MAX));
            }
            n.as_f64()?
        }
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !float.is_finite() || float < 0.0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let truncated = float.trunc().min(f64::from(u32::MAX)) as u32;
    Some(truncated)
}

fn lenient_id(value: &Value) -> Option<QuestionId> {
    match value {
        Value::Number(n) => n.as_u64().map(QuestionId::new),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn lenient_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn lenient_time(value: &Value) -> Option<DateTime<Utc>> {
    serde_json::from_value(value.clone()).ok()
}

/// Decoded round state plus the names of fields that had to be reset.
pub(crate) struct Decoded {
    pub state: RoundState,
    pub repaired: Vec<&'static str>,
}

/// Decodes persisted round state field by field, replacing anything
/// unreadable with its default instead of failing the whole record.
///
/// # Errors
///
/// Returns `StorageError::Serialization` only when `raw` is not JSON or not a
/// JSON object.
pub(crate) fn decode_round_state(raw: &str) -> Result<Decoded, StorageError> {
    let value: Value = serde_json::from_str(raw).map_err(ser)?;
    let Value::Object(map) = value else {
        return Err(StorageError::Serialization(
            "round state is not an object".into(),
        ));
    };

    let defaults = RoundState::default();
    let mut repaired = Vec::new();

    let mut counter = |field: &'static str, default: u32| -> u32 {
        match map.get(field) {
            None | Some(Value::Null) => default,
            Some(v) => lenient_u32(v).unwrap_or_else(|| {
                repaired.push(field);
                default
            }),
        }
    };

    let round_number = counter("round_number", defaults.round_number);
    let progress = counter("progress", 0);
    let completed_rounds = counter("completed_rounds", 0);
    let total_answered = counter("total_answered", 0);
    let total_correct = counter("total_correct", 0);

    let round_complete = match map.get("round_complete") {
        None | Some(Value::Null) => false,
        Some(v) => lenient_bool(v).unwrap_or_else(|| {
            repaired.push("round_complete");
            false
        }),
    };

    let selected_question_ids = match map.get("selected_question_ids") {
        Some(Value::Array(items)) => {
            let ids: Vec<QuestionId> = items.iter().filter_map(lenient_id).collect();
            if ids.len() != items.len() {
                repaired.push("selected_question_ids");
            }
            ids
        }
        None | Some(Value::Null) => Vec::new(),
        Some(_) => {
            repaired.push("selected_question_ids");
            Vec::new()
        }
    };

    let mut formats = BTreeMap::new();
    match map.get("formats") {
        Some(Value::Object(entries)) => {
            for (key, value) in entries {
                let id = key.parse::<QuestionId>().ok();
                let format = value.as_str().and_then(QuestionFormat::parse);
                match (id, format) {
                    (Some(id), Some(format)) => {
                        formats.insert(id, format);
                    }
                    _ => {
                        if !repaired.contains(&"formats") {
                            repaired.push("formats");
                        }
                    }
                }
            }
        }
        None | Some(Value::Null) => {}
        Some(_) => repaired.push("formats"),
    }

    let started_at = map.get("started_at").and_then(lenient_time);
    let completed_at = map.get("completed_at").and_then(lenient_time);

    let state = RoundState {
        round_number,
        selected_question_ids,
        progress,
        round_complete,
        completed_rounds,
        total_answered,
        total_correct,
        formats,
        started_at,
        completed_at,
    }
    .sanitized();

    Ok(Decoded { state, repaired })
}
