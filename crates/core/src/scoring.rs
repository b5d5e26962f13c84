//! Approximate answer checking.
//!
//! Written answers are graded by token overlap rather than exact match, and
//! provider answers are reconciled with their option lists by edit-distance
//! similarity. Both are heuristics; the thresholds are named constants so
//! callers can tune them.

/// Fraction of expected tokens that must appear in a written answer.
pub const WRITTEN_ACCEPT_THRESHOLD: f64 = 0.6;

/// Shortest token (in characters) that takes part in written-answer scoring.
pub const MIN_TOKEN_LEN: usize = 3;

/// Minimum similarity for a provider answer to be matched to an option.
pub const ANSWER_RECONCILE_SIMILARITY: f64 = 0.8;

/// Grades a free-text answer against the expected one.
pub trait AnswerScorer {
    /// Score in `[0, 1]`.
    fn score(&self, expected: &str, actual: &str) -> f64;

    fn threshold(&self) -> f64;

    fn accepts(&self, expected: &str, actual: &str) -> bool {
        self.score(expected, actual) >= self.threshold()
    }
}

/// Token-overlap scorer.
///
/// The score is the share of expected tokens (words of at least
/// `min_token_len` characters) for which some token of the answer contains
/// it or is contained by it. When the expected answer has no such token
/// (e.g. `"H2"`), normalized equality decides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenOverlapScorer {
    pub threshold: f64,
    pub min_token_len: usize,
}

impl Default for TokenOverlapScorer {
    fn default() -> Self {
        Self {
            threshold: WRITTEN_ACCEPT_THRESHOLD,
            min_token_len: MIN_TOKEN_LEN,
        }
    }
}

impl TokenOverlapScorer {
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    fn tokens(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.chars().count() >= self.min_token_len)
            .map(str::to_lowercase)
            .collect()
    }
}

impl AnswerScorer for TokenOverlapScorer {
    fn score(&self, expected: &str, actual: &str) -> f64 {
        if actual.trim().is_empty() {
            return 0.0;
        }

        let expected_tokens = self.tokens(expected);
        if expected_tokens.is_empty() {
            return if normalize_answer(expected) == normalize_answer(actual) {
                1.0
            } else {
                0.0
            };
        }

        let actual_tokens = self.tokens(actual);
        let matched = expected_tokens
            .iter()
            .filter(|exp| {
                actual_tokens
                    .iter()
                    .any(|act| act.contains(exp.as_str()) || exp.contains(act.as_str()))
            })
            .count();

        #[allow(clippy::cast_precision_loss)]
        let score = matched as f64 / expected_tokens.len() as f64;
        score
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// Scores a written answer with the default token-overlap settings.
#[must_use]
pub fn score_written_answer(expected: &str, actual: &str) -> f64 {
    TokenOverlapScorer::default().score(expected, actual)
}

/// Lowercases and collapses whitespace.
#[must_use]
pub fn normalize_answer(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalized Levenshtein similarity of two answers in `[0, 1]`.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = normalize_answer(a).chars().collect();
    let b: Vec<char> = normalize_answer(b).chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    #[allow(clippy::cast_precision_loss)]
    let distance = prev[b.len()] as f64 / longest as f64;
    1.0 - distance
}

/// The option most similar to `answer`, if any reaches `min_similarity`.
#[must_use]
pub fn closest_option<'a>(
    answer: &str,
    options: &'a [String],
    min_similarity: f64,
) -> Option<&'a String> {
    options
        .iter()
        .map(|opt| (opt, similarity(answer, opt)))
        .filter(|(_, sim)| *sim >= min_similarity)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(opt, _)| opt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_written_answer_scores_full() {
        let score = score_written_answer("Mitochondria", "mitochondria");
        assert!((score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_overlap_uses_sixty_percent_threshold() {
        let scorer = TokenOverlapScorer::default();
        let expected = "light energy converted into chemical energy";
        // tokens: light, energy, converted, into, chemical, energy -> 6
        assert!(scorer.accepts(expected, "Light energy becomes chemical energy"));
        assert!(!scorer.accepts(expected, "energy from food"));
    }

    #[test]
    fn containment_works_in_both_directions() {
        let scorer = TokenOverlapScorer::default();
        assert!(scorer.accepts("photosynthesis", "photosynthesis!"));
        assert!(scorer.accepts("photosynthetic reactions", "photosynthetic reaction"));
    }

    #[test]
    fn short_expected_answer_falls_back_to_equality() {
        let scorer = TokenOverlapScorer::default();
        assert!(scorer.accepts("H2O", "h2o"));
        assert!(scorer.accepts("4", " 4 "));
        assert!(!scorer.accepts("4", "5"));
    }

    #[test]
    fn blank_answer_scores_zero() {
        assert!(score_written_answer("Mitochondria", "   ").abs() < f64::EPSILON);
    }

    #[test]
    fn custom_threshold_is_respected() {
        let strict = TokenOverlapScorer::default().with_threshold(1.0);
        assert!(!strict.accepts("cell membrane", "membrane"));
        assert!(TokenOverlapScorer::default().with_threshold(0.5).accepts("cell membrane", "membrane"));
    }

    #[test]
    fn similarity_is_normalized() {
        assert!((similarity("Mitochondria", "mitochondria") - 1.0).abs() < f64::EPSILON);
        assert!(similarity("Mitochondria", "Mitochondrion") > 0.8);
        assert!(similarity("Nucleus", "Ribosome") < 0.5);
        assert!((similarity("", "") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn closest_option_picks_best_match_above_threshold() {
        let options = vec!["Nucleus".to_string(), "Mitochondrion".to_string()];
        assert_eq!(
            closest_option("Mitochondria", &options, ANSWER_RECONCILE_SIMILARITY),
            Some(&options[1])
        );
        assert_eq!(closest_option("Chloroplast", &options, ANSWER_RECONCILE_SIMILARITY), None);
    }
}
