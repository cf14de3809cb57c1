//! Lexical similarity between a pasted query and one question.
//!
//! # Scoring
//!
//! | Signal                                   | Contribution            |
//! |------------------------------------------|-------------------------|
//! | Body contains the whole query            | `0.9`, returned at once |
//! | Query token overlaps a body token        | `+0.6` per token        |
//! | Query token overlaps a keyword           | `+0.8` per token        |
//!
//! "Overlaps" means either string is a substring of the other. Query tokens
//! of two characters or fewer are dropped before matching. The accumulated
//! contributions are divided by the number of surviving query tokens and
//! clamped to `1.0`.
//!
//! A token that hits both the body and a keyword contributes `1.4` before
//! normalization, so a single strong token can saturate the score at the
//! cap. The double count is part of the scoring contract.

/// Score returned when the body contains the full query verbatim.
/// Token-level matches can still outrank it.
pub const EXACT_PHRASE_SCORE: f64 = 0.9;

/// Added for each query token that overlaps any body token.
pub const BODY_TOKEN_WEIGHT: f64 = 0.6;

/// Added for each query token that overlaps any keyword.
pub const KEYWORD_WEIGHT: f64 = 0.8;

/// Query tokens with this many characters or fewer are ignored.
pub const MIN_TOKEN_CHARS: usize = 2;

/// Upper bound of every score.
pub const MAX_SCORE: f64 = 1.0;

fn overlaps(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// Similarity of `query` to a question's `body` and `keywords`, in `[0, 1]`.
///
/// # Examples
///
/// ```
/// use pastpaper_search::similarity::score;
///
/// let body = "Calculate the derivative of f(x) = 3x^2 + 2x - 1";
/// let none: &[&str] = &[];
/// assert_eq!(score("THE DERIVATIVE", body, none), 0.9);
/// assert_eq!(score("xyz nonsense term", "Describe osmosis", none), 0.0);
/// ```
#[must_use]
pub fn score<S: AsRef<str>>(query: &str, body: &str, keywords: &[S]) -> f64 {
    let query = query.to_lowercase();
    let body = body.to_lowercase();

    if body.contains(&query) {
        return EXACT_PHRASE_SCORE;
    }

    let query_tokens: Vec<&str> = query
        .split_whitespace()
        .filter(|token| token.chars().count() > MIN_TOKEN_CHARS)
        .collect();
    if query_tokens.is_empty() {
        return 0.0;
    }

    let body_tokens: Vec<&str> = body.split_whitespace().collect();
    let keywords: Vec<String> = keywords.iter().map(|k| k.as_ref().to_lowercase()).collect();

    let mut accumulated = 0.0;
    for token in &query_tokens {
        if body_tokens.iter().any(|b| overlaps(b, token)) {
            accumulated += BODY_TOKEN_WEIGHT;
        }
    }
    for token in &query_tokens {
        if keywords.iter().any(|k| overlaps(k, token)) {
            accumulated += KEYWORD_WEIGHT;
        }
    }

    (accumulated / query_tokens.len() as f64).min(MAX_SCORE)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    const NO_KEYWORDS: [&str; 0] = [];

    #[test]
    fn exact_phrase_short_circuits() {
        let body = "A ball is thrown vertically upward with initial velocity 20 m/s.";
        assert_eq!(score("thrown VERTICALLY upward", body, &NO_KEYWORDS), 0.9);
        // keywords cannot lift an exact phrase hit above 0.9
        assert_eq!(score("ball", body, &["ball", "kinematics"]), 0.9);
    }

    #[test]
    fn short_tokens_are_ignored() {
        assert_eq!(score("of an a", "Describe osmosis", &NO_KEYWORDS), 0.0);
    }

    #[test]
    fn body_overlap_is_bidirectional() {
        // body token "derivatives" contains the query token
        assert!((score("derivative zzzz", "find derivatives", &NO_KEYWORDS) - 0.3).abs() < 1e-12);
        // query token "osmosis," contains the body token "osmosis"
        assert!((score("osmosis, qqqq", "explain osmosis", &NO_KEYWORDS) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn keyword_overlap_adds_weight() {
        let s = score("kinematics problem", "unrelated text", &["Kinematics"]);
        assert!((s - 0.4).abs() < 1e-12, "got {s}");
    }

    #[test]
    fn body_and_keyword_hits_double_count_and_saturate() {
        // one token hitting both: 1.4 / 1 → clamped to 1.0
        assert_eq!(score("calculus", "calc", &["calculus"]), 1.0);
        // one strong token among two: 1.4 / 2 = 0.7
        let s = score("calculus zzzz", "calc", &["calculus"]);
        assert!((s - 0.7).abs() < 1e-12, "got {s}");
    }

    #[test]
    fn one_third_of_body_weight_is_not_above_threshold() {
        // 0.6 / 3 in binary floating point sits just under 0.2
        let s = score("derivative qqqq zzzz", "find derivatives", &NO_KEYWORDS);
        assert!(s <= 0.2, "got {s}");
    }

    #[test]
    fn unrelated_text_scores_zero() {
        assert_eq!(
            score("xyz nonsense term", "Describe the process of osmosis", &NO_KEYWORDS),
            0.0
        );
    }
}
