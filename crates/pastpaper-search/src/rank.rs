//! Rank a corpus of questions against a pasted query.
//!
//! Every call is a full linear scan: filter by category, score each
//! remaining candidate with [`crate::similarity::score`], keep those above
//! [`SCORE_THRESHOLD`], sort best-first and cut at [`MAX_RESULTS`].
//!
//! Ties are not broken explicitly. The sort is stable, so candidates with
//! equal scores keep the order they had in the input collection.

use crate::similarity::score;
use pastpaper_core::Question;
use serde::Serialize;
use tracing::debug;

/// Category filter value meaning "no filtering".
pub const ALL_CATEGORIES: &str = "all";

/// Candidates must score strictly above this to be returned.
pub const SCORE_THRESHOLD: f64 = 0.2;

/// Maximum number of results returned by [`rank`].
pub const MAX_RESULTS: usize = 10;

/// The fields of a record that ranking looks at.
///
/// Everything else on the record (year, paper, mark scheme) is carried
/// through untouched.
pub trait Candidate {
    fn id(&self) -> &str;
    fn category(&self) -> &str;
    fn body(&self) -> &str;
    fn keywords(&self) -> &[String];
}

impl Candidate for Question {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> &str {
        &self.subject
    }

    fn body(&self) -> &str {
        &self.question_text
    }

    fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// A candidate together with its similarity to the query.
///
/// Serializes as the candidate's own fields plus `similarity`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked<T> {
    #[serde(flatten)]
    pub candidate: T,
    pub similarity: f64,
}

/// Whether `category` passes `filter`. `None`, `""` and `"all"` pass
/// everything; otherwise the comparison is case-insensitive equality.
#[must_use]
pub fn matches_category(category: &str, filter: Option<&str>) -> bool {
    match filter {
        None | Some(ALL_CATEGORIES | "") => true,
        Some(wanted) => category.to_lowercase() == wanted.to_lowercase(),
    }
}

/// Score `candidates` against `query` and return the best matches.
///
/// A blank query yields an empty result without scoring anything.
/// `category_filter` of `None`, `Some("")` or `Some("all")` keeps every
/// candidate; see [`matches_category`].
///
/// # Examples
///
/// ```
/// use pastpaper_core::{Question, Session};
/// use pastpaper_search::rank;
///
/// let question = Question {
///     id: "q-1".into(),
///     subject: "Mathematics".into(),
///     year: 2023,
///     session: Session::MayJune,
///     paper_number: "1".into(),
///     question_text: "Calculate the derivative of f(x) = 3x^2 + 2x - 1".into(),
///     mark_scheme: "f'(x) = 6x + 2".into(),
///     keywords: vec!["derivative".into()],
///     created_at: None,
/// };
/// let corpus = vec![question];
///
/// let hits = rank("derivative of f(x)", &corpus, Some("mathematics"));
/// assert_eq!(hits.len(), 1);
/// assert!(hits[0].similarity > 0.2);
/// assert_eq!(rank("derivative of f(x)", &corpus, Some("")).len(), 1);
/// assert!(rank("   ", &corpus, None).is_empty());
/// ```
#[must_use]
pub fn rank<'a, T, I>(query: &str, candidates: I, category_filter: Option<&str>) -> Vec<Ranked<&'a T>>
where
    T: Candidate + 'a,
    I: IntoIterator<Item = &'a T>,
{
    if query.trim().is_empty() {
        return Vec::new();
    }

    let mut considered = 0usize;
    let mut results: Vec<Ranked<&'a T>> = candidates
        .into_iter()
        .filter(|c| matches_category(c.category(), category_filter))
        .inspect(|_| considered += 1)
        .map(|c| Ranked {
            candidate: c,
            similarity: score(query, c.body(), c.keywords()),
        })
        .filter(|r| r.similarity > SCORE_THRESHOLD)
        .collect();

    let above_threshold = results.len();
    results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    results.truncate(MAX_RESULTS);

    debug!(
        considered,
        above_threshold,
        returned = results.len(),
        filter = category_filter.unwrap_or(ALL_CATEGORIES),
        "ranked candidates"
    );
    results
}
