//! Admin catalogue filter.
//!
//! Unlike [`crate::rank`], this does no scoring: it narrows the corpus by a
//! plain substring term, an exact subject and an exact year, keeping the
//! corpus order. Used by the back-office question list.

use crate::rank::ALL_CATEGORIES;
use pastpaper_core::Question;

/// Criteria for [`filter`]. All present criteria must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Case-insensitive substring of question text, mark scheme or a keyword.
    pub term: Option<String>,
    /// Exact (case-sensitive) subject; `"all"` disables the check.
    pub subject: Option<String>,
    pub year: Option<i32>,
}

impl CatalogFilter {
    #[must_use]
    pub fn matches(&self, question: &Question) -> bool {
        self.matches_term(question) && self.matches_subject(question) && self.matches_year(question)
    }

    fn matches_term(&self, question: &Question) -> bool {
        let Some(term) = self.term.as_deref().filter(|t| !t.is_empty()) else {
            return true;
        };
        let term = term.to_lowercase();
        question.question_text.to_lowercase().contains(&term)
            || question.mark_scheme.to_lowercase().contains(&term)
            || question
                .keywords
                .iter()
                .any(|k| k.to_lowercase().contains(&term))
    }

    fn matches_subject(&self, question: &Question) -> bool {
        match self.subject.as_deref() {
            None | Some(ALL_CATEGORIES) => true,
            Some(subject) => question.subject == subject,
        }
    }

    fn matches_year(&self, question: &Question) -> bool {
        self.year.is_none_or(|year| question.year == year)
    }
}

/// Questions matching `criteria`, in corpus order.
#[must_use]
pub fn filter<'a>(questions: &'a [Question], criteria: &CatalogFilter) -> Vec<&'a Question> {
    questions.iter().filter(|q| criteria.matches(q)).collect()
}
