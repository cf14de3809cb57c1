//! Local question corpus: a JSON array of [`Question`] records.
//!
//! The hosted record store is out of scope; this file stands in for it so
//! the CLI has something to rank against.

use crate::model::question::{NewQuestion, Question, Session};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Result of merging freshly imported rows into a corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Ids of questions appended to the corpus.
    pub added: Vec<String>,
    /// Ids that were already present and were skipped.
    pub duplicates: Vec<String>,
}

/// Field changes for an existing question. `None` leaves a field alone.
///
/// The id is never rewritten, so bookmarks keep pointing at the question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionPatch {
    pub subject: Option<String>,
    pub year: Option<i32>,
    pub session: Option<Session>,
    pub paper_number: Option<String>,
    pub question_text: Option<String>,
    pub mark_scheme: Option<String>,
    pub keywords: Option<Vec<String>>,
}

impl QuestionPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The question with this patch applied.
    #[must_use]
    pub fn applied_to(&self, question: &Question) -> Question {
        let mut edited = question.clone();
        if let Some(subject) = &self.subject {
            edited.subject.clone_from(subject);
        }
        if let Some(year) = self.year {
            edited.year = year;
        }
        if let Some(session) = self.session {
            edited.session = session;
        }
        if let Some(paper_number) = &self.paper_number {
            edited.paper_number.clone_from(paper_number);
        }
        if let Some(question_text) = &self.question_text {
            edited.question_text.clone_from(question_text);
        }
        if let Some(mark_scheme) = &self.mark_scheme {
            edited.mark_scheme.clone_from(mark_scheme);
        }
        if let Some(keywords) = &self.keywords {
            edited.keywords.clone_from(keywords);
        }
        edited
    }
}

#[must_use]
pub fn find_question<'a>(corpus: &'a [Question], id: &str) -> Option<&'a Question> {
    corpus.iter().find(|q| q.id == id)
}

/// Replace the question with the same id. Returns `false` when absent.
pub fn replace_question(corpus: &mut [Question], question: Question) -> bool {
    match corpus.iter_mut().find(|q| q.id == question.id) {
        Some(slot) => {
            *slot = question;
            true
        }
        None => false,
    }
}

/// Remove and return the question with `id`.
pub fn remove_question(corpus: &mut Vec<Question>, id: &str) -> Option<Question> {
    let index = corpus.iter().position(|q| q.id == id)?;
    debug!(id, "removing question");
    Some(corpus.remove(index))
}

/// Load the corpus, returning `None` when the file does not exist.
pub fn try_load_corpus(path: &Path) -> Result<Option<Vec<Question>>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let questions: Vec<Question> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!(count = questions.len(), path = %path.display(), "loaded corpus");
    Ok(Some(questions))
}

pub fn save_corpus(path: &Path, questions: &[Question]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(questions)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Append new questions, skipping any whose content id is already present
/// (including repeats within `incoming`).
pub fn merge_new(
    corpus: &mut Vec<Question>,
    incoming: Vec<NewQuestion>,
    created_at: &str,
) -> MergeOutcome {
    let mut seen: HashSet<String> = corpus.iter().map(|q| q.id.clone()).collect();
    let mut outcome = MergeOutcome::default();

    for new in incoming {
        let question = new.into_question(created_at);
        if seen.insert(question.id.clone()) {
            outcome.added.push(question.id.clone());
            corpus.push(question);
        } else {
            outcome.duplicates.push(question.id);
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{TEMPLATE_CSV, import_csv};

    const STAMP: &str = "2024-01-01T00:00:00Z";

    #[test]
    fn missing_corpus_is_none() {
        let dir = tempfile::tempdir().expect("temp dir");
        let loaded = try_load_corpus(&dir.path().join("questions.json")).expect("load");
        assert!(loaded.is_none());
    }

    #[test]
    fn malformed_corpus_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("questions.json");
        std::fs::write(&path, "{\"not\": \"an array\"}").expect("write");
        let err = try_load_corpus(&path).expect_err("should fail");
        assert!(format!("{err:#}").contains("questions.json"));
    }

    #[test]
    fn patch_changes_only_given_fields_and_keeps_id() {
        let report = import_csv(TEMPLATE_CSV).expect("template imports");
        let mut corpus = Vec::new();
        merge_new(&mut corpus, report.accepted, STAMP);
        let original = corpus[1].clone();

        let patch = QuestionPatch {
            year: Some(2019),
            keywords: Some(vec!["motion".into()]),
            ..QuestionPatch::default()
        };
        assert!(!patch.is_empty());
        assert!(QuestionPatch::default().is_empty());

        let edited = patch.applied_to(&original);
        assert_eq!(edited.id, original.id);
        assert_eq!(edited.year, 2019);
        assert_eq!(edited.keywords, vec!["motion"]);
        assert_eq!(edited.question_text, original.question_text);

        assert!(replace_question(&mut corpus, edited.clone()));
        assert_eq!(find_question(&corpus, &original.id), Some(&edited));
    }

    #[test]
    fn remove_and_replace_report_missing_ids() {
        let report = import_csv(TEMPLATE_CSV).expect("template imports");
        let mut corpus = Vec::new();
        merge_new(&mut corpus, report.accepted, STAMP);
        let id = corpus[0].id.clone();

        let removed = remove_question(&mut corpus, &id).expect("present");
        assert_eq!(removed.subject, "Mathematics");
        assert_eq!(corpus.len(), 1);
        assert!(remove_question(&mut corpus, &id).is_none());
        assert!(!replace_question(&mut corpus, removed));
        assert!(find_question(&corpus, &id).is_none());
    }

    #[test]
    fn merge_skips_duplicates_and_round_trips() {
        let report = import_csv(TEMPLATE_CSV).expect("template imports");
        let mut corpus = Vec::new();

        let first = merge_new(&mut corpus, report.accepted.clone(), STAMP);
        assert_eq!(first.added.len(), 2);
        assert!(first.duplicates.is_empty());

        let second = merge_new(&mut corpus, report.accepted, STAMP);
        assert!(second.added.is_empty());
        assert_eq!(second.duplicates.len(), 2);
        assert_eq!(corpus.len(), 2);

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested/questions.json");
        save_corpus(&path, &corpus).expect("save");
        let loaded = try_load_corpus(&path).expect("load").expect("present");
        assert_eq!(loaded, corpus);
        assert_eq!(loaded[0].created_at.as_deref(), Some(STAMP));
    }
}
