//! `ppa subjects`: the Cambridge subject list with corpus coverage.

use super::Workspace;
use crate::output::{OutputMode, pretty_rule, render_mode};
use clap::Args;
use pastpaper_core::{CAMBRIDGE_SUBJECTS, Question};
use serde::Serialize;

#[derive(Args, Debug, Default)]
#[command(
    about = "List Cambridge subjects",
    after_help = "EXAMPLES:\n    ppa subjects\n    ppa subjects --format json"
)]
pub struct SubjectsArgs {}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct SubjectRow {
    subject: String,
    questions: usize,
    /// `false` for subjects that only appear in the corpus.
    standard: bool,
}

/// Execute `ppa subjects`.
pub fn run_subjects(_args: &SubjectsArgs, output: OutputMode, ws: &Workspace) -> anyhow::Result<()> {
    let corpus = ws.corpus_or_empty(output)?;
    let rows = subject_rows(&corpus);

    render_mode(
        output,
        &rows,
        |rows, w| {
            for row in rows {
                writeln!(w, "{}\t{}", row.subject, row.questions)?;
            }
            Ok(())
        },
        |rows, w| {
            writeln!(w, "{:<24}  {:>9}", "SUBJECT", "QUESTIONS")?;
            pretty_rule(w)?;
            for row in rows {
                let marker = if row.standard { "" } else { "  (custom)" };
                writeln!(w, "{:<24}  {:>9}{marker}", row.subject, row.questions)?;
            }
            Ok(())
        },
    )
}

/// Standard subjects first in their usual order, then any other subject
/// names found in the corpus, alphabetically.
fn subject_rows(corpus: &[Question]) -> Vec<SubjectRow> {
    let count = |name: &str| corpus.iter().filter(|q| q.subject == name).count();

    let mut rows: Vec<SubjectRow> = CAMBRIDGE_SUBJECTS
        .iter()
        .map(|name| SubjectRow {
            subject: (*name).to_string(),
            questions: count(*name),
            standard: true,
        })
        .collect();

    let mut custom: Vec<&str> = corpus
        .iter()
        .map(|q| q.subject.as_str())
        .filter(|s| !CAMBRIDGE_SUBJECTS.contains(s))
        .collect();
    custom.sort_unstable();
    custom.dedup();
    rows.extend(custom.into_iter().map(|name| SubjectRow {
        subject: name.to_string(),
        questions: count(name),
        standard: false,
    }));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use pastpaper_core::Session;

    fn q(subject: &str) -> Question {
        Question {
            id: format!("q-{subject}"),
            subject: subject.to_string(),
            year: 2021,
            session: Session::OctNov,
            paper_number: "3".to_string(),
            question_text: "text".to_string(),
            mark_scheme: "scheme".to_string(),
            keywords: vec![],
            created_at: None,
        }
    }

    #[test]
    fn standard_subjects_always_listed() {
        let rows = subject_rows(&[]);
        assert_eq!(rows.len(), CAMBRIDGE_SUBJECTS.len());
        assert!(rows.iter().all(|r| r.standard && r.questions == 0));
    }

    #[test]
    fn corpus_counts_and_custom_subjects() {
        let corpus = vec![q("Physics"), q("Physics"), q("Latin"), q("Art"), q("Latin")];
        let rows = subject_rows(&corpus);

        let physics = rows.iter().find(|r| r.subject == "Physics").expect("physics row");
        assert_eq!(physics.questions, 2);

        let custom: Vec<(&str, usize)> = rows
            .iter()
            .filter(|r| !r.standard)
            .map(|r| (r.subject.as_str(), r.questions))
            .collect();
        assert_eq!(custom, vec![("Art", 1), ("Latin", 2)]);
    }
}
