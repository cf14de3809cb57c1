//! `ppa question`: add, edit or delete a single corpus question.

use super::bookmark::load_bookmarks_or_report;
use super::{Workspace, timestamp_now};
use crate::output::{CliError, OutputMode, pretty_kv, render_mode, report};
use anyhow::Result;
use chrono::Datelike;
use clap::{ArgGroup, Args, Subcommand};
use pastpaper_core::bookmarks::save_bookmarks;
use pastpaper_core::corpus::{
    QuestionPatch, find_question, merge_new, remove_question, replace_question, save_corpus,
};
use pastpaper_core::error::ErrorCode;
use pastpaper_core::import::check_question;
use pastpaper_core::model::question::split_keywords;
use pastpaper_core::{NewQuestion, Question, Session};
use serde::Serialize;
use std::io::Write;
use tracing::info;

#[derive(Args, Debug)]
#[command(about = "Add, edit or delete a single question")]
pub struct QuestionArgs {
    #[command(subcommand)]
    pub command: QuestionCommand,
}

#[derive(Subcommand, Debug)]
pub enum QuestionCommand {
    #[command(
        about = "Add one question to the corpus",
        after_help = "EXAMPLES:\n    ppa question add --subject Biology --year 2022 --session \"May/June\" \\\n        \
                      --paper 3 --text \"Describe osmosis\" --scheme \"Water moves...\" --keywords \"osmosis, water potential\""
    )]
    Add(QuestionAddArgs),

    #[command(
        about = "Change fields of an existing question",
        after_help = "EXAMPLES:\n    ppa question edit q-3f9a1c0b7d2e --year 2021 --keywords \"kinematics, suvat\""
    )]
    Edit(QuestionEditArgs),

    #[command(
        about = "Delete a question and any bookmark pointing at it",
        after_help = "EXAMPLES:\n    ppa question rm q-3f9a1c0b7d2e"
    )]
    Rm(QuestionRmArgs),
}

#[derive(Args, Debug)]
pub struct QuestionAddArgs {
    #[arg(long)]
    pub subject: String,

    /// Examination year (defaults to the current year).
    #[arg(long)]
    pub year: Option<i32>,

    /// "May/June" or "Oct/Nov".
    #[arg(long, default_value = "May/June")]
    pub session: Session,

    #[arg(long, value_name = "NUMBER")]
    pub paper: String,

    #[arg(long, value_name = "TEXT")]
    pub text: String,

    #[arg(long, value_name = "TEXT")]
    pub scheme: String,

    /// Comma-separated keywords.
    #[arg(long, default_value = "")]
    pub keywords: String,
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("changes")
        .required(true)
        .multiple(true)
        .args(["subject", "year", "session", "paper", "text", "scheme", "keywords"])
))]
pub struct QuestionEditArgs {
    /// Id of the question to change.
    pub id: String,

    #[arg(long)]
    pub subject: Option<String>,

    #[arg(long)]
    pub year: Option<i32>,

    #[arg(long)]
    pub session: Option<Session>,

    #[arg(long, value_name = "NUMBER")]
    pub paper: Option<String>,

    #[arg(long, value_name = "TEXT")]
    pub text: Option<String>,

    #[arg(long, value_name = "TEXT")]
    pub scheme: Option<String>,

    /// Comma-separated keywords; replaces the existing list.
    #[arg(long)]
    pub keywords: Option<String>,
}

#[derive(Args, Debug)]
pub struct QuestionRmArgs {
    /// Id of the question to delete.
    pub id: String,
}

impl QuestionAddArgs {
    fn to_new_question(&self, current_year: i32) -> NewQuestion {
        NewQuestion {
            subject: self.subject.trim().to_string(),
            year: self.year.unwrap_or(current_year),
            session: self.session,
            paper_number: self.paper.trim().to_string(),
            question_text: self.text.trim().to_string(),
            mark_scheme: self.scheme.trim().to_string(),
            keywords: split_keywords(&self.keywords),
        }
    }
}

impl QuestionEditArgs {
    fn patch(&self) -> QuestionPatch {
        QuestionPatch {
            subject: trimmed(self.subject.as_deref()),
            year: self.year,
            session: self.session,
            paper_number: trimmed(self.paper.as_deref()),
            question_text: trimmed(self.text.as_deref()),
            mark_scheme: trimmed(self.scheme.as_deref()),
            keywords: self.keywords.as_deref().map(split_keywords),
        }
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

#[derive(Debug, Serialize)]
struct QuestionOutput {
    action: &'static str,
    question: Question,
    #[serde(skip_serializing_if = "Option::is_none")]
    bookmark_removed: Option<bool>,
}

/// Execute `ppa question <subcommand>`.
///
/// # Errors
///
/// Returns an error if the question is invalid, already present or missing,
/// or the corpus cannot be read or written.
pub fn run_question(args: &QuestionArgs, output: OutputMode, ws: &Workspace) -> Result<()> {
    let payload = match &args.command {
        QuestionCommand::Add(a) => add(a, output, ws)?,
        QuestionCommand::Edit(a) => edit(a, output, ws)?,
        QuestionCommand::Rm(a) => rm(a, output, ws)?,
    };
    render_mode(output, &payload, render_text, render_human)
}

fn invalid(output: OutputMode, question: &NewQuestion) -> Option<anyhow::Error> {
    let problems = check_question(question);
    if problems.is_empty() {
        return None;
    }
    Some(report(
        output,
        &CliError::from_code(ErrorCode::InvalidQuestion, ErrorCode::InvalidQuestion.message())
            .with_details(problems.iter().map(ToString::to_string).collect()),
    ))
}

fn not_found(output: OutputMode, id: &str) -> anyhow::Error {
    report(
        output,
        &CliError::from_code(ErrorCode::QuestionNotFound, format!("no question '{id}'")),
    )
}

fn add(args: &QuestionAddArgs, output: OutputMode, ws: &Workspace) -> Result<QuestionOutput> {
    let new = args.to_new_question(chrono::Utc::now().year());
    if let Some(err) = invalid(output, &new) {
        return Err(err);
    }

    let mut corpus = ws.corpus_or_empty(output)?;
    let merged = merge_new(&mut corpus, vec![new], &timestamp_now());
    let Some(id) = merged.added.first() else {
        let id = merged.duplicates.first().cloned().unwrap_or_default();
        return Err(report(
            output,
            &CliError::from_code(ErrorCode::QuestionExists, format!("question {id} already exists")),
        ));
    };

    save_corpus(&ws.corpus_path, &corpus)?;
    info!(%id, "question added");
    let question = find_question(&corpus, id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("added question {id} vanished"))?;
    Ok(QuestionOutput {
        action: "added",
        question,
        bookmark_removed: None,
    })
}

fn edit(args: &QuestionEditArgs, output: OutputMode, ws: &Workspace) -> Result<QuestionOutput> {
    let mut corpus = ws.require_corpus(output)?;
    let Some(current) = find_question(&corpus, &args.id) else {
        return Err(not_found(output, &args.id));
    };

    let edited = args.patch().applied_to(current);
    if let Some(err) = invalid(output, &NewQuestion::from(&edited)) {
        return Err(err);
    }

    replace_question(&mut corpus, edited.clone());
    save_corpus(&ws.corpus_path, &corpus)?;
    info!(id = %edited.id, "question edited");
    Ok(QuestionOutput {
        action: "edited",
        question: edited,
        bookmark_removed: None,
    })
}

fn rm(args: &QuestionRmArgs, output: OutputMode, ws: &Workspace) -> Result<QuestionOutput> {
    let mut corpus = ws.require_corpus(output)?;
    let Some(question) = remove_question(&mut corpus, &args.id) else {
        return Err(not_found(output, &args.id));
    };
    save_corpus(&ws.corpus_path, &corpus)?;

    let mut bookmarks = load_bookmarks_or_report(ws, output)?;
    let bookmark_removed = bookmarks.remove(&question.id);
    if bookmark_removed {
        save_bookmarks(&ws.bookmarks_path(), &bookmarks)?;
    }
    info!(id = %question.id, bookmark_removed, "question deleted");

    Ok(QuestionOutput {
        action: "removed",
        question,
        bookmark_removed: Some(bookmark_removed),
    })
}

fn render_text(p: &QuestionOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "{}\t{}", p.action, p.question.id)
}

fn render_human(p: &QuestionOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let q = &p.question;
    writeln!(w, "Question {} {}", q.id, p.action)?;
    pretty_kv(w, "Subject", &q.subject)?;
    pretty_kv(w, "Paper", format!("{} {} paper {}", q.year, q.session, q.paper_number))?;
    if !q.keywords.is_empty() {
        pretty_kv(w, "Keywords", q.keywords.join(", "))?;
    }
    if p.bookmark_removed == Some(true) {
        writeln!(w, "Its bookmark was removed too")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_args() -> QuestionAddArgs {
        QuestionAddArgs {
            subject: " Biology ".to_string(),
            year: None,
            session: Session::OctNov,
            paper: "3".to_string(),
            text: "Describe osmosis".to_string(),
            scheme: "Water moves".to_string(),
            keywords: "osmosis, , water potential".to_string(),
        }
    }

    #[test]
    fn add_args_trim_and_default_year() {
        let new = add_args().to_new_question(2026);
        assert_eq!(new.subject, "Biology");
        assert_eq!(new.year, 2026);
        assert_eq!(new.session, Session::OctNov);
        assert_eq!(new.keywords, vec!["osmosis", "water potential"]);
        assert!(check_question(&new).is_empty());
    }

    #[test]
    fn edit_args_only_patch_given_fields() {
        let args = QuestionEditArgs {
            id: "q-1".to_string(),
            subject: None,
            year: Some(2020),
            session: None,
            paper: None,
            text: Some("  New text ".to_string()),
            scheme: None,
            keywords: Some(String::new()),
        };
        let patch = args.patch();
        assert_eq!(patch.year, Some(2020));
        assert_eq!(patch.question_text.as_deref(), Some("New text"));
        assert_eq!(patch.keywords, Some(vec![]));
        assert!(patch.subject.is_none());
        assert!(patch.session.is_none());
    }

    #[test]
    fn human_render_mentions_removed_bookmark() {
        let question = add_args()
            .to_new_question(2024)
            .into_question("2024-01-01T00:00:00Z");
        let payload = QuestionOutput {
            action: "removed",
            question,
            bookmark_removed: Some(true),
        };
        let mut buf = Vec::new();
        render_human(&payload, &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("removed"));
        assert!(text.contains("2024 Oct/Nov paper 3"));
        assert!(text.contains("Its bookmark was removed too"));
    }
}
