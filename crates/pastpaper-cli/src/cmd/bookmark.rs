//! `ppa bookmark`: save questions for later.
//!
//! Subcommands:
//! - `ppa bookmark add <ID>` saves a corpus question
//! - `ppa bookmark rm <ID>` forgets it
//! - `ppa bookmark toggle <ID>` flips the saved state
//! - `ppa bookmark list` shows saved questions, newest first

use super::Workspace;
use crate::output::{CliError, OutputMode, pretty_rule, render_mode, report, truncate};
use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use pastpaper_core::Question;
use pastpaper_core::bookmarks::{Bookmarks, load_bookmarks, save_bookmarks};
use pastpaper_core::corpus::find_question;
use pastpaper_core::error::ErrorCode;
use serde::Serialize;
use std::io::Write;
use tracing::info;

// ---------------------------------------------------------------------------
// Clap types
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
#[command(about = "Save questions for later")]
pub struct BookmarkArgs {
    #[command(subcommand)]
    pub command: BookmarkCommand,
}

#[derive(Subcommand, Debug)]
pub enum BookmarkCommand {
    #[command(
        about = "Bookmark a question",
        after_help = "EXAMPLES:\n    ppa bookmark add q-3f9a1c0b7d2e"
    )]
    Add(BookmarkIdArgs),

    #[command(
        about = "Remove a bookmark",
        after_help = "EXAMPLES:\n    ppa bookmark rm q-3f9a1c0b7d2e"
    )]
    Rm(BookmarkIdArgs),

    #[command(
        about = "Bookmark a question, or remove the bookmark if it is already saved",
        after_help = "EXAMPLES:\n    ppa bookmark toggle q-3f9a1c0b7d2e"
    )]
    Toggle(BookmarkIdArgs),

    #[command(
        about = "List bookmarked questions, newest first",
        after_help = "EXAMPLES:\n    ppa bookmark list\n    ppa bookmark list --format json"
    )]
    List,
}

#[derive(Args, Debug)]
pub struct BookmarkIdArgs {
    /// Question id, as shown by `ppa search` or `ppa browse`.
    pub id: String,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct BookmarkChange {
    question_id: String,
    bookmarked: bool,
    changed: bool,
}

#[derive(Debug, Serialize)]
struct BookmarkedQuestion<'a> {
    #[serde(flatten)]
    question: &'a Question,
    bookmarked_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct BookmarkList<'a> {
    count: usize,
    bookmarks: Vec<BookmarkedQuestion<'a>>,
    /// Bookmarked ids whose question is no longer in the corpus.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    missing: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Add,
    Remove,
    Toggle,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Load the bookmark store, rendering a structured error when it is corrupt.
pub fn load_bookmarks_or_report(ws: &Workspace, output: OutputMode) -> Result<Bookmarks> {
    load_bookmarks(&ws.bookmarks_path()).map_err(|err| {
        report(
            output,
            &CliError::from_code(ErrorCode::BookmarksParseError, format!("{err:#}")),
        )
    })
}

/// Execute `ppa bookmark <subcommand>`.
///
/// # Errors
///
/// Returns an error if the question does not exist, or the corpus or the
/// bookmark store cannot be read or written.
pub fn run_bookmark(args: &BookmarkArgs, output: OutputMode, ws: &Workspace) -> Result<()> {
    match &args.command {
        BookmarkCommand::Add(a) => run_change(&a.id, Action::Add, output, ws),
        BookmarkCommand::Rm(a) => run_change(&a.id, Action::Remove, output, ws),
        BookmarkCommand::Toggle(a) => run_change(&a.id, Action::Toggle, output, ws),
        BookmarkCommand::List => run_list(output, ws),
    }
}

fn run_change(id: &str, action: Action, output: OutputMode, ws: &Workspace) -> Result<()> {
    let mut store = load_bookmarks_or_report(ws, output)?;
    let now = chrono::Utc::now();

    // Removing works for questions that have since left the corpus.
    let saving = match action {
        Action::Add => true,
        Action::Remove => false,
        Action::Toggle => !store.contains(id),
    };
    if saving {
        let corpus = ws.require_corpus(output)?;
        if find_question(&corpus, id).is_none() {
            return Err(report(
                output,
                &CliError::from_code(ErrorCode::QuestionNotFound, format!("no question '{id}'")),
            ));
        }
    }

    let changed = match action {
        Action::Add => store.add(id, now),
        Action::Remove => store.remove(id),
        Action::Toggle => {
            store.toggle(id, now);
            true
        }
    };
    if changed {
        save_bookmarks(&ws.bookmarks_path(), &store)?;
        info!(question_id = id, bookmarked = store.contains(id), "bookmarks updated");
    }

    let payload = BookmarkChange {
        question_id: id.to_string(),
        bookmarked: store.contains(id),
        changed,
    };
    render_mode(output, &payload, render_change_text, render_change_human)
}

fn run_list(output: OutputMode, ws: &Workspace) -> Result<()> {
    let store = load_bookmarks_or_report(ws, output)?;
    let corpus = ws.corpus_or_empty(output)?;
    let payload = bookmark_list(&store, &corpus);

    render_mode(output, &payload, render_list_text, render_list_human)
}

fn bookmark_list<'a>(store: &Bookmarks, corpus: &'a [Question]) -> BookmarkList<'a> {
    let mut bookmarks = Vec::new();
    let mut missing = Vec::new();
    for bookmark in store.newest_first() {
        match find_question(corpus, &bookmark.question_id) {
            Some(question) => bookmarks.push(BookmarkedQuestion {
                question,
                bookmarked_at: bookmark.created_at,
            }),
            None => missing.push(bookmark.question_id.clone()),
        }
    }
    BookmarkList {
        count: bookmarks.len(),
        bookmarks,
        missing,
    }
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

fn render_change_text(p: &BookmarkChange, w: &mut dyn Write) -> std::io::Result<()> {
    let state = if p.bookmarked { "bookmarked" } else { "not-bookmarked" };
    writeln!(w, "{}\t{state}", p.question_id)
}

fn render_change_human(p: &BookmarkChange, w: &mut dyn Write) -> std::io::Result<()> {
    match (p.bookmarked, p.changed) {
        (true, true) => writeln!(w, "Bookmarked {}", p.question_id),
        (true, false) => writeln!(w, "{} is already bookmarked", p.question_id),
        (false, true) => writeln!(w, "Removed bookmark {}", p.question_id),
        (false, false) => writeln!(w, "{} was not bookmarked", p.question_id),
    }
}

fn render_list_text(p: &BookmarkList<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    for b in &p.bookmarks {
        let q = b.question;
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            q.id,
            q.subject,
            q.year,
            q.session,
            b.bookmarked_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            truncate(&q.question_text, 80)
        )?;
    }
    Ok(())
}

fn render_list_human(p: &BookmarkList<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    if p.bookmarks.is_empty() {
        writeln!(w, "No bookmarks yet. Save one with `ppa bookmark add <ID>`")?;
    } else {
        writeln!(w, "{} bookmarked question(s)", p.count)?;
        pretty_rule(w)?;
        for b in &p.bookmarks {
            let q = b.question;
            writeln!(
                w,
                "{:<14}  {:<18}  {:>4}  {:<8}  {}",
                q.id,
                truncate(&q.subject, 18),
                q.year,
                q.session.as_str(),
                truncate(&q.question_text, 40)
            )?;
        }
    }
    if !p.missing.is_empty() {
        writeln!(w)?;
        writeln!(w, "{} bookmark(s) point at deleted questions:", p.missing.len())?;
        for id in &p.missing {
            writeln!(w, "  {id}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pastpaper_core::Session;

    fn question(id: &str) -> Question {
        Question {
            id: id.to_string(),
            subject: "Biology".to_string(),
            year: 2022,
            session: Session::MayJune,
            paper_number: "3".to_string(),
            question_text: "Describe osmosis".to_string(),
            mark_scheme: "Water moves".to_string(),
            keywords: vec![],
            created_at: None,
        }
    }

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 2, 9, minute, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn list_joins_corpus_and_flags_missing() {
        let corpus = vec![question("q-a"), question("q-b")];
        let mut store = Bookmarks::default();
        store.add("q-a", at(0));
        store.add("q-gone", at(5));
        store.add("q-b", at(10));

        let list = bookmark_list(&store, &corpus);
        let ids: Vec<&str> = list.bookmarks.iter().map(|b| b.question.id.as_str()).collect();
        assert_eq!(ids, vec!["q-b", "q-a"]);
        assert_eq!(list.count, 2);
        assert_eq!(list.missing, vec!["q-gone"]);

        let value = serde_json::to_value(&list).expect("serialize");
        assert_eq!(value["bookmarks"][0]["subject"], "Biology");
        assert!(value["bookmarks"][0]["bookmarked_at"].is_string());
    }

    #[test]
    fn change_messages() {
        let render = |bookmarked, changed| {
            let mut buf = Vec::new();
            render_change_human(
                &BookmarkChange {
                    question_id: "q-a".to_string(),
                    bookmarked,
                    changed,
                },
                &mut buf,
            )
            .expect("render");
            String::from_utf8(buf).expect("utf8")
        };
        assert_eq!(render(true, true), "Bookmarked q-a\n");
        assert_eq!(render(true, false), "q-a is already bookmarked\n");
        assert_eq!(render(false, true), "Removed bookmark q-a\n");
        assert_eq!(render(false, false), "q-a was not bookmarked\n");
    }

    #[test]
    fn empty_list_suggests_adding() {
        let list = bookmark_list(&Bookmarks::default(), &[]);
        let mut buf = Vec::new();
        render_list_human(&list, &mut buf).expect("render");
        assert!(String::from_utf8(buf).expect("utf8").starts_with("No bookmarks yet"));
    }
}
