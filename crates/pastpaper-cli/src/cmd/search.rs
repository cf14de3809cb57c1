//! `ppa search`: rank the question corpus against pasted exam text.
//!
//! Each successful search counts against the daily allowance of the local
//! plan and is appended to the history log that `ppa stats` reads.

use super::Workspace;
use super::bookmark::load_bookmarks_or_report;
use crate::output::{CliError, OutputMode, render_mode, report, truncate};
use clap::Args;
use pastpaper_core::analytics::{SearchRecord, append_history};
use pastpaper_core::error::ErrorCode;
use pastpaper_core::quota::save_usage;
use pastpaper_core::{CAMBRIDGE_SUBJECTS, Question};
use pastpaper_search::{ALL_CATEGORIES, Ranked, rank};
use serde::Serialize;
use std::io::Write;
use tracing::{debug, info};

#[derive(Args, Debug)]
#[command(
    about = "Find past-paper questions similar to pasted text",
    long_about = "Score every question in the corpus against the pasted text and show the \
                  closest matches (at most 10, best first).\n\n\
                  A body containing the whole query scores 0.9. Otherwise each query word \
                  longer than two characters earns 0.6 for overlapping a word of the question \
                  and 0.8 for overlapping a keyword, averaged over the query words.",
    after_help = "EXAMPLES:\n    # Paste a question\n    ppa search \"Find the derivative of f(x) = 3x^2\"\n\n\
                  # Restrict to one subject (case-insensitive)\n    ppa search \"osmosis in plant cells\" --subject biology\n\n\
                  # Machine-readable output\n    ppa search \"projectile motion\" --format json"
)]
pub struct SearchArgs {
    /// The question text to match.
    pub query: String,

    /// Only rank questions from this subject ("all" for every subject).
    #[arg(short, long)]
    pub subject: Option<String>,
}

/// JSON envelope for search output.
#[derive(Debug, Serialize)]
pub struct SearchOutput<'a> {
    pub query: String,
    pub subject: String,
    pub count: usize,
    /// Searches left today; `null` on the premium plan.
    pub remaining_searches: Option<u32>,
    pub results: Vec<Ranked<&'a Question>>,
    /// Ids among `results` that are bookmarked.
    pub bookmarked: Vec<String>,
}

/// Execute `ppa search <query>`.
///
/// # Errors
///
/// Returns an error if the query is blank, the corpus is missing, the subject
/// is unknown, the daily allowance is used up, or local state cannot be
/// written.
pub fn run_search(args: &SearchArgs, output: OutputMode, ws: &Workspace) -> anyhow::Result<()> {
    let query = args.query.trim();
    if query.is_empty() {
        return Err(report(
            output,
            &CliError::from_code(ErrorCode::EmptyQuery, "search query must not be empty"),
        ));
    }

    let corpus = ws.require_corpus(output)?;

    // A blank subject filters nothing, the same as "all".
    let subject = match args.subject.as_deref().map(str::trim) {
        Some("") => ALL_CATEGORIES.to_string(),
        Some(given) => given.to_string(),
        None => ws.config.search.default_subject.clone(),
    };
    if !is_known_subject(&subject, &corpus) {
        return Err(report(
            output,
            &CliError::from_code(ErrorCode::UnknownSubject, format!("unknown subject '{subject}'")),
        ));
    }

    let today = chrono::Utc::now().date_naive();
    let limit = ws.config.quota.free_daily_searches;
    let mut usage = ws.usage(output)?;

    if let Err(err) = usage.ensure_can_search(today, limit) {
        return Err(report(
            output,
            &CliError::from_code(ErrorCode::QuotaExhausted, err.to_string()),
        ));
    }
    let bookmarks = load_bookmarks_or_report(ws, output)?;

    let filter = (!subject.eq_ignore_ascii_case(ALL_CATEGORIES)).then_some(subject.as_str());
    let results = rank(query, &corpus, filter);
    debug!(corpus = corpus.len(), matched = results.len(), "ranked corpus");

    usage.record_search(today);
    save_usage(&ws.usage_path(), &usage)?;
    append_history(
        &ws.history_path(),
        &SearchRecord {
            query: query.to_string(),
            results_count: results.len(),
            created_at: chrono::Utc::now(),
        },
    )?;
    info!(results = results.len(), plan = %usage.plan, "search recorded");

    let bookmarked = results
        .iter()
        .filter(|r| bookmarks.contains(&r.candidate.id))
        .map(|r| r.candidate.id.clone())
        .collect();
    let search_output = SearchOutput {
        query: query.to_string(),
        subject,
        count: results.len(),
        remaining_searches: usage.remaining(today, limit),
        results,
        bookmarked,
    };

    render_mode(
        output,
        &search_output,
        |out, w| render_search_text(out, w),
        |out, w| render_search_human(out, w),
    )
}

fn is_known_subject(subject: &str, corpus: &[Question]) -> bool {
    subject.eq_ignore_ascii_case(ALL_CATEGORIES)
        || CAMBRIDGE_SUBJECTS
            .iter()
            .any(|known| known.to_lowercase() == subject.to_lowercase())
        || corpus
            .iter()
            .any(|q| q.subject.to_lowercase() == subject.to_lowercase())
}

/// Render search results in human-readable format.
fn render_search_human(out: &SearchOutput<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    if out.results.is_empty() {
        writeln!(w, "No similar questions for '{}'", truncate(&out.query, 60))?;
        writeln!(w, "Try pasting more of the question or a different subject")?;
    } else {
        writeln!(w, "{} similar question(s):", out.count)?;
        crate::output::pretty_rule(w)?;
        writeln!(
            w,
            "{:>5}  {:<14}  {:<18}  {:>4}  {:<8}  {:<5}  QUESTION",
            "SCORE", "ID", "SUBJECT", "YEAR", "SESSION", "PAPER"
        )?;
        crate::output::pretty_rule(w)?;
        for r in &out.results {
            let q = r.candidate;
            let marker = if out.bookmarked.contains(&q.id) { "*" } else { "" };
            let id = format!("{}{marker}", q.id);
            writeln!(
                w,
                "{:>4.0}%  {:<14}  {:<18}  {:>4}  {:<8}  {:<5}  {}",
                r.similarity * 100.0,
                id,
                truncate(&q.subject, 18),
                q.year,
                q.session.as_str(),
                q.paper_number,
                truncate(&q.question_text, 40)
            )?;
        }
    }

    if !out.bookmarked.is_empty() {
        writeln!(w, "* bookmarked")?;
    }

    if let Some(remaining) = out.remaining_searches {
        writeln!(w)?;
        writeln!(w, "{remaining} search(es) left today on the free plan")?;
    }
    Ok(())
}

fn render_search_text(out: &SearchOutput<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    for r in &out.results {
        let q = r.candidate;
        writeln!(
            w,
            "{:.3}\t{}\t{}\t{}\t{}\t{}\t{}",
            r.similarity,
            q.id,
            q.subject,
            q.year,
            q.session,
            q.paper_number,
            truncate(&q.question_text, 80)
        )?;
    }
    Ok(())
}
