//! `ppa browse`: list corpus questions narrowed by term, subject and year.

use super::Workspace;
use crate::output::{OutputMode, pretty_rule, render_mode, truncate};
use clap::Args;
use pastpaper_core::Question;
use pastpaper_search::catalog::{CatalogFilter, filter};
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug, Default)]
#[command(
    about = "Browse questions in the corpus",
    long_about = "List questions in corpus order, optionally narrowed by a search term, an exact \
                  subject and an exact year. The term matches question text, mark schemes and \
                  keywords, ignoring case.",
    after_help = "EXAMPLES:\n    # Everything\n    ppa browse\n\n\
                  # Physics questions from 2023 mentioning velocity\n    ppa browse --subject Physics --year 2023 --term velocity\n\n\
                  # Machine-readable output\n    ppa browse --format json"
)]
pub struct BrowseArgs {
    /// Case-insensitive substring of question text, mark scheme or keywords.
    #[arg(short, long)]
    pub term: Option<String>,

    /// Exact subject name ("all" for every subject).
    #[arg(short, long)]
    pub subject: Option<String>,

    /// Exact examination year.
    #[arg(short, long)]
    pub year: Option<i32>,
}

impl BrowseArgs {
    fn criteria(&self) -> CatalogFilter {
        CatalogFilter {
            term: self.term.clone(),
            subject: self.subject.clone(),
            year: self.year,
        }
    }
}

#[derive(Debug, Serialize)]
struct BrowseOutput<'a> {
    total: usize,
    count: usize,
    questions: Vec<&'a Question>,
}

/// Execute `ppa browse`.
pub fn run_browse(args: &BrowseArgs, output: OutputMode, ws: &Workspace) -> anyhow::Result<()> {
    let corpus = ws.require_corpus(output)?;
    let questions = filter(&corpus, &args.criteria());

    let payload = BrowseOutput {
        total: corpus.len(),
        count: questions.len(),
        questions,
    };

    render_mode(
        output,
        &payload,
        |p, w| render_browse_text(p, w),
        |p, w| render_browse_human(p, w),
    )
}

fn render_browse_human(p: &BrowseOutput<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    if p.questions.is_empty() {
        return writeln!(w, "No questions match ({} in corpus)", p.total);
    }

    writeln!(w, "Showing {} of {} question(s)", p.count, p.total)?;
    pretty_rule(w)?;
    writeln!(
        w,
        "{:<14}  {:<18}  {:>4}  {:<8}  {:<5}  QUESTION",
        "ID", "SUBJECT", "YEAR", "SESSION", "PAPER"
    )?;
    pretty_rule(w)?;
    for q in &p.questions {
        writeln!(
            w,
            "{:<14}  {:<18}  {:>4}  {:<8}  {:<5}  {}",
            q.id,
            truncate(&q.subject, 18),
            q.year,
            q.session.as_str(),
            q.paper_number,
            truncate(&q.question_text, 30)
        )?;
    }
    Ok(())
}

fn render_browse_text(p: &BrowseOutput<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    for q in &p.questions {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
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
