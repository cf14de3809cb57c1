//! `ppa history`: your most recent searches.

use super::Workspace;
use crate::output::{OutputMode, pretty_kv, pretty_rule, render_mode, truncate};
use clap::Args;
use pastpaper_core::analytics::{
    RECENT_LIMIT, SearchRecord, average_results, load_history, recent,
};
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug)]
#[command(
    about = "Show recent searches",
    after_help = "EXAMPLES:\n    ppa history\n    ppa history --limit 3 --format json"
)]
pub struct HistoryArgs {
    /// Number of searches to show, newest first.
    #[arg(short = 'n', long, default_value_t = RECENT_LIMIT)]
    pub limit: usize,
}

#[derive(Debug, Serialize)]
struct HistoryOutput {
    count: usize,
    total_searches: usize,
    avg_results_per_search: usize,
    searches: Vec<SearchRecord>,
}

/// Execute `ppa history`.
///
/// # Errors
///
/// Returns an error if the history log cannot be read.
pub fn run_history(args: &HistoryArgs, output: OutputMode, ws: &Workspace) -> anyhow::Result<()> {
    let history = load_history(&ws.history_path())?;
    let searches = recent(&history, args.limit);

    // Totals cover the whole log, not just the rows shown.
    let payload = HistoryOutput {
        count: searches.len(),
        total_searches: history.len(),
        avg_results_per_search: average_results(&history),
        searches,
    };

    render_mode(
        output,
        &payload,
        |p, w| {
            for s in &p.searches {
                writeln!(
                    w,
                    "{}\t{}\t{}",
                    s.created_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                    s.results_count,
                    s.query
                )?;
            }
            Ok(())
        },
        render_history_human,
    )
}

fn render_history_human(p: &HistoryOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if p.searches.is_empty() {
        return writeln!(w, "No searches yet. Try `ppa search \"<question text>\"`");
    }
    pretty_kv(w, "Searches", p.total_searches.to_string())?;
    pretty_kv(w, "Results/search", p.avg_results_per_search.to_string())?;
    writeln!(w)?;
    writeln!(w, "{:<16}  {:>7}  QUERY", "WHEN", "RESULTS")?;
    pretty_rule(w)?;
    for s in &p.searches {
        writeln!(
            w,
            "{:<16}  {:>7}  {}",
            s.created_at.format("%Y-%m-%d %H:%M").to_string(),
            s.results_count,
            truncate(&s.query, 60)
        )?;
    }
    Ok(())
}
