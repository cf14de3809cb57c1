//! `ppa stats`: search activity over a trailing window of days.

use std::io::Write;

use clap::Args;
use pastpaper_core::CAMBRIDGE_SUBJECTS;
use pastpaper_core::analytics::{
    DailyCount, QueryCount, SubjectCount, average_results, daily_counts, load_history,
    search_trends, subject_popularity, within_window,
};
use serde::Serialize;

use super::Workspace;
use crate::output::{OutputMode, pretty_kv, pretty_rule, render_mode, truncate};

/// Arguments for `ppa stats`.
#[derive(Args, Debug)]
#[command(
    about = "Show search analytics",
    long_about = "Summarize the local search history: searches per day, subjects people search \
                  for, and the most repeated queries.",
    after_help = "EXAMPLES:\n    # Last 30 days (default)\n    ppa stats\n\n\
                  # Last week, machine-readable\n    ppa stats --days 7 --format json"
)]
pub struct StatsArgs {
    /// Length of the reporting window in days, ending today.
    #[arg(short, long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..=366))]
    pub days: u32,
}

/// Report payload for `ppa stats`.
#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub days: u32,
    pub total_searches: usize,
    pub avg_searches_per_day: usize,
    pub avg_results_per_search: usize,
    pub daily: Vec<DailyCount>,
    pub subjects: Vec<SubjectCount>,
    pub trends: Vec<QueryCount>,
}

/// Execute `ppa stats`.
///
/// # Errors
///
/// Returns an error if the history log cannot be read.
pub fn run_stats(args: &StatsArgs, output: OutputMode, ws: &Workspace) -> anyhow::Result<()> {
    let history = load_history(&ws.history_path())?;
    let today = chrono::Utc::now().date_naive();
    let report = build_report(&history, today, args.days);

    render_mode(
        output,
        &report,
        |r, w| render_stats_text(r, w),
        |r, w| render_stats_human(r, w),
    )
}

fn build_report(
    history: &[pastpaper_core::analytics::SearchRecord],
    today: chrono::NaiveDate,
    days: u32,
) -> StatsReport {
    let window = within_window(history, today, days);
    let daily = daily_counts(&window, today, days);
    let total_searches: usize = daily.iter().map(|d| d.count).sum();
    let avg_searches_per_day = if daily.is_empty() {
        0
    } else {
        (total_searches as f64 / daily.len() as f64).round() as usize
    };

    StatsReport {
        days,
        total_searches,
        avg_searches_per_day,
        avg_results_per_search: average_results(&window),
        daily,
        subjects: subject_popularity(&window, &CAMBRIDGE_SUBJECTS),
        trends: search_trends(&window),
    }
}

fn render_stats_human(r: &StatsReport, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "Search activity, last {} day(s)", r.days)?;
    pretty_rule(w)?;
    pretty_kv(w, "Searches", r.total_searches.to_string())?;
    pretty_kv(w, "Per day", r.avg_searches_per_day.to_string())?;
    pretty_kv(w, "Results/search", r.avg_results_per_search.to_string())?;

    let busiest = r.daily.iter().map(|d| d.count).max().unwrap_or(0);
    if busiest > 0 {
        writeln!(w)?;
        writeln!(w, "Daily searches")?;
        pretty_rule(w)?;
        for day in r.daily.iter().filter(|d| d.count > 0) {
            let bar = "#".repeat((day.count * 40).div_ceil(busiest));
            writeln!(w, "{}  {:>4}  {bar}", day.date, day.count)?;
        }
    }

    if !r.subjects.is_empty() {
        writeln!(w)?;
        writeln!(w, "Popular subjects")?;
        pretty_rule(w)?;
        for s in &r.subjects {
            writeln!(w, "{:<24}  {:>4}", s.subject, s.count)?;
        }
    }

    if !r.trends.is_empty() {
        writeln!(w)?;
        writeln!(w, "Top queries")?;
        pretty_rule(w)?;
        for t in &r.trends {
            writeln!(w, "{:>4}  {}", t.count, truncate(&t.query, 80))?;
        }
    }
    Ok(())
}

fn render_stats_text(r: &StatsReport, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "days={} searches={} per_day={} results_per_search={}",
        r.days, r.total_searches, r.avg_searches_per_day, r.avg_results_per_search
    )?;
    for day in &r.daily {
        writeln!(w, "day\t{}\t{}", day.date, day.count)?;
    }
    for s in &r.subjects {
        writeln!(w, "subject\t{}\t{}", s.subject, s.count)?;
    }
    for t in &r.trends {
        writeln!(w, "query\t{}\t{}", t.count, t.query)?;
    }
    Ok(())
}
