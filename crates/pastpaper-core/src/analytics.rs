//! Search-history analytics for the admin dashboard.
//!
//! Every search appends a [`SearchRecord`] to an append-only JSONL log. The
//! functions here aggregate a slice of records; none of them touch disk
//! except [`load_history`] and [`append_history`].

use anyhow::{Context, Result};
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tracing::warn;

/// Queries at or below this many characters are ignored by [`search_trends`].
pub const TREND_MIN_QUERY_CHARS: usize = 10;

/// Number of entries returned by [`search_trends`].
pub const TREND_LIMIT: usize = 10;

/// One executed search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub query: String,
    pub results_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectCount {
    pub subject: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryCount {
    pub query: String,
    pub count: usize,
}

/// Number of entries returned by [`recent`] by default.
pub const RECENT_LIMIT: usize = 10;

fn days_before(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

/// Records created on or after the start of the day `days` days before
/// `today`. The window therefore spans `days + 1` calendar days, one more
/// than the buckets of [`daily_counts`].
#[must_use]
pub fn within_window(records: &[SearchRecord], today: NaiveDate, days: u32) -> Vec<SearchRecord> {
    let start = days_before(today, days);
    records
        .iter()
        .filter(|r| r.created_at.date_naive() >= start)
        .cloned()
        .collect()
}

/// One bucket per day, oldest first, ending on `today`.
#[must_use]
pub fn daily_counts(records: &[SearchRecord], today: NaiveDate, days: u32) -> Vec<DailyCount> {
    let start = days_before(today, days.saturating_sub(1));
    let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();
    for record in records {
        *per_day.entry(record.created_at.date_naive()).or_default() += 1;
    }

    start
        .iter_days()
        .take_while(|date| *date <= today)
        .map(|date| DailyCount {
            date,
            count: per_day.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

/// Count queries that mention each subject by name.
///
/// A query may count toward several subjects. Subjects nobody searched for
/// are omitted; ties keep the order of `subjects`.
#[must_use]
pub fn subject_popularity(records: &[SearchRecord], subjects: &[&str]) -> Vec<SubjectCount> {
    let lowered: Vec<String> = records.iter().map(|r| r.query.to_lowercase()).collect();

    let mut counts: Vec<SubjectCount> = subjects
        .iter()
        .map(|subject| {
            let needle = subject.to_lowercase();
            SubjectCount {
                subject: (*subject).to_string(),
                count: lowered.iter().filter(|q| q.contains(&needle)).count(),
            }
        })
        .filter(|c| c.count > 0)
        .collect();

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Most repeated substantial queries, normalized to trimmed lower case.
#[must_use]
pub fn search_trends(records: &[SearchRecord]) -> Vec<QueryCount> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for record in records {
        let query = record.query.trim().to_lowercase();
        if query.chars().count() <= TREND_MIN_QUERY_CHARS {
            continue;
        }
        let count = counts.entry(query.clone()).or_insert(0);
        if *count == 0 {
            order.push(query);
        }
        *count += 1;
    }

    let mut trends: Vec<QueryCount> = order
        .into_iter()
        .map(|query| {
            let count = counts.get(&query).copied().unwrap_or(0);
            QueryCount { query, count }
        })
        .collect();
    trends.sort_by(|a, b| b.count.cmp(&a.count));
    trends.truncate(TREND_LIMIT);
    trends
}

/// Rounded mean of `results_count`; `0` for an empty history.
#[must_use]
pub fn average_results(records: &[SearchRecord]) -> usize {
    if records.is_empty() {
        return 0;
    }
    let total: usize = records.iter().map(|r| r.results_count).sum();
    (total as f64 / records.len() as f64).round() as usize
}

/// The `limit` most recent records, newest first.
#[must_use]
pub fn recent(records: &[SearchRecord], limit: usize) -> Vec<SearchRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(limit);
    sorted
}

/// Read a JSONL history log. Missing file → empty; corrupt lines are skipped.
pub fn load_history(path: &Path) -> Result<Vec<SearchRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file =
        std::fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    let mut records = Vec::new();
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<SearchRecord>(&line) {
            Ok(record) => records.push(record),
            Err(err) => warn!(line = line_no + 1, %err, "skipping corrupt history line"),
        }
    }
    Ok(records)
}

pub fn append_history(path: &Path, record: &SearchRecord) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let line = serde_json::to_string(record)?;
    writeln!(file, "{line}").with_context(|| format!("Failed to append to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, query: &str, results: usize) -> SearchRecord {
        SearchRecord {
            query: query.to_string(),
            results_count: results,
            created_at: Utc
                .with_ymd_and_hms(2024, 3, day, 12, 0, 0)
                .single()
                .expect("valid timestamp"),
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).expect("valid date")
    }

    #[test]
    fn daily_counts_cover_window_oldest_first() {
        let records = vec![at(8, "a", 1), at(10, "b", 1), at(10, "c", 1), at(1, "old", 1)];
        let buckets = daily_counts(&records, date(10), 3);
        assert_eq!(
            buckets,
            vec![
                DailyCount { date: date(8), count: 1 },
                DailyCount { date: date(9), count: 0 },
                DailyCount { date: date(10), count: 2 },
            ]
        );
    }

    #[test]
    fn window_filters_older_records() {
        let records = vec![at(1, "old", 1), at(9, "new", 1)];
        let recent = within_window(&records, date(10), 7);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].query, "new");
    }

    #[test]
    fn window_reaches_back_a_full_extra_day() {
        let records = vec![at(2, "too old", 1), at(3, "edge", 1), at(10, "today", 1)];
        let window = within_window(&records, date(10), 7);
        let queries: Vec<&str> = window.iter().map(|r| r.query.as_str()).collect();
        assert_eq!(queries, vec!["edge", "today"]);
        assert_eq!(daily_counts(&window, date(10), 7)[0].date, date(4));
    }

    #[test]
    fn recent_is_newest_first_and_capped() {
        let records: Vec<_> = (1..=12).map(|d| at(d, &format!("query {d}"), 0)).collect();
        let latest = recent(&records, RECENT_LIMIT);
        assert_eq!(latest.len(), 10);
        assert_eq!(latest[0].query, "query 12");
        assert_eq!(latest[9].query, "query 3");
        assert!(recent(&[], RECENT_LIMIT).is_empty());
    }

    #[test]
    fn subject_popularity_matches_names_case_insensitively() {
        let records = vec![
            at(1, "physics projectile motion", 2),
            at(1, "PHYSICS waves", 1),
            at(1, "mathematics and physics", 1),
            at(1, "osmosis", 0),
        ];
        let subjects = ["Mathematics", "Physics", "Biology"];
        let popularity = subject_popularity(&records, &subjects);
        assert_eq!(
            popularity,
            vec![
                SubjectCount { subject: "Physics".into(), count: 3 },
                SubjectCount { subject: "Mathematics".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn trends_ignore_short_queries_and_normalize() {
        let records = vec![
            at(1, "short", 0),
            at(1, "exactly10c", 0),
            at(1, "  Derivative of f(x) ", 1),
            at(1, "derivative of f(x)", 1),
            at(1, "maximum height reached", 1),
        ];
        let trends = search_trends(&records);
        assert_eq!(
            trends,
            vec![
                QueryCount { query: "derivative of f(x)".into(), count: 2 },
                QueryCount { query: "maximum height reached".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn trends_are_capped() {
        let records: Vec<_> = (0..15)
            .map(|i| at(1, &format!("distinct query number {i}"), 0))
            .collect();
        assert_eq!(search_trends(&records).len(), TREND_LIMIT);
    }

    #[test]
    fn average_results_rounds() {
        assert_eq!(average_results(&[]), 0);
        assert_eq!(average_results(&[at(1, "a", 1), at(1, "b", 2)]), 2);
        assert_eq!(average_results(&[at(1, "a", 1), at(1, "b", 1), at(1, "c", 2)]), 1);
    }

    #[test]
    fn history_log_appends_and_skips_corrupt_lines() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("state/history.jsonl");
        assert!(load_history(&path).expect("missing is empty").is_empty());

        append_history(&path, &at(1, "first", 1)).expect("append");
        std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .and_then(|mut f| writeln!(f, "{{not json"))
            .expect("write garbage");
        append_history(&path, &at(2, "second", 0)).expect("append");

        let loaded = load_history(&path).expect("load");
        assert_eq!(loaded, vec![at(1, "first", 1), at(2, "second", 0)]);
    }
}
