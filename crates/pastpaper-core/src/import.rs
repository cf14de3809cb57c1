//! Bulk question import from CSV.
//!
//! The admin back-office accepts a CSV document with the header
//! `subject,year,session,paper_number,question_text,mark_scheme,keywords`.
//! Missing trailing fields parse as empty strings. Validation reports every
//! failing rule per row, prefixed with the source line the row starts on.
//!
//! # Quoting
//!
//! - A `"` toggles quoted mode and is not part of the value.
//! - Inside quotes, `""` is a literal quote.
//! - Commas and newlines inside quotes belong to the field, so multi-line
//!   mark schemes survive.
//! - Values are trimmed after unquoting.

use crate::model::question::{NewQuestion, Session, split_keywords};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Header row expected by [`import_csv`].
pub const CSV_HEADER: &str = "subject,year,session,paper_number,question_text,mark_scheme,keywords";

/// Downloadable template with two worked rows.
pub const TEMPLATE_CSV: &str = r#"subject,year,session,paper_number,question_text,mark_scheme,keywords
Mathematics,2023,May/June,1,"Calculate the derivative of f(x) = 3x² + 2x - 1","Step 1: Apply power rule to each term
f'(x) = 6x + 2
Step 2: The derivative is f'(x) = 6x + 2","derivative,calculus,power rule"
Physics,2023,Oct/Nov,2,"A ball is thrown vertically upward with initial velocity 20 m/s. Calculate the maximum height reached.","Using v² = u² + 2as
At maximum height, v = 0
0 = 20² + 2(-9.8)s
s = 400/(2×9.8) = 20.4 m","kinematics,projectile motion,maximum height"
"#;

/// One parsed CSV record keyed by header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    /// 1-based line on which the record starts.
    pub line_number: usize,
    pub fields: BTreeMap<String, String>,
}

impl CsvRow {
    /// Field value, or `""` when the column is absent.
    #[must_use]
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map_or("", String::as_str)
    }
}

/// A single validation rule a row failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RowProblem {
    #[error("Subject is required")]
    MissingSubject,
    #[error("Valid year is required")]
    InvalidYear,
    #[error("Session must be \"May/June\" or \"Oct/Nov\"")]
    InvalidSession,
    #[error("Paper number is required")]
    MissingPaperNumber,
    #[error("Question text is required")]
    MissingQuestionText,
    #[error("Mark scheme is required")]
    MissingMarkScheme,
}

/// Errors that abort an import as a whole.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    #[error("no CSV data to import")]
    Empty,
    #[error("no valid rows found ({} problem line(s))", errors.len())]
    NoValidRows { errors: Vec<String> },
}

/// Outcome of a successful import: valid rows plus per-line problems.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub accepted: Vec<NewQuestion>,
    pub errors: Vec<String>,
}

/// Split CSV text into raw records, each tagged with its starting line.
fn split_records(text: &str) -> Vec<(usize, Vec<String>)> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut line = 1usize;
    let mut record_start = 1usize;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current).trim().to_string()),
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut current).trim().to_string());
                records.push((record_start, std::mem::take(&mut fields)));
                line += 1;
                record_start = line;
            }
            '\n' => {
                current.push('\n');
                line += 1;
            }
            other => current.push(other),
        }
    }

    if !current.is_empty() || !fields.is_empty() {
        fields.push(current.trim().to_string());
        records.push((record_start, fields));
    }

    records.retain(|(_, fields)| fields.iter().any(|f| !f.is_empty()));
    records
}

/// Parse CSV text into header-keyed rows. The first record is the header.
#[must_use]
pub fn parse_csv(text: &str) -> Vec<CsvRow> {
    let mut records = split_records(text).into_iter();
    let Some((_, headers)) = records.next() else {
        return Vec::new();
    };

    records
        .map(|(line_number, values)| {
            let fields = headers
                .iter()
                .enumerate()
                .map(|(i, header)| (header.clone(), values.get(i).cloned().unwrap_or_default()))
                .collect();
            CsvRow {
                line_number,
                fields,
            }
        })
        .collect()
}

/// Check a row against the import rules, collecting every problem.
///
/// # Errors
///
/// Every [`RowProblem`] the row fails, in column order.
pub fn validate_row(row: &CsvRow) -> Result<NewQuestion, Vec<RowProblem>> {
    let mut problems = Vec::new();

    let subject = row.get("subject");
    if subject.is_empty() {
        problems.push(RowProblem::MissingSubject);
    }
    let year = row.get("year").parse::<i32>().ok();
    if year.is_none() {
        problems.push(RowProblem::InvalidYear);
    }
    let session = row.get("session").parse::<Session>().ok();
    if session.is_none() {
        problems.push(RowProblem::InvalidSession);
    }
    let paper_number = row.get("paper_number");
    if paper_number.is_empty() {
        problems.push(RowProblem::MissingPaperNumber);
    }
    let question_text = row.get("question_text");
    if question_text.is_empty() {
        problems.push(RowProblem::MissingQuestionText);
    }
    let mark_scheme = row.get("mark_scheme");
    if mark_scheme.is_empty() {
        problems.push(RowProblem::MissingMarkScheme);
    }

    match (year, session) {
        (Some(year), Some(session)) if problems.is_empty() => Ok(NewQuestion {
            subject: subject.to_string(),
            year,
            session,
            paper_number: paper_number.to_string(),
            question_text: question_text.to_string(),
            mark_scheme: mark_scheme.to_string(),
            keywords: split_keywords(row.get("keywords")),
        }),
        _ => Err(problems),
    }
}

/// Required text fields of an already typed question that are blank, in
/// column order. Used for single-question adds and edits.
#[must_use]
pub fn check_question(question: &NewQuestion) -> Vec<RowProblem> {
    [
        (question.subject.as_str(), RowProblem::MissingSubject),
        (question.paper_number.as_str(), RowProblem::MissingPaperNumber),
        (question.question_text.as_str(), RowProblem::MissingQuestionText),
        (question.mark_scheme.as_str(), RowProblem::MissingMarkScheme),
    ]
    .into_iter()
    .filter(|(value, _)| value.trim().is_empty())
    .map(|(_, problem)| problem)
    .collect()
}

/// Format a row's problems as `Line N: msg, msg`.
fn describe(line_number: usize, problems: &[RowProblem]) -> String {
    let joined = problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("Line {line_number}: {joined}")
}

/// Parse and validate a CSV document.
///
/// # Errors
///
/// [`ImportError::Empty`] for blank input, [`ImportError::NoValidRows`]
/// when no row passes validation (carrying the per-line problems).
pub fn import_csv(text: &str) -> Result<ImportReport, ImportError> {
    if text.trim().is_empty() {
        return Err(ImportError::Empty);
    }

    let rows = parse_csv(text);
    debug!(rows = rows.len(), "parsed import CSV");

    let mut report = ImportReport::default();
    for row in &rows {
        match validate_row(row) {
            Ok(question) => report.accepted.push(question),
            Err(problems) => report.errors.push(describe(row.line_number, &problems)),
        }
    }

    if report.accepted.is_empty() {
        return Err(ImportError::NoValidRows {
            errors: report.errors,
        });
    }

    info!(
        accepted = report.accepted.len(),
        rejected = report.errors.len(),
        "validated import rows"
    );
    Ok(report)
}
