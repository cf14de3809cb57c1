//! Shared output layer for pretty/text/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: framed tables for humans, tab-separated rows for pipes, or
//! stable JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` flag
//! 2. hidden `--json` flag
//! 3. `FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 4. `output` in the user config file
//! 5. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.
//!
//! Steps 2-5 are resolved by `pastpaper_core::config::resolve_config`; this
//! module only layers the explicit flag on top.

use clap::ValueEnum;
use pastpaper_core::error::ErrorCode;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 90;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<16} {}", format!("{key}:"), value.as_ref())
}

/// Shorten `text` to at most `max` characters, marking the cut with `...`.
///
/// Newlines are flattened so multi-line question text stays on one row.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if flat.chars().count() <= max {
        return flat;
    }
    let keep = max.saturating_sub(3);
    let mut cut: String = flat.chars().take(keep).collect();
    cut.push_str("...");
    cut
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (tables, sections, visual framing).
    Pretty,
    /// Tab-separated plain text for scripts and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    /// Map a normalized mode name (`pretty`/`text`/`json`) to a mode.
    ///
    /// Unknown names fall back to [`OutputMode::Text`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            _ => Self::Text,
        }
    }
}

/// Layer the explicit `--format` flag over the configured mode name.
#[must_use]
pub fn resolve_output_mode(format_flag: Option<OutputMode>, configured: &str) -> OutputMode {
    format_flag.unwrap_or_else(|| OutputMode::from_name(configured))
}

/// Render a serializable value with explicit pretty/text renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_mode_to(&mut out, mode, value, text_fn, pretty_fn)
}

fn render_mode_to<T: Serialize>(
    out: &mut dyn Write,
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, out)?,
        OutputMode::Pretty => pretty_fn(value, out)?,
    }
    Ok(())
}

/// A structured error with optional suggestion, error code and detail lines.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (`E####`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Per-item problems, e.g. rejected CSV lines.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl CliError {
    /// Create a simple error with just a message.
    #[cfg(test)]
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
            details: Vec::new(),
        }
    }

    /// Create an error carrying the code and remediation hint of `code`.
    #[must_use]
    pub fn from_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
            details: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    render_error_to(&mut out, mode, error)
}

/// Marker for a failure whose structured error is already on stderr.
///
/// `main` exits non-zero on it without printing anything else, so stderr
/// stays a single JSON document in JSON mode.
#[derive(Debug)]
pub struct Reported {
    pub error_code: Option<String>,
}

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error_code {
            Some(ref code) => write!(f, "error[{code}] already reported"),
            None => f.write_str("error already reported"),
        }
    }
}

impl std::error::Error for Reported {}

/// Render `error` to stderr and return the [`Reported`] marker for `main`.
pub fn report(mode: OutputMode, error: &CliError) -> anyhow::Error {
    match render_error(mode, error) {
        Ok(()) => anyhow::Error::new(Reported {
            error_code: error.error_code.clone(),
        }),
        Err(render_failure) => render_failure,
    }
}

/// Whether `err` has already been rendered for the user.
#[must_use]
pub fn is_reported(err: &anyhow::Error) -> bool {
    err.is::<Reported>()
}

fn render_error_to(out: &mut dyn Write, mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut *out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            match error.error_code {
                Some(ref code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            for detail in &error.details {
                writeln!(out, "  {detail}")?;
            }
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        name: String,
        count: usize,
    }

    fn sample() -> Sample {
        Sample {
            name: "physics".to_string(),
            count: 2,
        }
    }

    fn rendered(mode: OutputMode) -> String {
        let mut buf = Vec::new();
        render_mode_to(
            &mut buf,
            mode,
            &sample(),
            |s, w| writeln!(w, "{}\t{}", s.name, s.count),
            |s, w| writeln!(w, "{} ({} questions)", s.name, s.count),
        )
        .expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    // ── OutputMode ──────────────────────────────────────────────────────────

    #[test]
    fn output_mode_from_name() {
        assert_eq!(OutputMode::from_name("json"), OutputMode::Json);
        assert_eq!(OutputMode::from_name("pretty"), OutputMode::Pretty);
        assert_eq!(OutputMode::from_name("text"), OutputMode::Text);
        assert_eq!(OutputMode::from_name("bogus"), OutputMode::Text);
    }

    #[test]
    fn format_flag_wins_over_configured_mode() {
        let mode = resolve_output_mode(Some(OutputMode::Pretty), "json");
        assert_eq!(mode, OutputMode::Pretty);
    }

    #[test]
    fn configured_mode_used_without_flag() {
        assert_eq!(resolve_output_mode(None, "json"), OutputMode::Json);
        assert_eq!(resolve_output_mode(None, "text"), OutputMode::Text);
    }

    // ── render_mode ─────────────────────────────────────────────────────────

    #[test]
    fn render_json_output() {
        let out = rendered(OutputMode::Json);
        let value: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(value["name"], "physics");
        assert_eq!(value["count"], 2);
    }

    #[test]
    fn render_text_and_pretty_use_their_closures() {
        assert_eq!(rendered(OutputMode::Text), "physics\t2\n");
        assert_eq!(rendered(OutputMode::Pretty), "physics (2 questions)\n");
    }

    // ── CliError ────────────────────────────────────────────────────────────

    #[test]
    fn cli_error_simple() {
        let err = CliError::new("something went wrong");
        assert_eq!(err.message, "something went wrong");
        assert!(err.suggestion.is_none());
        assert!(err.error_code.is_none());
    }

    #[test]
    fn cli_error_from_code_carries_hint() {
        let err = CliError::from_code(ErrorCode::QuotaExhausted, "limit reached");
        assert_eq!(err.error_code.as_deref(), Some("E4001"));
        assert!(err.suggestion.as_deref().is_some_and(|s| s.contains("premium")));
    }

    #[test]
    fn render_error_json_includes_details() {
        let err = CliError::from_code(ErrorCode::ImportNoValidRows, "No valid rows found")
            .with_details(vec!["Line 2: Subject is required".to_string()]);
        let mut buf = Vec::new();
        render_error_to(&mut buf, OutputMode::Json, &err).expect("render");
        let value: serde_json::Value = serde_json::from_slice(&buf).expect("json");
        assert_eq!(value["error"]["error_code"], "E3002");
        assert_eq!(value["error"]["details"][0], "Line 2: Subject is required");
    }

    #[test]
    fn render_error_human() {
        let err = CliError::from_code(ErrorCode::EmptyQuery, "search query must not be empty");
        let mut buf = Vec::new();
        render_error_to(&mut buf, OutputMode::Pretty, &err).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("error[E2001]: search query must not be empty"));
        assert!(text.contains("suggestion:"));
    }

    #[test]
    fn render_error_without_code_or_details() {
        let err = CliError::new("boom");
        let mut buf = Vec::new();
        render_error_to(&mut buf, OutputMode::Text, &err).expect("render");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "error: boom\n");
    }

    #[test]
    fn reported_marker_is_recognized() {
        let marker = anyhow::Error::new(Reported {
            error_code: Some("E2001".to_string()),
        });
        assert!(is_reported(&marker));
        assert_eq!(marker.to_string(), "error[E2001] already reported");
        assert!(!is_reported(&anyhow::anyhow!("plain failure")));
    }

    // ── truncate ────────────────────────────────────────────────────────────

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn truncate_flattens_and_marks_cut() {
        assert_eq!(truncate("line one\nline two", 11), "line one...");
        assert_eq!(truncate("äöüäöüäöü", 6), "äöü...");
    }
}
