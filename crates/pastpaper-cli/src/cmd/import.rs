//! `ppa import`: bulk-load questions from a CSV file into the corpus.

use super::{Workspace, timestamp_now};
use crate::output::{CliError, OutputMode, pretty_kv, render_mode, report};
use anyhow::{Context as _, Result};
use clap::Args;
use pastpaper_core::corpus::{merge_new, save_corpus};
use pastpaper_core::error::ErrorCode;
use pastpaper_core::import::{ImportError, import_csv};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Args, Debug)]
#[command(
    about = "Import questions from a CSV file",
    long_about = "Parse and validate a CSV file of questions and append the valid rows to the \
                  corpus. Rows already in the corpus are skipped. Invalid rows are reported \
                  with their line number and do not block the valid ones.",
    after_help = "EXAMPLES:\n    # Start from the template\n    ppa template > questions.csv\n\n\
                  # Import a file\n    ppa import questions.csv\n\n\
                  # Validate without writing anything\n    ppa import questions.csv --dry-run\n\n\
                  # Read from stdin\n    cat questions.csv | ppa import -"
)]
pub struct ImportArgs {
    /// CSV file to import, or `-` for stdin.
    pub file: PathBuf,

    /// Validate and report without modifying the corpus.
    #[arg(long)]
    pub dry_run: bool,
}

/// Report payload for `ppa import`.
#[derive(Debug, Serialize)]
pub struct ImportOutput {
    pub source: String,
    pub dry_run: bool,
    pub valid_rows: usize,
    pub added: Vec<String>,
    pub duplicates: Vec<String>,
    pub errors: Vec<String>,
    pub corpus_size: usize,
}

/// Execute `ppa import <file>`.
///
/// # Errors
///
/// Returns an error if the input cannot be read, contains no valid rows, or
/// the corpus cannot be loaded or written.
pub fn run_import(args: &ImportArgs, output: OutputMode, ws: &Workspace) -> Result<()> {
    let text = read_source(args)?;

    let report = match import_csv(&text) {
        Ok(report) => report,
        Err(ImportError::Empty) => {
            return Err(report(
                output,
                &CliError::from_code(ErrorCode::ImportEmpty, ErrorCode::ImportEmpty.message()),
            ));
        }
        Err(ImportError::NoValidRows { errors }) => {
            return Err(report(
                output,
                &CliError::from_code(
                    ErrorCode::ImportNoValidRows,
                    ErrorCode::ImportNoValidRows.message(),
                )
                .with_details(errors),
            ));
        }
    };

    for problem in &report.errors {
        warn!(%problem, "skipping invalid row");
    }

    let mut corpus = ws.corpus_or_empty(output)?;
    let valid_rows = report.accepted.len();
    let merged = merge_new(&mut corpus, report.accepted, &timestamp_now());

    if !args.dry_run && !merged.added.is_empty() {
        save_corpus(&ws.corpus_path, &corpus)?;
    }
    info!(
        added = merged.added.len(),
        duplicates = merged.duplicates.len(),
        rejected = report.errors.len(),
        dry_run = args.dry_run,
        "import finished"
    );

    let payload = ImportOutput {
        source: args.file.display().to_string(),
        dry_run: args.dry_run,
        valid_rows,
        added: merged.added,
        duplicates: merged.duplicates,
        errors: report.errors,
        corpus_size: corpus.len(),
    };

    render_mode(
        output,
        &payload,
        |p, w| render_import_text(p, w),
        |p, w| render_import_human(p, w),
    )
}

fn read_source(args: &ImportArgs) -> Result<String> {
    if args.file.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read CSV from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))
}

fn render_import_human(p: &ImportOutput, w: &mut dyn Write) -> io::Result<()> {
    if p.dry_run {
        writeln!(w, "Dry run: corpus not modified")?;
    }
    pretty_kv(w, "Source", &p.source)?;
    pretty_kv(w, "Valid rows", p.valid_rows.to_string())?;
    pretty_kv(w, "Added", p.added.len().to_string())?;
    pretty_kv(w, "Duplicates", p.duplicates.len().to_string())?;
    pretty_kv(w, "Rejected", p.errors.len().to_string())?;
    pretty_kv(w, "Corpus size", p.corpus_size.to_string())?;

    if !p.errors.is_empty() {
        writeln!(w)?;
        writeln!(w, "Rejected rows:")?;
        for error in &p.errors {
            writeln!(w, "  {error}")?;
        }
    }
    Ok(())
}

fn render_import_text(p: &ImportOutput, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "added={} duplicates={} rejected={} corpus={}{}",
        p.added.len(),
        p.duplicates.len(),
        p.errors.len(),
        p.corpus_size,
        if p.dry_run { " dry-run" } else { "" }
    )?;
    for error in &p.errors {
        writeln!(w, "{error}")?;
    }
    Ok(())
}
