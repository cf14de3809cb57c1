//! `ppa template`: print or save the CSV import template.

use crate::output::{OutputMode, render_mode};
use anyhow::Context as _;
use clap::Args;
use pastpaper_core::import::{CSV_HEADER, TEMPLATE_CSV};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
#[command(
    about = "Print the CSV import template",
    long_about = "Print a CSV template with the expected header and two worked example rows.",
    after_help = "EXAMPLES:\n    # Print to the terminal\n    ppa template\n\n\
                  # Save it next to your data\n    ppa template --output questions.csv"
)]
pub struct TemplateArgs {
    /// Write the template to this file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct TemplateOutput {
    columns: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    written_to: Option<String>,
    template: &'static str,
}

/// Execute `ppa template`.
pub fn run_template(args: &TemplateArgs, output: OutputMode) -> anyhow::Result<()> {
    if let Some(path) = &args.output {
        std::fs::write(path, TEMPLATE_CSV)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "wrote import template");
    }

    let payload = TemplateOutput {
        columns: CSV_HEADER.split(',').collect(),
        written_to: args.output.as_ref().map(|p| p.display().to_string()),
        template: TEMPLATE_CSV,
    };

    render_mode(output, &payload, render_template, render_template)
}

fn render_template(p: &TemplateOutput, w: &mut dyn Write) -> std::io::Result<()> {
    match &p.written_to {
        Some(path) => writeln!(w, "Template written to {path}"),
        None => write!(w, "{}", p.template),
    }
}
