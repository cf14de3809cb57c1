#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use cmd::Workspace;
use output::{CliError, OutputMode, is_reported, render_error, report, resolve_output_mode};
use pastpaper_core::config::resolve_config;
use pastpaper_core::error::ErrorCode;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "ppa: find Cambridge past-paper questions similar to the one in front of you",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (defaults to pretty on a terminal, text when piped).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Question corpus to use instead of the configured one.
    #[arg(long, global = true, value_name = "PATH")]
    corpus: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(next_help_heading = "Search")]
    Search(cmd::search::SearchArgs),

    #[command(next_help_heading = "Search")]
    Quota(cmd::quota::QuotaArgs),

    #[command(next_help_heading = "Corpus")]
    Import(cmd::import::ImportArgs),

    #[command(next_help_heading = "Corpus")]
    Template(cmd::template::TemplateArgs),

    #[command(next_help_heading = "Corpus")]
    Browse(cmd::browse::BrowseArgs),

    #[command(next_help_heading = "Corpus")]
    Subjects(cmd::subjects::SubjectsArgs),

    #[command(next_help_heading = "Search")]
    History(cmd::history::HistoryArgs),

    #[command(next_help_heading = "Library")]
    Bookmark(cmd::bookmark::BookmarkArgs),

    #[command(next_help_heading = "Corpus")]
    Question(cmd::question::QuestionArgs),

    #[command(next_help_heading = "Reporting")]
    Stats(cmd::stats::StatsArgs),

    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    ppa completions bash > ~/.local/share/bash-completion/completions/ppa"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("PASTPAPER_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "pastpaper=debug,ppa=debug,info"
        } else {
            "pastpaper=info,ppa=info,warn"
        })
    });

    let format = env::var("PASTPAPER_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Output mode for errors raised before the configuration is known.
fn fallback_mode(cli: &Cli) -> OutputMode {
    cli.format
        .unwrap_or(if cli.json { OutputMode::Json } else { OutputMode::Text })
}

fn run(cli: &Cli, output: &mut OutputMode) -> anyhow::Result<()> {
    let project_root = env::current_dir()?;

    let config = resolve_config(&project_root, cli.json).map_err(|err| {
        report(
            *output,
            &CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}")),
        )
    })?;
    *output = resolve_output_mode(cli.format, &config.resolved_output);
    let output = *output;
    debug!(?output, "resolved output mode");

    let ws = Workspace::new(&project_root, config.project, cli.corpus.as_deref());

    match &cli.command {
        Commands::Search(args) => cmd::search::run_search(args, output, &ws),
        Commands::Quota(args) => cmd::quota::run_quota(args, output, &ws),
        Commands::Import(args) => cmd::import::run_import(args, output, &ws),
        Commands::Template(args) => cmd::template::run_template(args, output),
        Commands::Browse(args) => cmd::browse::run_browse(args, output, &ws),
        Commands::Subjects(args) => cmd::subjects::run_subjects(args, output, &ws),
        Commands::History(args) => cmd::history::run_history(args, output, &ws),
        Commands::Bookmark(args) => cmd::bookmark::run_bookmark(args, output, &ws),
        Commands::Question(args) => cmd::question::run_question(args, output, &ws),
        Commands::Stats(args) => cmd::stats::run_stats(args, output, &ws),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let mut output = fallback_mode(&cli);
    let Err(err) = run(&cli, &mut output) else {
        return ExitCode::SUCCESS;
    };

    // Command errors are rendered where they happen; anything else still
    // gets one structured error on stderr.
    if !is_reported(&err) {
        debug!(error = ?err, "unclassified failure");
        let error = CliError::from_code(ErrorCode::InternalUnexpected, format!("{err:#}"));
        if render_error(output, &error).is_err() {
            eprintln!("error: {err:#}");
        }
    }
    ExitCode::FAILURE
}
