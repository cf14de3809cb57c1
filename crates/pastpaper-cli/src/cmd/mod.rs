pub mod bookmark;
pub mod browse;
pub mod completions;
pub mod history;
pub mod import;
pub mod question;
pub mod quota;
pub mod search;
pub mod stats;
pub mod subjects;
pub mod template;

use crate::output::{CliError, OutputMode, report};
use pastpaper_core::Question;
use pastpaper_core::config::{ProjectConfig, STATE_DIR};
use pastpaper_core::corpus::try_load_corpus;
use pastpaper_core::error::ErrorCode;
use pastpaper_core::quota::{UsageProfile, load_usage};
use std::path::{Path, PathBuf};

/// Resolved local state shared by every command.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub config: ProjectConfig,
    pub corpus_path: PathBuf,
}

impl Workspace {
    /// `corpus_override` (from `--corpus`) takes precedence over the
    /// configured corpus path. Relative paths resolve against `root`.
    pub fn new(root: &Path, config: ProjectConfig, corpus_override: Option<&Path>) -> Self {
        let corpus = corpus_override.unwrap_or(&config.corpus.path);
        let corpus_path = root.join(corpus);
        Self {
            root: root.to_path_buf(),
            config,
            corpus_path,
        }
    }

    pub fn usage_path(&self) -> PathBuf {
        self.root.join(STATE_DIR).join("usage.json")
    }

    pub fn history_path(&self) -> PathBuf {
        self.root.join(STATE_DIR).join("history.jsonl")
    }

    pub fn bookmarks_path(&self) -> PathBuf {
        self.root.join(STATE_DIR).join("bookmarks.json")
    }

    /// Load the corpus, rendering a structured error when it is missing or
    /// unreadable.
    pub fn require_corpus(&self, output: OutputMode) -> anyhow::Result<Vec<Question>> {
        match self.load_corpus(output)? {
            Some(questions) => Ok(questions),
            None => Err(report(
                output,
                &CliError::from_code(
                    ErrorCode::CorpusMissing,
                    format!("no question corpus at {}", self.corpus_path.display()),
                ),
            )),
        }
    }

    /// Load the corpus, treating a missing file as empty. A corrupt file is
    /// still reported.
    pub fn corpus_or_empty(&self, output: OutputMode) -> anyhow::Result<Vec<Question>> {
        Ok(self.load_corpus(output)?.unwrap_or_default())
    }

    /// Load the usage profile, rendering a structured error when it is corrupt.
    pub fn usage(&self, output: OutputMode) -> anyhow::Result<UsageProfile> {
        load_usage(&self.usage_path()).map_err(|err| {
            report(
                output,
                &CliError::from_code(ErrorCode::UsageParseError, format!("{err:#}")),
            )
        })
    }

    fn load_corpus(&self, output: OutputMode) -> anyhow::Result<Option<Vec<Question>>> {
        try_load_corpus(&self.corpus_path).map_err(|err| {
            report(
                output,
                &CliError::from_code(ErrorCode::CorpusParseError, format!("{err:#}")),
            )
        })
    }
}

/// Current UTC timestamp in the RFC 3339 form stored on records.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpus_path_defaults_to_config() {
        let ws = Workspace::new(Path::new("/work"), ProjectConfig::default(), None);
        assert_eq!(ws.corpus_path, PathBuf::from("/work/.pastpaper/questions.json"));
        assert_eq!(ws.usage_path(), PathBuf::from("/work/.pastpaper/usage.json"));
        assert_eq!(ws.history_path(), PathBuf::from("/work/.pastpaper/history.jsonl"));
        assert_eq!(ws.bookmarks_path(), PathBuf::from("/work/.pastpaper/bookmarks.json"));
    }

    #[test]
    fn corpus_override_wins() {
        let ws = Workspace::new(
            Path::new("/work"),
            ProjectConfig::default(),
            Some(Path::new("bank/maths.json")),
        );
        assert_eq!(ws.corpus_path, PathBuf::from("/work/bank/maths.json"));

        let ws = Workspace::new(
            Path::new("/work"),
            ProjectConfig::default(),
            Some(Path::new("/abs/q.json")),
        );
        assert_eq!(ws.corpus_path, PathBuf::from("/abs/q.json"));
    }

    #[test]
    fn corrupt_corpus_is_reported_even_when_optional() {
        let dir = tempfile::tempdir().expect("temp dir");
        let ws = Workspace::new(dir.path(), ProjectConfig::default(), None);
        assert!(ws.corpus_or_empty(OutputMode::Text).expect("missing is empty").is_empty());

        std::fs::create_dir_all(dir.path().join(STATE_DIR)).expect("state dir");
        std::fs::write(&ws.corpus_path, "not json").expect("write");
        let err = ws.corpus_or_empty(OutputMode::Text).expect_err("corrupt corpus");
        assert!(crate::output::is_reported(&err));
    }

    #[test]
    fn timestamp_is_rfc3339_utc() {
        let ts = timestamp_now();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
