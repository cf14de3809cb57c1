use std::fmt;

/// Machine-readable error codes surfaced by the CLI in JSON mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    CorpusMissing,
    CorpusParseError,
    EmptyQuery,
    UnknownSubject,
    ImportEmpty,
    ImportNoValidRows,
    QuestionExists,
    QuestionNotFound,
    InvalidQuestion,
    QuotaExhausted,
    UsageParseError,
    BookmarksParseError,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::CorpusMissing => "E1002",
            Self::CorpusParseError => "E1003",
            Self::EmptyQuery => "E2001",
            Self::UnknownSubject => "E2002",
            Self::ImportEmpty => "E3001",
            Self::ImportNoValidRows => "E3002",
            Self::QuestionExists => "E3003",
            Self::QuestionNotFound => "E3004",
            Self::InvalidQuestion => "E3005",
            Self::QuotaExhausted => "E4001",
            Self::UsageParseError => "E4002",
            Self::BookmarksParseError => "E4003",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::CorpusMissing => "Question corpus not found",
            Self::CorpusParseError => "Question corpus is not valid JSON",
            Self::EmptyQuery => "Search query is empty",
            Self::UnknownSubject => "Unknown subject",
            Self::ImportEmpty => "No CSV data to import",
            Self::ImportNoValidRows => "No valid rows found",
            Self::QuestionExists => "Question already in the corpus",
            Self::QuestionNotFound => "Question not found",
            Self::InvalidQuestion => "Question is missing required fields",
            Self::QuotaExhausted => "Daily search limit reached",
            Self::UsageParseError => "Usage profile is not valid JSON",
            Self::BookmarksParseError => "Bookmarks file is not valid JSON",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to users and scripts.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .pastpaper/config.toml and retry."),
            Self::CorpusMissing => Some("Run `ppa import <file.csv>` to create the corpus."),
            Self::CorpusParseError => {
                Some("Restore .pastpaper/questions.json or re-import from CSV.")
            }
            Self::EmptyQuery => Some("Paste the question text you want to match."),
            Self::UnknownSubject => Some("Run `ppa subjects` to list valid subjects."),
            Self::ImportEmpty => Some("Run `ppa template` for the expected CSV layout."),
            Self::ImportNoValidRows => Some("Please check your data against `ppa template`."),
            Self::QuestionExists => Some("Use `ppa question edit <ID>` to change it."),
            Self::QuestionNotFound => Some("Run `ppa browse` to list question ids."),
            Self::InvalidQuestion => {
                Some("Subject, paper number, question text and mark scheme are required.")
            }
            Self::QuotaExhausted => {
                Some("Wait until tomorrow or switch plans with `ppa quota --plan premium`.")
            }
            Self::UsageParseError => Some("Delete .pastpaper/usage.json to reset usage."),
            Self::BookmarksParseError => {
                Some("Delete .pastpaper/bookmarks.json to clear bookmarks.")
            }
            Self::InternalUnexpected => Some("Rerun with --verbose for details."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
