use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Subjects offered in the catalogue, in display order.
pub const CAMBRIDGE_SUBJECTS: [&str; 12] = [
    "Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "Economics",
    "Business Studies",
    "Computer Science",
    "English Literature",
    "History",
    "Geography",
    "Psychology",
    "Sociology",
];

/// The two Cambridge examination series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Session {
    #[serde(rename = "May/June")]
    MayJune,
    #[serde(rename = "Oct/Nov")]
    OctNov,
}

impl Session {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MayJune => "May/June",
            Self::OctNov => "Oct/Nov",
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`Session`] from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSessionError {
    pub got: String,
}

impl fmt::Display for ParseSessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid session: '{}' (expected \"May/June\" or \"Oct/Nov\")",
            self.got
        )
    }
}

impl std::error::Error for ParseSessionError {}

impl FromStr for Session {
    type Err = ParseSessionError;

    /// Session labels are matched exactly; the import path rejects
    /// `may/june` and friends the same way the admin form does.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "May/June" => Ok(Self::MayJune),
            "Oct/Nov" => Ok(Self::OctNov),
            other => Err(ParseSessionError {
                got: other.to_string(),
            }),
        }
    }
}

/// One past-paper question with its mark scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub subject: String,
    pub year: i32,
    pub session: Session,
    pub paper_number: String,
    pub question_text: String,
    pub mark_scheme: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// A validated question that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub subject: String,
    pub year: i32,
    pub session: Session,
    pub paper_number: String,
    pub question_text: String,
    pub mark_scheme: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl NewQuestion {
    /// Content-derived id: `q-` followed by 12 hex chars of SHA-256 over the
    /// identifying fields. Re-importing the same row yields the same id.
    #[must_use]
    pub fn content_id(&self) -> String {
        let mut hasher = Sha256::new();
        for part in [
            self.subject.as_str(),
            &self.year.to_string(),
            self.session.as_str(),
            self.paper_number.as_str(),
            self.question_text.as_str(),
        ] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        let hex = format!("{:x}", hasher.finalize());
        format!("q-{}", &hex[..12])
    }

    /// Promote to a stored [`Question`] stamped with `created_at`.
    #[must_use]
    pub fn into_question(self, created_at: impl Into<String>) -> Question {
        let id = self.content_id();
        Question {
            id,
            subject: self.subject,
            year: self.year,
            session: self.session,
            paper_number: self.paper_number,
            question_text: self.question_text,
            mark_scheme: self.mark_scheme,
            keywords: self.keywords,
            created_at: Some(created_at.into()),
        }
    }
}

impl From<&Question> for NewQuestion {
    fn from(question: &Question) -> Self {
        Self {
            subject: question.subject.clone(),
            year: question.year,
            session: question.session,
            paper_number: question.paper_number.clone(),
            question_text: question.question_text.clone(),
            mark_scheme: question.mark_scheme.clone(),
            keywords: question.keywords.clone(),
        }
    }
}

/// Split a comma-separated keyword field into trimmed, non-empty tags.
#[must_use]
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewQuestion {
        NewQuestion {
            subject: "Mathematics".into(),
            year: 2023,
            session: Session::MayJune,
            paper_number: "1".into(),
            question_text: "Calculate the derivative of f(x) = 3x^2 + 2x - 1".into(),
            mark_scheme: "f'(x) = 6x + 2".into(),
            keywords: vec!["derivative".into(), "calculus".into()],
        }
    }

    #[test]
    fn session_parses_exact_labels() {
        assert_eq!("May/June".parse::<Session>(), Ok(Session::MayJune));
        assert_eq!("Oct/Nov".parse::<Session>(), Ok(Session::OctNov));
        assert!("may/june".parse::<Session>().is_err());
        assert!("".parse::<Session>().is_err());
    }

    #[test]
    fn session_serializes_as_label() {
        let json = serde_json::to_string(&Session::OctNov).expect("serialize");
        assert_eq!(json, "\"Oct/Nov\"");
    }

    #[test]
    fn question_uses_snake_case_wire_names() {
        let q = sample().into_question("2024-01-01T00:00:00Z");
        let value = serde_json::to_value(&q).expect("serialize");
        assert_eq!(value["paper_number"], "1");
        assert_eq!(value["question_text"], q.question_text.as_str());
        assert_eq!(value["session"], "May/June");
    }

    #[test]
    fn missing_keywords_default_to_empty() {
        let json = r#"{
            "id": "q-1",
            "subject": "Physics",
            "year": 2022,
            "session": "Oct/Nov",
            "paper_number": "2",
            "question_text": "A ball is thrown upward",
            "mark_scheme": "s = 20.4 m"
        }"#;
        let q: Question = serde_json::from_str(json).expect("parse");
        assert!(q.keywords.is_empty());
        assert!(q.created_at.is_none());
    }

    #[test]
    fn content_id_is_stable_and_prefixed() {
        let a = sample().content_id();
        let b = sample().content_id();
        assert_eq!(a, b);
        assert!(a.starts_with("q-"));
        assert_eq!(a.len(), 14);
    }

    #[test]
    fn content_id_is_digest_prefix() {
        let q = sample();
        let mut hasher = Sha256::new();
        for part in [
            q.subject.as_str(),
            "2023",
            "May/June",
            "1",
            q.question_text.as_str(),
        ] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        let hex = format!("{:x}", hasher.finalize());
        assert_eq!(q.content_id(), format!("q-{}", &hex[..12]));
    }

    #[test]
    fn new_question_from_stored_keeps_fields() {
        let stored = sample().into_question("2024-01-01T00:00:00Z");
        assert_eq!(NewQuestion::from(&stored), sample());
    }

    #[test]
    fn content_id_changes_with_text() {
        let mut other = sample();
        other.question_text.push('!');
        assert_ne!(sample().content_id(), other.content_id());
    }

    #[test]
    fn split_keywords_trims_and_drops_empties() {
        assert_eq!(
            split_keywords(" derivative, calculus ,, power rule "),
            vec!["derivative", "calculus", "power rule"]
        );
        assert!(split_keywords("").is_empty());
    }
}
