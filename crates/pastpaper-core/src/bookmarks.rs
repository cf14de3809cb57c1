//! Saved questions.
//!
//! A bookmark pins a question id with the time it was saved. The store is a
//! small JSON file next to the usage profile; ids are unique within it.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub question_id: String,
    pub created_at: DateTime<Utc>,
}

/// Every bookmark of the local user, in the order they were saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmarks {
    #[serde(default)]
    pub entries: Vec<Bookmark>,
}

impl Bookmarks {
    #[must_use]
    pub fn contains(&self, question_id: &str) -> bool {
        self.entries.iter().any(|b| b.question_id == question_id)
    }

    /// Save `question_id`. Returns `false` if it was already saved.
    pub fn add(&mut self, question_id: &str, now: DateTime<Utc>) -> bool {
        if self.contains(question_id) {
            return false;
        }
        self.entries.push(Bookmark {
            question_id: question_id.to_string(),
            created_at: now,
        });
        debug!(question_id, "bookmark added");
        true
    }

    /// Drop `question_id`. Returns `false` if it was not saved.
    pub fn remove(&mut self, question_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|b| b.question_id != question_id);
        let removed = self.entries.len() != before;
        if removed {
            debug!(question_id, "bookmark removed");
        }
        removed
    }

    /// Flip the saved state of `question_id`; returns the new state.
    pub fn toggle(&mut self, question_id: &str, now: DateTime<Utc>) -> bool {
        if self.remove(question_id) {
            false
        } else {
            self.add(question_id, now)
        }
    }

    /// Bookmarks ordered newest first. Equal timestamps keep save order.
    #[must_use]
    pub fn newest_first(&self) -> Vec<&Bookmark> {
        let mut sorted: Vec<&Bookmark> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted
    }
}

/// Load bookmarks; a missing file is an empty store.
pub fn load_bookmarks(path: &Path) -> Result<Bookmarks> {
    if !path.exists() {
        return Ok(Bookmarks::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn save_bookmarks(path: &Path, bookmarks: &Bookmarks) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(bookmarks)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 2, 9, minute, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn add_is_idempotent() {
        let mut store = Bookmarks::default();
        assert!(store.add("q-1", at(0)));
        assert!(!store.add("q-1", at(5)));
        assert_eq!(store.entries.len(), 1);
        assert_eq!(store.entries[0].created_at, at(0));
    }

    #[test]
    fn remove_reports_whether_anything_changed() {
        let mut store = Bookmarks::default();
        store.add("q-1", at(0));
        assert!(store.remove("q-1"));
        assert!(!store.remove("q-1"));
        assert!(!store.contains("q-1"));
    }

    #[test]
    fn toggle_flips_state() {
        let mut store = Bookmarks::default();
        assert!(store.toggle("q-1", at(0)));
        assert!(store.contains("q-1"));
        assert!(!store.toggle("q-1", at(1)));
        assert!(!store.contains("q-1"));
    }

    #[test]
    fn newest_first_orders_by_save_time() {
        let mut store = Bookmarks::default();
        store.add("old", at(0));
        store.add("new", at(30));
        store.add("mid", at(10));
        let ids: Vec<&str> = store
            .newest_first()
            .iter()
            .map(|b| b.question_id.as_str())
            .collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn store_round_trips_and_rejects_garbage() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("state/bookmarks.json");
        assert_eq!(load_bookmarks(&path).expect("missing is empty"), Bookmarks::default());

        let mut store = Bookmarks::default();
        store.add("q-1", at(0));
        save_bookmarks(&path, &store).expect("save");
        assert_eq!(load_bookmarks(&path).expect("load"), store);

        std::fs::write(&path, "[1, 2").expect("write");
        let err = load_bookmarks(&path).expect_err("corrupt");
        assert!(format!("{err:#}").contains("bookmarks.json"));
    }
}
