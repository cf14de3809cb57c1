//! Free/premium search allowance.
//!
//! Free accounts get a small number of searches per calendar day; premium
//! accounts are unlimited. The counter is lazily reset: a profile whose
//! `last_search_date` is not today is treated as having a fresh allowance.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Searches per day for free accounts unless configured otherwise.
pub const DEFAULT_FREE_DAILY_SEARCHES: u32 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Premium,
}

impl Plan {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QuotaError {
    #[error("daily search limit of {limit} reached for the free plan")]
    Exhausted { limit: u32 },
}

/// Per-user search usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageProfile {
    #[serde(default)]
    pub plan: Plan,
    #[serde(default)]
    pub searches_today: u32,
    #[serde(default)]
    pub last_search_date: Option<NaiveDate>,
}

impl UsageProfile {
    fn is_new_day(&self, today: NaiveDate) -> bool {
        self.last_search_date != Some(today)
    }

    /// Searches already used today.
    #[must_use]
    pub fn used_on(&self, today: NaiveDate) -> u32 {
        if self.is_new_day(today) {
            0
        } else {
            self.searches_today
        }
    }

    #[must_use]
    pub fn can_search(&self, today: NaiveDate, free_limit: u32) -> bool {
        match self.plan {
            Plan::Premium => true,
            Plan::Free => self.is_new_day(today) || self.searches_today < free_limit,
        }
    }

    /// Remaining searches today; `None` means unlimited.
    #[must_use]
    pub fn remaining(&self, today: NaiveDate, free_limit: u32) -> Option<u32> {
        match self.plan {
            Plan::Premium => None,
            Plan::Free => Some(free_limit.saturating_sub(self.used_on(today))),
        }
    }

    /// # Errors
    ///
    /// [`QuotaError::Exhausted`] when a free profile has no searches left.
    pub fn ensure_can_search(&self, today: NaiveDate, free_limit: u32) -> Result<(), QuotaError> {
        if self.can_search(today, free_limit) {
            Ok(())
        } else {
            Err(QuotaError::Exhausted { limit: free_limit })
        }
    }

    /// Count one search made on `today`.
    pub fn record_search(&mut self, today: NaiveDate) {
        self.searches_today = if self.is_new_day(today) {
            1
        } else {
            self.searches_today.saturating_add(1)
        };
        self.last_search_date = Some(today);
        debug!(searches_today = self.searches_today, %today, "recorded search");
    }

    pub fn set_plan(&mut self, plan: Plan) {
        if self.plan != plan {
            info!(from = %self.plan, to = %plan, "plan changed");
        }
        self.plan = plan;
    }
}

/// Load a usage profile; a missing file is a fresh free profile.
pub fn load_usage(path: &Path) -> Result<UsageProfile> {
    if !path.exists() {
        return Ok(UsageProfile::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn save_usage(path: &Path, profile: &UsageProfile) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(profile)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
