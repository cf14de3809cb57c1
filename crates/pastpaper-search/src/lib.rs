#![forbid(unsafe_code)]
//! pastpaper-search library.
//!
//! Lexical relevance ranking of past-paper questions against pasted exam
//! text, plus the admin catalogue filter.
//!
//! # Conventions
//!
//! - **Errors**: ranking never fails; "nothing to show" is an empty `Vec`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod catalog;
pub mod rank;
pub mod similarity;

pub use catalog::CatalogFilter;
pub use rank::{ALL_CATEGORIES, Candidate, MAX_RESULTS, Ranked, SCORE_THRESHOLD, rank};
pub use similarity::score;
