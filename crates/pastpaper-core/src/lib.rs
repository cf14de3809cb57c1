#![forbid(unsafe_code)]
//! pastpaper-core library.
//!
//! Question records and everything around them that is not ranking: the
//! bulk CSV import path, question edits, bookmarks, free/premium search
//! quotas, search-history analytics, local corpus files and configuration.
//!
//! # Conventions
//!
//! - **Errors**: `anyhow::Result` for file and config I/O, `thiserror` enums
//!   for domain failures ([`import::ImportError`], [`quota::QuotaError`]).
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod analytics;
pub mod bookmarks;
pub mod config;
pub mod corpus;
pub mod error;
pub mod import;
pub mod model;
pub mod quota;

pub use model::question::{CAMBRIDGE_SUBJECTS, NewQuestion, Question, Session};
