//! Event search driver
//!
//! Thin adapter that plays the batch-job driver and request layer for
//! `event_search`: import events, run backfills, answer queries.

pub mod error;
pub mod import;
pub mod service;

pub use error::CliError;
pub use service::SearchService;
