//! TaskPaper daily rollover.
//!
//! Parses TaskPaper outlines, applies the per-day scheduling rules, archives
//! completed items and replays missed days. The `daily-update` binary is a thin
//! layer over [`update::run_batch`].

pub mod archive;
pub mod catchup;
pub mod cli;
pub mod config;
pub mod dates;
pub mod error;
pub mod format;
pub mod logging;
pub mod outline;
pub mod rollover;
pub mod update;
