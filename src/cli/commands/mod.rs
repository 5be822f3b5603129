//! CLI command handlers for `AquaReport`.
//!
//! This module provides handlers for various CLI subcommands.
//! Each command is implemented in its own submodule.

pub mod config;
pub mod feed;
pub mod ingest;
pub mod report;

use chrono::{Local, NaiveDateTime, Timelike};

/// Command succeeded
pub const EXIT_OK: i32 = 0;
/// Unexpected failure (I/O, storage)
pub const EXIT_FAILURE: i32 = 1;
/// The request was rejected
pub const EXIT_VALIDATION: i32 = 2;
/// The requested range holds no readings
pub const EXIT_NO_DATA: i32 = 3;

/// Local wall-clock time at whole-second precision
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}
