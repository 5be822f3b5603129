//! Water-quality reporting library for `AquaReport`
//! Contains the measurement store, ingestion validation, dashboard feed and the
//! paginated PDF report engine used by the CLI.

pub mod config;
pub mod core;
pub mod logger;

pub use crate::core::get_version;
