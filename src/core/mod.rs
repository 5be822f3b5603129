//! Core module: measurement model, storage and report generation

pub mod feed;
pub mod ingest;
pub mod models;
pub mod range;
pub mod report;
pub mod stats;
pub mod store;

/// Returns the current version of the `AquaReport` crate
#[must_use]
pub const fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
