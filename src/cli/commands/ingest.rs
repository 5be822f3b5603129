//! Ingest command handler

use aqua_report::config::Config;
use aqua_report::core::ingest::ReadingPayload;
use aqua_report::core::store::MeasurementStore;
use aqua_report::{error, info};
use std::io;

use super::{now, EXIT_FAILURE, EXIT_OK, EXIT_VALIDATION};

/// Validate one JSON reading and append it to the data file.
///
/// Reads the payload from stdin when `json` is `None`. Returns the process
/// exit code.
pub fn run(json: Option<&str>, config: &Config) -> i32 {
    let body = match json {
        Some(body) => body.to_string(),
        None => match io::read_to_string(io::stdin()) {
            Ok(body) => body,
            Err(e) => {
                eprintln!("✗ Failed to read payload from stdin: {e}");
                return EXIT_FAILURE;
            }
        },
    };

    let record = match ReadingPayload::from_json(&body).and_then(|p| p.into_record(now())) {
        Ok(record) => record,
        Err(e) => {
            error!("Rejected reading: {e}");
            eprintln!("✗ {e}");
            return EXIT_VALIDATION;
        }
    };

    let store = MeasurementStore::new(&config.storage.data_file);
    if let Err(e) = store.append(&record) {
        error!("Failed to store reading: {e}");
        eprintln!("✗ Failed to store reading in {}: {e}", store.path().display());
        return EXIT_FAILURE;
    }

    info!("Stored reading at {}", record.timestamp_string());
    println!("✓ Reading stored at {}", record.timestamp_string());
    EXIT_OK
}
