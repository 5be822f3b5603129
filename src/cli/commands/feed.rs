//! Feed command handler

use aqua_report::config::Config;
use aqua_report::core::feed::{feed_json, feed_table};
use aqua_report::core::store::MeasurementStore;
use aqua_report::{debug, error};

use super::{EXIT_FAILURE, EXIT_OK};

/// Print the latest readings as a table or JSON. Returns the exit code.
pub fn run(limit: Option<usize>, json: bool, config: &Config) -> i32 {
    let limit = limit.unwrap_or(config.report.feed_limit);
    let store = MeasurementStore::new(&config.storage.data_file);

    let records = match store.latest(limit) {
        Ok(records) => records,
        Err(e) => {
            error!("Failed to read measurements: {e}");
            eprintln!("✗ Failed to read {}: {e}", store.path().display());
            return EXIT_FAILURE;
        }
    };
    debug!("Feed returning {} of at most {limit} reading(s)", records.len());

    if json {
        match feed_json(&records) {
            Ok(body) => println!("{body}"),
            Err(e) => {
                eprintln!("✗ Failed to serialize feed: {e}");
                return EXIT_FAILURE;
            }
        }
    } else if records.is_empty() {
        println!("No readings yet");
    } else {
        print!("{}", feed_table(&records));
    }
    EXIT_OK
}
