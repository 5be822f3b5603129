//! Config command handler

use crate::args::ConfigSubcommand;
use aqua_report::config::Config;
use aqua_report::core::store::MeasurementStore;
use aqua_report::logger::Level;
use aqua_report::{debug, error};
use std::io::{self, BufRead, Write};

use super::{EXIT_FAILURE, EXIT_OK, EXIT_VALIDATION};

/// Dispatch config subcommands. Returns the exit code.
pub fn run(subcommand: Option<ConfigSubcommand>, config: &mut Config, defaults: &Config) -> i32 {
    match subcommand {
        None => {
            show(config);
            EXIT_OK
        }
        Some(ConfigSubcommand::Get { key: None }) => {
            show(config);
            EXIT_OK
        }
        Some(ConfigSubcommand::Get { key: Some(key) }) => get(config, &key),
        Some(ConfigSubcommand::Set { key, value }) => set(config, &key, &value),
        Some(ConfigSubcommand::Unset { key }) => unset(config, defaults, &key),
        Some(ConfigSubcommand::Reset) => reset(),
    }
}

/// Print every value, then where readings and reports actually live
fn show(config: &Config) {
    println!("\n=== Configuration ===\n");
    print!("{config}");
    println!("\n=== Effective paths ===\n");
    println!("config file = {}", Config::get_config_file_path().display());
    println!("data file   = {}", describe_data_file(config));
    println!("reports dir = {}", config.paths.reports_dir);
}

/// Data file path with its reading count, or why it cannot be read
fn describe_data_file(config: &Config) -> String {
    let store = MeasurementStore::new(&config.storage.data_file);
    let path = store.path().display();
    if !store.path().exists() {
        return format!("{path} (not created yet)");
    }
    match store.load_all() {
        Ok(records) => format!("{path} ({} reading(s))", records.len()),
        Err(e) => format!("{path} (unreadable: {e})"),
    }
}

fn get(config: &Config, key: &str) -> i32 {
    match config.get(key) {
        Some(value) => {
            println!("{value}");
            EXIT_OK
        }
        None => {
            eprintln!("✗ Unknown config key: '{key}'");
            EXIT_VALIDATION
        }
    }
}

/// Reject values that `Config::set` would store but nothing could use
fn check_value(key: &str, value: &str) -> Result<(), String> {
    match key {
        "level" => value.parse::<Level>().map(|_| ()),
        "data_file" | "data-file" | "reports_dir" | "reports-dir" if value.trim().is_empty() => {
            Err(format!("'{key}' cannot be empty"))
        }
        _ => Ok(()),
    }
}

fn set(config: &mut Config, key: &str, value: &str) -> i32 {
    let previous = config.get(key).unwrap_or_default();
    if let Err(e) = check_value(key, value).and_then(|()| config.set(key, value)) {
        eprintln!("✗ {e}");
        return EXIT_VALIDATION;
    }
    if let Err(e) = config.save() {
        error!("Failed to save config: {e}");
        eprintln!("✗ Failed to save config: {e}");
        return EXIT_FAILURE;
    }
    debug!("Config key '{key}' changed");
    println!("✓ {key}: '{previous}' → '{}'", config.get(key).unwrap_or_default());
    EXIT_OK
}

fn unset(config: &mut Config, defaults: &Config, key: &str) -> i32 {
    if let Err(e) = config.unset(key, defaults) {
        eprintln!("✗ {e}");
        return EXIT_VALIDATION;
    }
    if let Err(e) = config.save() {
        error!("Failed to save config: {e}");
        eprintln!("✗ Failed to save config: {e}");
        return EXIT_FAILURE;
    }
    println!("✓ {key} back to default '{}'", config.get(key).unwrap_or_default());
    EXIT_OK
}

/// Read one answer from `input`; only `y`/`yes` confirm
fn confirmed<R: BufRead>(mut input: R) -> bool {
    let mut response = String::new();
    if input.read_line(&mut response).is_err() {
        return false;
    }
    let response = response.trim();
    response.eq_ignore_ascii_case("y") || response.eq_ignore_ascii_case("yes")
}

fn reset() -> i32 {
    if !Config::get_config_file_path().exists() {
        println!("✓ Config is already at defaults");
        return EXIT_OK;
    }

    print!("Reset config to defaults? Readings and reports are kept. (y/n): ");
    io::stdout().flush().ok();

    if !confirmed(io::stdin().lock()) {
        println!("✗ Reset cancelled");
        return EXIT_OK;
    }
    if let Err(e) = Config::reset() {
        eprintln!("✗ Failed to remove config file: {e}");
        return EXIT_FAILURE;
    }
    println!("✓ Config reset to defaults");
    EXIT_OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_with_data_file(path: &std::path::Path) -> Config {
        let mut config = Config::from_defaults();
        config.storage.data_file = path.display().to_string();
        config
    }

    #[test]
    fn level_must_be_a_known_log_level() {
        assert!(check_value("level", "debug").is_ok());
        assert!(check_value("level", "WARNING").is_ok());
        assert!(check_value("level", "loud").is_err());
    }

    #[test]
    fn storage_paths_cannot_be_blank() {
        assert!(check_value("data_file", " ").is_err());
        assert!(check_value("reports-dir", "").is_err());
        assert!(check_value("data_file", "/srv/readings.csv").is_ok());
        assert!(check_value("author", "").is_ok());
    }

    #[test]
    fn data_file_description_counts_readings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("readings.csv");

        let missing = describe_data_file(&config_with_data_file(&path));
        assert!(missing.ends_with("(not created yet)"), "{missing}");

        fs::write(
            &path,
            "timestamp,temp,tds,ec,resistivity,salinity,purity,ph\n\
             2025-03-10 09:00:00,20,340,680,1470.58,0.34,96.6,7.2\n\
             2025-03-10 10:00:00,21,340,680,1470.58,0.34,96.6,7.2\n",
        )
        .unwrap();
        let counted = describe_data_file(&config_with_data_file(&path));
        assert!(counted.ends_with("(2 reading(s))"), "{counted}");
    }

    #[test]
    fn broken_data_file_is_reported_not_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("readings.csv");
        fs::write(&path, "timestamp,temp\n2025-03-10 09:00:00,20\n").unwrap();
        let described = describe_data_file(&config_with_data_file(&path));
        assert!(described.contains("unreadable"), "{described}");
    }

    #[test]
    fn only_yes_confirms_reset() {
        assert!(confirmed("y\n".as_bytes()));
        assert!(confirmed("YES\n".as_bytes()));
        assert!(!confirmed("n\n".as_bytes()));
        assert!(!confirmed("".as_bytes()));
    }

    #[test]
    fn unknown_key_is_a_validation_failure() {
        let config = Config::from_defaults();
        assert_eq!(get(&config, "nope"), EXIT_VALIDATION);
        assert_eq!(get(&config, "feed_limit"), EXIT_OK);
    }
}
