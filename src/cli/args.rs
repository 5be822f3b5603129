//! CLI argument definitions for `AquaReport`

use clap::{builder::BoolishValueParser, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use aqua_report::config::ConfigOverrides;
use aqua_report::logger::Level;

/// CLI log level argument
///
/// Represents log levels that can be passed via CLI arguments. Converts to lowercase
/// strings for config storage and to `logger::Level` for runtime use.
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevelArg {
    /// Error-level logging
    Error,
    /// Warning-level logging
    Warn,
    /// Info-level logging
    Info,
    /// Debug-level logging
    Debug,
}

impl From<LogLevelArg> for Level {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => Self::Error,
            LogLevelArg::Warn => Self::Warn,
            LogLevelArg::Info => Self::Info,
            LogLevelArg::Debug => Self::Debug,
        }
    }
}

impl std::fmt::Display for LogLevelArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let as_str = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        };
        write!(f, "{as_str}")
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Display configuration values.
    ///
    /// If a KEY is provided, displays only that configuration value.
    /// If no KEY is provided, displays all configuration values.
    Get {
        /// Optional configuration key to display (e.g., `level`, `data_file`, `author`)
        #[arg(value_name = "KEY")]
        key: Option<String>,
    },
    /// Set a configuration value.
    Set {
        /// Configuration key to set
        #[arg(value_name = "KEY")]
        key: String,
        /// Value to set
        #[arg(value_name = "VALUE")]
        value: String,
    },
    /// Unset a configuration value.
    Unset {
        /// Configuration key to unset
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Reset configuration to defaults (requires confirmation).
    Reset,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    ///
    /// If no subcommand is provided, displays all configuration values.
    Config {
        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },
    /// Store one sensor reading.
    ///
    /// Reads a JSON object with `temp`, `tds`, `ec`, `resistividad`,
    /// `salinidad`, `pureza` and `ph`, stamps it with the current time and
    /// appends it to the data file.
    Ingest {
        /// JSON payload (read from stdin when omitted)
        #[arg(value_name = "JSON")]
        json: Option<String>,
    },
    /// Show the most recent readings, oldest first.
    Feed {
        /// Number of readings (defaults to config `feed_limit`)
        #[arg(short = 'n', long, value_name = "N")]
        limit: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Generate a PDF water-quality report for a time range.
    ///
    /// Dates are `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`; a bare end date covers
    /// the whole day.
    Report {
        /// Range start
        #[arg(long, value_name = "DATETIME")]
        from: Option<String>,

        /// Range end (inclusive)
        #[arg(long, value_name = "DATETIME")]
        to: Option<String>,

        /// Name printed as the report author (defaults to config `author`)
        #[arg(short, long, value_name = "NAME")]
        author: Option<String>,

        /// Output file path (defaults to a timestamped file in config `reports_dir`)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Stamp `Page N of M` at the bottom of every page
        #[arg(long)]
        page_numbers: bool,

        /// Lay out the report and print the page count without writing a file
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "aquareport",
    about = "AquaReport water-quality command-line interface",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Set the runtime log level (error|warn|info|debug). Falls back to config if omitted.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Enable verbose output (runtime only)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Enable debug-level logging and runtime debug flag (shorthand)
    #[arg(long = "debug")]
    pub debug_flag: bool,

    /// Write runtime logs to a file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    // --- Config overrides ---
    /// Override config logging level (stored in config file)
    #[arg(long = "config-level", value_enum)]
    pub config_level: Option<LogLevelArg>,

    /// Override config log file path
    #[arg(long = "config-log-file", value_name = "PATH")]
    pub config_log_file: Option<PathBuf>,

    /// Override config verbose flag (true/false)
    #[arg(long = "config-verbose", value_parser = BoolishValueParser::new())]
    pub config_verbose: Option<bool>,

    /// Override config measurement data file
    #[arg(long = "config-data-file", value_name = "PATH")]
    pub config_data_file: Option<PathBuf>,

    /// Override config measurement data file (short form)
    #[arg(long = "data-file", value_name = "PATH")]
    pub data_file: Option<PathBuf>,

    /// Override config reports directory
    #[arg(long = "config-reports-dir", value_name = "DIR")]
    pub config_reports_dir: Option<PathBuf>,

    /// Override config reports directory (short form)
    #[arg(long = "reports-dir", value_name = "DIR")]
    pub reports_dir: Option<PathBuf>,

    /// Override config default report author
    #[arg(long = "config-author", value_name = "NAME")]
    pub config_author: Option<String>,

    /// Override config page footer toggle (true/false)
    #[arg(long = "config-page-numbers", value_parser = BoolishValueParser::new())]
    pub config_page_numbers: Option<bool>,

    /// Subcommand to execute.
    /// A subcommand is required to run the CLI.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Convert CLI flags into config overrides
    ///
    /// Short-form flags (e.g., `--data-file`) take precedence over long-form
    /// flags (e.g., `--config-data-file`) when both are provided.
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        let path = |p: &PathBuf| p.to_string_lossy().to_string();
        ConfigOverrides {
            level: self.config_level.map(|lvl| lvl.to_string().to_lowercase()),
            file: self.config_log_file.as_ref().map(path),
            verbose: self.config_verbose,
            data_file: self
                .data_file
                .as_ref()
                .or(self.config_data_file.as_ref())
                .map(path),
            reports_dir: self
                .reports_dir
                .as_ref()
                .or(self.config_reports_dir.as_ref())
                .map(path),
            author: self.config_author.clone(),
            page_numbers: self.config_page_numbers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(command: Command) -> Cli {
        Cli {
            log_level: None,
            verbose: false,
            debug_flag: false,
            log_file: None,
            config_level: None,
            config_log_file: None,
            config_verbose: None,
            config_data_file: None,
            data_file: None,
            config_reports_dir: None,
            reports_dir: None,
            config_author: None,
            config_page_numbers: None,
            command,
        }
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevelArg::Error.to_string(), "error");
        assert_eq!(LogLevelArg::Warn.to_string(), "warn");
        assert_eq!(LogLevelArg::Info.to_string(), "info");
        assert_eq!(LogLevelArg::Debug.to_string(), "debug");
    }

    #[test]
    fn test_log_level_to_logger_level() {
        assert_eq!(Level::from(LogLevelArg::Error), Level::Error);
        assert_eq!(Level::from(LogLevelArg::Warn), Level::Warn);
        assert_eq!(Level::from(LogLevelArg::Info), Level::Info);
        assert_eq!(Level::from(LogLevelArg::Debug), Level::Debug);
    }

    #[test]
    fn test_to_config_overrides_empty() {
        let overrides = bare(Command::Config { subcommand: None }).to_config_overrides();
        assert!(overrides.level.is_none());
        assert!(overrides.file.is_none());
        assert!(overrides.verbose.is_none());
        assert!(overrides.data_file.is_none());
        assert!(overrides.reports_dir.is_none());
        assert!(overrides.author.is_none());
        assert!(overrides.page_numbers.is_none());
    }

    #[test]
    fn test_to_config_overrides_with_values() {
        let mut cli = bare(Command::Config { subcommand: None });
        cli.config_level = Some(LogLevelArg::Debug);
        cli.config_log_file = Some(PathBuf::from("/tmp/test.log"));
        cli.config_verbose = Some(true);
        cli.data_file = Some(PathBuf::from("/data/readings.csv"));
        cli.reports_dir = Some(PathBuf::from("/output"));
        cli.config_author = Some("Plant operator".to_string());
        cli.config_page_numbers = Some(true);

        let overrides = cli.to_config_overrides();
        assert_eq!(overrides.level, Some("debug".to_string()));
        assert_eq!(overrides.file, Some("/tmp/test.log".to_string()));
        assert_eq!(overrides.verbose, Some(true));
        assert_eq!(overrides.data_file, Some("/data/readings.csv".to_string()));
        assert_eq!(overrides.reports_dir, Some("/output".to_string()));
        assert_eq!(overrides.author, Some("Plant operator".to_string()));
        assert_eq!(overrides.page_numbers, Some(true));
    }

    #[test]
    fn test_short_form_precedence_over_long_form() {
        let mut cli = bare(Command::Config { subcommand: None });
        cli.config_data_file = Some(PathBuf::from("/long/data.csv"));
        cli.data_file = Some(PathBuf::from("/short/data.csv"));
        cli.config_reports_dir = Some(PathBuf::from("/long/out"));
        cli.reports_dir = Some(PathBuf::from("/short/out"));

        let overrides = cli.to_config_overrides();
        assert_eq!(overrides.data_file, Some("/short/data.csv".to_string()));
        assert_eq!(overrides.reports_dir, Some("/short/out".to_string()));
    }

    #[test]
    fn test_long_form_when_short_form_absent() {
        let mut cli = bare(Command::Config { subcommand: None });
        cli.config_data_file = Some(PathBuf::from("/long/data.csv"));
        cli.config_reports_dir = Some(PathBuf::from("/long/out"));

        let overrides = cli.to_config_overrides();
        assert_eq!(overrides.data_file, Some("/long/data.csv".to_string()));
        assert_eq!(overrides.reports_dir, Some("/long/out".to_string()));
    }

    #[test]
    fn test_report_command_parses() {
        let cli = Cli::try_parse_from([
            "aquareport",
            "report",
            "--from",
            "2025-05-01",
            "--to",
            "2025-05-31 18:00:00",
            "--author",
            "Lab",
            "--page-numbers",
        ])
        .unwrap();

        match cli.command {
            Command::Report {
                from,
                to,
                author,
                output,
                page_numbers,
                dry_run,
            } => {
                assert_eq!(from.as_deref(), Some("2025-05-01"));
                assert_eq!(to.as_deref(), Some("2025-05-31 18:00:00"));
                assert_eq!(author.as_deref(), Some("Lab"));
                assert!(output.is_none());
                assert!(page_numbers);
                assert!(!dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
