//! Command-line interface entry point for `AquaReport`

mod args;
mod commands;

use aqua_report::config::Config;
use aqua_report::info;
use aqua_report::logger::{enable_debug, enable_verbose, init_file_logging, set_level, Level};
use args::{Cli, Command};
use clap::Parser;
use commands::report::ReportOptions;

fn main() {
    let args = Cli::parse();

    // Load configuration once at startup and apply CLI overrides to it
    let mut config = Config::load();
    let defaults = Config::from_defaults();
    config.apply_overrides(&args.to_config_overrides());

    // CLI flag overrides config; otherwise config logging.level; fallback warn
    let effective_level = args
        .log_level
        .map(std::convert::Into::into)
        .or_else(|| config.logging.level.parse::<Level>().ok())
        .unwrap_or(Level::Warn);

    let mut level = effective_level;
    if args.debug_flag || level == Level::Debug {
        level = Level::Debug;
        enable_debug();
    }

    // Verbose: enable if CLI flag OR config has verbose=true
    let verbose = args.verbose || config.logging.verbose;
    if verbose {
        enable_verbose();
    }
    set_level(level);

    // Initialize file logging: CLI flag wins, otherwise use config logging.file if set
    let config_log_path: Option<std::path::PathBuf> = if config.logging.file.is_empty() {
        None
    } else {
        Some(std::path::PathBuf::from(&config.logging.file))
    };

    if let Some(log_path) = args.log_file.as_ref().or(config_log_path.as_ref()) {
        let display_path = log_path.to_string_lossy();
        if init_file_logging(log_path) {
            if verbose {
                eprintln!("✓ File logging initialized at: {display_path}");
            } else {
                info!("File logging initialized at: {display_path}");
            }
        } else {
            eprintln!("✗ Failed to initialize file logging at: {display_path}");
        }
    }

    // Handle subcommands
    let code = match args.command {
        Command::Config { subcommand } => commands::config::run(subcommand, &mut config, &defaults),
        Command::Ingest { json } => commands::ingest::run(json.as_deref(), &config),
        Command::Feed { limit, json } => commands::feed::run(limit, json, &config),
        Command::Report {
            from,
            to,
            author,
            output,
            page_numbers,
            dry_run,
        } => commands::report::run(
            &ReportOptions {
                from,
                to,
                author,
                output,
                page_numbers,
                dry_run,
            },
            &config,
        ),
    };

    if code != commands::EXIT_OK {
        std::process::exit(code);
    }
}
