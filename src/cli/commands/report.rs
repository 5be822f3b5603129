//! Report command handler
//!
//! Loads the readings in the requested range from the data file and renders
//! them as a paginated PDF.

use aqua_report::config::Config;
use aqua_report::core::range::ReportRange;
use aqua_report::core::report::{
    suggested_filename, PdfReporter, ReportError, ReportGenerator, ReportRequest,
};
use aqua_report::core::store::MeasurementStore;
use aqua_report::{error, info, verbose};
use std::path::PathBuf;

use super::{now, EXIT_FAILURE, EXIT_NO_DATA, EXIT_OK, EXIT_VALIDATION};

/// Options of one `report` invocation
#[derive(Debug, Default)]
pub struct ReportOptions {
    /// Range start as typed
    pub from: Option<String>,
    /// Range end as typed
    pub to: Option<String>,
    /// Author from the command line
    pub author: Option<String>,
    /// Explicit output path
    pub output: Option<PathBuf>,
    /// Force the page footer on
    pub page_numbers: bool,
    /// Plan only, write nothing
    pub dry_run: bool,
}

/// Run the report command and return the process exit code.
///
/// # Arguments
/// * `options` - Parsed command-line options
/// * `config` - Configuration with the data file, reports directory and defaults
pub fn run(options: &ReportOptions, config: &Config) -> i32 {
    match generate(options, config) {
        Ok(()) => EXIT_OK,
        Err(Failure::Report(err)) => {
            let code = exit_code(&err);
            if code == EXIT_NO_DATA {
                println!("No data in range: {err}");
            } else {
                error!("Report generation failed: {err}");
                eprintln!("✗ {err}");
            }
            code
        }
        Err(Failure::Store(message)) => {
            error!("{message}");
            eprintln!("✗ {message}");
            EXIT_FAILURE
        }
    }
}

/// Map a report outcome to an exit code
pub const fn exit_code(err: &ReportError) -> i32 {
    if err.is_validation() {
        EXIT_VALIDATION
    } else if err.is_no_data() {
        EXIT_NO_DATA
    } else {
        EXIT_FAILURE
    }
}

enum Failure {
    Report(ReportError),
    Store(String),
}

impl From<ReportError> for Failure {
    fn from(err: ReportError) -> Self {
        Self::Report(err)
    }
}

fn generate(options: &ReportOptions, config: &Config) -> Result<(), Failure> {
    let range = ReportRange::parse(options.from.as_deref(), options.to.as_deref())
        .map_err(ReportError::from)?;

    let author = options
        .author
        .as_deref()
        .unwrap_or(config.report.author.as_str())
        .trim();
    if author.is_empty() {
        return Err(ReportError::MissingAuthor.into());
    }

    let store = MeasurementStore::new(&config.storage.data_file);
    let records = store.query_range(&range).map_err(|e| {
        Failure::Store(format!(
            "Failed to read measurements from {}: {e}",
            store.path().display()
        ))
    })?;
    info!("Loaded {} reading(s) for {range}", records.len());

    let request = ReportRequest {
        records: &records,
        range,
        author,
        generated_at: now(),
    };
    let reporter =
        PdfReporter::new().with_page_numbers(options.page_numbers || config.report.page_numbers);

    if options.dry_run {
        let summary = reporter.plan(&request)?;
        println!(
            "✓ {} reading(s) would fill {} page(s)",
            summary.detail_rows, summary.pages
        );
        return Ok(());
    }

    let output = options.output.clone().unwrap_or_else(|| {
        PathBuf::from(&config.paths.reports_dir).join(suggested_filename(request.generated_at))
    });
    let summary = reporter.generate(&request, &output)?;

    verbose!(
        "  {} reading(s), {} page(s), period {range}",
        summary.detail_rows,
        summary.pages
    );
    println!("✓ Report generated: {}", output.display());
    Ok(())
}
