//! Water-quality report generation
//!
//! A report is a paginated PDF: title and metadata, a per-parameter summary
//! table and a detail table with one row per reading. The drawing logic lives
//! in [`renderer`] and targets the [`canvas::Canvas`] trait, so the same layout
//! can be written as PDF or recorded for inspection.

pub mod canvas;
pub mod fonts;
pub mod layout;
pub mod page_flow;
pub mod pdf;
pub mod renderer;

use crate::core::models::MeasurementRecord;
use crate::core::range::{RangeError, ReportRange};
use chrono::NaiveDateTime;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

pub use canvas::{Canvas, PageSize, RecordingCanvas};
pub use layout::ColumnGeometry;
pub use page_flow::{PageCursor, PageFlowController, RepeatingHeader, RowSpace};
pub use pdf::{DocumentInfo, PdfCanvas};
pub use renderer::{validate, RenderSummary, ReportRenderer};

/// MIME type of generated reports
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Title stored in the document metadata
pub const DOCUMENT_TITLE: &str = "Water Quality Report";

/// Everything needed to render one report
#[derive(Debug, Clone, Copy)]
pub struct ReportRequest<'a> {
    /// Readings inside `range`, oldest first
    pub records: &'a [MeasurementRecord],
    /// The requested period
    pub range: ReportRange,
    /// Who the report is generated for
    pub author: &'a str,
    /// Generation time shown in the report; pin it for reproducible output
    pub generated_at: NaiveDateTime,
}

/// Why a report was not produced
#[derive(Debug, Error)]
pub enum ReportError {
    /// The range was missing, unparseable or reversed
    #[error(transparent)]
    InvalidRange(#[from] RangeError),
    /// No author name was given
    #[error("an author name is required")]
    MissingAuthor,
    /// The range holds no readings; not a failure
    #[error("no data in range {range}")]
    NoData {
        /// The requested range
        range: ReportRange,
    },
    /// Readings were not in ascending timestamp order
    #[error("record {index} is older than the record before it")]
    OutOfOrder {
        /// Position of the first offending record
        index: usize,
    },
    /// Writing the document failed; any partial output is invalid
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
}

impl ReportError {
    /// The request itself was rejected
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidRange(_) | Self::MissingAuthor | Self::OutOfOrder { .. }
        )
    }

    /// The range was valid but empty
    #[must_use]
    pub const fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}

/// Download name for a report generated at `generated_at`
#[must_use]
pub fn suggested_filename(generated_at: NaiveDateTime) -> String {
    format!(
        "Reporte_Calidad_Agua_{}.pdf",
        generated_at.format("%Y%m%d_%H%M%S")
    )
}

/// Trait for report generators
pub trait ReportGenerator {
    /// Generate a report to a file
    ///
    /// # Errors
    /// Returns an error if the request is invalid or writing fails. No file is
    /// left behind in either case.
    fn generate(
        &self,
        request: &ReportRequest<'_>,
        output_path: &Path,
    ) -> Result<RenderSummary, ReportError>;

    /// Generate the report in memory
    ///
    /// # Errors
    /// Returns an error if the request is invalid
    fn render(&self, request: &ReportRequest<'_>) -> Result<Vec<u8>, ReportError>;
}

/// PDF report generator
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfReporter {
    page_numbers: bool,
    page_size: Option<PageSize>,
}

impl PdfReporter {
    /// Create a new PDF reporter with the default A4 layout
    #[must_use]
    pub const fn new() -> Self {
        Self {
            page_numbers: false,
            page_size: None,
        }
    }

    /// Stamp `Page N of M` at the bottom of every page
    #[must_use]
    pub const fn with_page_numbers(mut self, enabled: bool) -> Self {
        self.page_numbers = enabled;
        self
    }

    /// Use a page size other than A4
    #[must_use]
    pub const fn with_page_size(mut self, size: PageSize) -> Self {
        self.page_size = Some(size);
        self
    }

    fn size(&self) -> PageSize {
        self.page_size.unwrap_or(PageSize::A4)
    }

    /// Write the report into `sink` and hand the sink back
    ///
    /// # Errors
    /// Returns validation errors before anything is written, or
    /// [`ReportError::Io`] when the sink fails.
    pub fn write_to<W: Write>(
        &self,
        request: &ReportRequest<'_>,
        sink: W,
    ) -> Result<(RenderSummary, W), ReportError> {
        validate(request)?;
        let info = DocumentInfo {
            title: DOCUMENT_TITLE.to_string(),
            author: request.author.trim().to_string(),
            created: request.generated_at,
        };
        let mut canvas = PdfCanvas::new(sink, self.size(), info)?.with_page_numbers(self.page_numbers);
        let summary = ReportRenderer::new(&mut canvas).render(request)?;
        Ok((summary, canvas.into_inner()?))
    }

    /// Lay the report out without producing a document
    ///
    /// # Errors
    /// Returns the same validation errors as a real render.
    pub fn plan(&self, request: &ReportRequest<'_>) -> Result<RenderSummary, ReportError> {
        let mut canvas = RecordingCanvas::new(self.size()).with_page_numbers(self.page_numbers);
        ReportRenderer::new(&mut canvas).render(request)
    }
}

impl ReportGenerator for PdfReporter {
    fn generate(
        &self,
        request: &ReportRequest<'_>,
        output_path: &Path,
    ) -> Result<RenderSummary, ReportError> {
        validate(request)?;

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(output_path)?;
        crate::debug!("Writing report to {}", output_path.display());

        let written = self
            .write_to(request, BufWriter::new(file))
            .and_then(|(summary, mut writer)| {
                writer.flush()?;
                Ok(summary)
            });

        if written.is_err() {
            if let Err(e) = fs::remove_file(output_path) {
                crate::warn!(
                    "Could not remove partial report {}: {e}",
                    output_path.display()
                );
            }
        }
        written
    }

    fn render(&self, request: &ReportRequest<'_>) -> Result<Vec<u8>, ReportError> {
        self.write_to(request, Vec::new()).map(|(_, bytes)| bytes)
    }
}
