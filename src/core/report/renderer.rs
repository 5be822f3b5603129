//! Report renderer
//!
//! Draws the fixed report layout onto any [`Canvas`]: title, metadata, the
//! statistical summary and the paginated detail table. All request data is
//! validated before anything is aggregated or drawn.

use super::canvas::{Align, Canvas, PageSize, Rgb, TextStyle};
use super::fonts::{line_height, Font};
use super::layout::{
    plan_detail_layout, plan_summary_layout, ColumnGeometry, DETAIL_COLUMNS, MARGIN, ROW_HEIGHT,
};
use super::page_flow::{PageFlowController, RepeatingHeader};
use super::{ReportError, ReportRequest};
use crate::core::range::DISPLAY_FORMAT;
use crate::core::stats::{self, AggregateStats};
use std::io;

const TITLE: &str = "WATER QUALITY REPORT";
const SUMMARY_TITLE: &str = "STATISTICAL SUMMARY";
const DETAIL_TITLE: &str = "DETAILED DATA";
const TIMESTAMP_HEADER: &str = "Date & Time";

/// Timestamp pattern of the detail table
pub const DETAIL_TIME_FORMAT: &str = "%d/%m/%y %H:%M:%S";

/// Horizontal gap between the separator line and the page edge
const SEPARATOR_INSET: f64 = 50.0;

/// Offset of text from the top of its table row
const CELL_TEXT_INSET: f64 = 5.0;

/// Padding of the summary label column
const LABEL_PADDING: f64 = 5.0;

const TITLE_COLOR: Rgb = Rgb::hex(0x33_33_33);
const META_COLOR: Rgb = Rgb::hex(0x55_55_55);
const SECTION_COLOR: Rgb = Rgb::hex(0x00_66_cc);
const TEXT_COLOR: Rgb = Rgb::hex(0x33_33_33);
const RULE_COLOR: Rgb = Rgb::hex(0xcc_cc_cc);
const HEADER_BAND: Rgb = Rgb::hex(0xe0_e0_e0);
const SUMMARY_STRIPE: Rgb = Rgb::hex(0xf5_f5_f5);
const DETAIL_STRIPE: Rgb = Rgb::hex(0xf9_f9_f9);

/// What a completed render produced
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    /// Pages in the document
    pub pages: usize,
    /// Detail rows drawn
    pub detail_rows: usize,
    /// Geometry used for the summary table
    pub summary_layout: ColumnGeometry,
    /// Geometry used for the detail table
    pub detail_layout: ColumnGeometry,
    /// Aggregates shown in the summary table
    pub stats: AggregateStats,
}

/// Check a request before any work is done.
///
/// # Errors
/// - [`ReportError::MissingAuthor`] for a blank author
/// - [`ReportError::NoData`] when there are no records
/// - [`ReportError::OutOfOrder`] when timestamps are not ascending
pub fn validate(request: &ReportRequest<'_>) -> Result<(), ReportError> {
    if request.author.trim().is_empty() {
        return Err(ReportError::MissingAuthor);
    }
    if request.records.is_empty() {
        return Err(ReportError::NoData {
            range: request.range,
        });
    }
    if let Some(index) = request
        .records
        .windows(2)
        .position(|pair| pair[0].timestamp > pair[1].timestamp)
    {
        return Err(ReportError::OutOfOrder { index: index + 1 });
    }
    Ok(())
}

/// The detail table header band; drawn once under the section title and again
/// at the top of every continuation page
struct DetailHeader<'g> {
    geometry: &'g ColumnGeometry,
}

impl RepeatingHeader for DetailHeader<'_> {
    fn height(&self) -> f64 {
        ROW_HEIGHT
    }

    fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C, y: f64) {
        let style = TextStyle::new(Font::Bold, 9.0, TEXT_COLOR);
        canvas.fill_rect(self.geometry.start_x, y, self.geometry.table_width, ROW_HEIGHT, HEADER_BAND);

        let labels = std::iter::once(TIMESTAMP_HEADER.to_string())
            .chain(DETAIL_COLUMNS.iter().map(|(key, _)| key.spec().short_label()));
        for ((x, width), label) in self.geometry.columns().zip(labels) {
            canvas.draw_text(&label, x, y + CELL_TEXT_INSET, width, Align::Center, &style);
        }
    }
}

/// Column titles of the summary table, repeated if the table runs onto a
/// second page
struct SummaryHeader<'g> {
    geometry: &'g ColumnGeometry,
}

impl SummaryHeader<'_> {
    fn label_frame(&self) -> (f64, f64) {
        let first = self.geometry.column_widths.first().copied().unwrap_or_default();
        (self.geometry.start_x + LABEL_PADDING, first - 2.0 * LABEL_PADDING)
    }
}

impl RepeatingHeader for SummaryHeader<'_> {
    fn height(&self) -> f64 {
        ROW_HEIGHT
    }

    fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C, y: f64) {
        let style = TextStyle::new(Font::Bold, 10.0, TEXT_COLOR);
        let (label_x, label_width) = self.label_frame();
        canvas.fill_rect(self.geometry.start_x, y, self.geometry.table_width, ROW_HEIGHT, HEADER_BAND);
        canvas.draw_text("PARAMETER", label_x, y + CELL_TEXT_INSET, label_width, Align::Left, &style);
        for ((x, width), label) in self.geometry.columns().skip(1).zip(["MEAN", "MIN", "MAX"]) {
            canvas.draw_text(label, x, y + CELL_TEXT_INSET, width, Align::Center, &style);
        }
    }
}

/// Draws one report onto a canvas
pub struct ReportRenderer<'c, C: Canvas + ?Sized> {
    canvas: &'c mut C,
    page: PageSize,
}

impl<'c, C: Canvas + ?Sized> ReportRenderer<'c, C> {
    /// Create a renderer targeting `canvas`
    pub fn new(canvas: &'c mut C) -> Self {
        let page = canvas.page_size();
        Self { canvas, page }
    }

    /// Render the full report and finish the canvas
    ///
    /// # Errors
    /// Returns validation errors from [`validate`] before drawing anything, or
    /// [`ReportError::Io`] if the canvas fails to write a page.
    pub fn render(mut self, request: &ReportRequest<'_>) -> Result<RenderSummary, ReportError> {
        validate(request)?;
        let stats = stats::aggregate(request.records).map_err(|_| ReportError::NoData {
            range: request.range,
        })?;
        let summary_layout = plan_summary_layout(self.page.width);
        let detail_layout = plan_detail_layout(self.page.width);

        let mut flow = PageFlowController::begin_document(&mut *self.canvas, MARGIN)?;
        self.draw_title_block(&mut flow, request)?;
        self.draw_summary(&mut flow, &summary_layout, &stats)?;

        // the header band never ends a page without a row under it
        let header = DetailHeader {
            geometry: &detail_layout,
        };
        self.section_title(&mut flow, DETAIL_TITLE, header.height() + ROW_HEIGHT)?;
        header.draw(&mut *self.canvas, flow.y());
        flow.advance(header.height());

        let value_style = TextStyle::new(Font::Regular, 8.0, TEXT_COLOR);
        for (index, record) in request.records.iter().enumerate() {
            flow.ensure_space_for_row(
                &mut *self.canvas,
                &header,
                ROW_HEIGHT,
                MARGIN,
                self.page.height,
            )?;
            let y = flow.y();

            if index % 2 == 0 {
                self.canvas.fill_rect(
                    detail_layout.start_x,
                    y,
                    detail_layout.table_width,
                    ROW_HEIGHT,
                    DETAIL_STRIPE,
                );
            }

            let mut columns = detail_layout.columns();
            if let Some((x, width)) = columns.next() {
                let stamp = record.timestamp.format(DETAIL_TIME_FORMAT).to_string();
                self.canvas
                    .draw_text(&stamp, x, y + CELL_TEXT_INSET, width, Align::Center, &value_style);
            }
            for ((x, width), (key, _)) in columns.zip(DETAIL_COLUMNS.iter()) {
                let value = format!("{:.2}", record.value(*key));
                self.canvas
                    .draw_text(&value, x, y + CELL_TEXT_INSET, width, Align::Center, &value_style);
            }

            flow.advance(ROW_HEIGHT);
        }

        self.canvas.finish()?;
        crate::debug!(
            "Rendered {} rows on {} page(s)",
            request.records.len(),
            flow.page_count()
        );

        Ok(RenderSummary {
            pages: flow.page_count(),
            detail_rows: request.records.len(),
            summary_layout,
            detail_layout,
            stats,
        })
    }

    /// Start a new page unless `height` still fits above the bottom margin
    fn reserve(&mut self, flow: &mut PageFlowController, height: f64) -> io::Result<()> {
        flow.ensure_space(&mut *self.canvas, height, MARGIN, self.page.height)?;
        Ok(())
    }

    /// Draw one line of text between the margins and move below it
    fn text_line(
        &mut self,
        flow: &mut PageFlowController,
        text: &str,
        align: Align,
        style: &TextStyle,
    ) -> io::Result<()> {
        self.reserve(flow, line_height(style.size))?;
        let width = self.page.width - 2.0 * MARGIN;
        self.canvas.draw_text(text, MARGIN, flow.y(), width, align, style);
        flow.advance(line_height(style.size));
        Ok(())
    }

    fn draw_title_block(
        &mut self,
        flow: &mut PageFlowController,
        request: &ReportRequest<'_>,
    ) -> io::Result<()> {
        let title = TextStyle::new(Font::Bold, 20.0, TITLE_COLOR);
        self.text_line(flow, TITLE, Align::Center, &title)?;
        flow.advance(0.5 * line_height(title.size));

        let meta = TextStyle::new(Font::Regular, 10.0, META_COLOR);
        let lines = [
            format!("Generated by: {}", request.author.trim()),
            format!("Period: {}", request.range),
            format!("Generated at: {}", request.generated_at.format(DISPLAY_FORMAT)),
            format!("Total records: {}", request.records.len()),
        ];
        for line in &lines {
            self.text_line(flow, line, Align::Left, &meta)?;
        }
        flow.advance(line_height(meta.size));

        self.reserve(flow, line_height(meta.size))?;
        let y = flow.y();
        self.canvas.stroke_line(
            (SEPARATOR_INSET, y),
            (self.page.width - SEPARATOR_INSET, y),
            1.0,
            RULE_COLOR,
        );
        flow.advance(line_height(meta.size));
        Ok(())
    }

    /// Draw a section title, kept on the same page as the `keep_with` points
    /// of content that follow it
    fn section_title(
        &mut self,
        flow: &mut PageFlowController,
        text: &str,
        keep_with: f64,
    ) -> io::Result<()> {
        let style = TextStyle::new(Font::Bold, 14.0, SECTION_COLOR);
        self.reserve(flow, 1.5 * line_height(style.size) + keep_with)?;
        self.text_line(flow, text, Align::Left, &style)?;
        flow.advance(0.5 * line_height(style.size));
        Ok(())
    }

    fn draw_summary(
        &mut self,
        flow: &mut PageFlowController,
        geometry: &ColumnGeometry,
        stats: &AggregateStats,
    ) -> io::Result<()> {
        let header = SummaryHeader { geometry };
        self.section_title(flow, SUMMARY_TITLE, header.height() + ROW_HEIGHT)?;
        header.draw(&mut *self.canvas, flow.y());
        flow.advance(header.height());

        let body = TextStyle::new(Font::Regular, 9.0, TEXT_COLOR);
        let (label_x, label_width) = header.label_frame();
        for (index, (spec, values)) in stats.iter().enumerate() {
            flow.ensure_space_for_row(&mut *self.canvas, &header, ROW_HEIGHT, MARGIN, self.page.height)?;
            let y = flow.y();
            if index % 2 == 0 {
                self.canvas
                    .fill_rect(geometry.start_x, y, geometry.table_width, ROW_HEIGHT, SUMMARY_STRIPE);
            }
            self.canvas
                .draw_text(&spec.label(), label_x, y + CELL_TEXT_INSET, label_width, Align::Left, &body);
            let cells = [values.mean, values.min, values.max];
            for ((x, width), value) in geometry.columns().skip(1).zip(cells) {
                let text = format!("{value:.2}");
                self.canvas
                    .draw_text(&text, x, y + CELL_TEXT_INSET, width, Align::Center, &body);
            }
            flow.advance(ROW_HEIGHT);
        }
        flow.advance(line_height(body.size));
        Ok(())
    }
}
