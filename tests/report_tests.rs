//! Integration tests for report rendering and pagination

use aqua_report::core::models::MeasurementRecord;
use aqua_report::core::range::ReportRange;
use aqua_report::core::report::canvas::DrawOp;
use aqua_report::core::report::fonts::line_height;
use aqua_report::core::report::layout::{MARGIN, ROW_HEIGHT};
use aqua_report::core::report::{
    PageSize, PdfReporter, RecordingCanvas, ReportError, ReportGenerator, ReportRenderer,
    ReportRequest,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::io::{self, Write};
use tempfile::TempDir;

const HEADER_LABEL: &str = "Date & Time";

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 5, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap()
}

fn generated_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .and_then(|d| d.and_hms_opt(12, 30, 0))
        .unwrap()
}

fn readings(count: usize) -> Vec<MeasurementRecord> {
    (0..count)
        .map(|i| {
            let step = f64::from(u32::try_from(i % 50).unwrap());
            MeasurementRecord {
                timestamp: base() + Duration::minutes(i64::try_from(i).unwrap() * 10),
                temperature: 18.0 + step * 0.1,
                total_dissolved_solids: 320.0 + step,
                electrical_conductivity: 640.0 + step * 2.0,
                resistivity: 1_000_000.0 / (640.0 + step * 2.0),
                salinity: 0.32,
                purity: 96.8 - step * 0.01,
                ph: 7.0 + step * 0.005,
            }
        })
        .collect()
}

fn request(records: &[MeasurementRecord]) -> ReportRequest<'_> {
    ReportRequest {
        records,
        range: ReportRange::new(base(), base() + Duration::days(365)).unwrap(),
        author: "Quality lab",
        generated_at: generated_at(),
    }
}

fn record_pages_on(size: PageSize, records: &[MeasurementRecord]) -> RecordingCanvas {
    let mut canvas = RecordingCanvas::new(size);
    ReportRenderer::new(&mut canvas)
        .render(&request(records))
        .expect("render");
    canvas
}

fn record_pages(records: &[MeasurementRecord]) -> RecordingCanvas {
    record_pages_on(PageSize::A4, records)
}

fn pdf_page_count(bytes: &[u8]) -> usize {
    lopdf::Document::load_mem(bytes).unwrap().get_pages().len()
}

/// Detail rows on a page, recognised by their `dd/mm/yy HH:MM:SS` cell
fn rows_on_page(canvas: &RecordingCanvas, page: usize) -> usize {
    canvas
        .texts_on_page(page)
        .filter(|(text, _, _)| {
            text.len() == 17 && text.as_bytes()[2] == b'/' && text.as_bytes()[11] == b':'
        })
        .count()
}

fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle.as_bytes())
}

#[test]
fn overflowing_rows_start_new_pages() {
    // 39 rows need 780pt, more than the 761.89pt between the margins
    let records = readings(39);
    let canvas = record_pages(&records);
    assert!(canvas.page_count() > 1);
    assert!(canvas.is_finished());
}

#[test]
fn page_count_is_exact_at_page_boundaries() {
    // page 1 takes 20 detail rows under the title and summary, every
    // continuation page 37
    let reporter = PdfReporter::new();
    for (rows, pages) in [(1, 1), (20, 1), (21, 2), (57, 2), (58, 3), (94, 3), (95, 4)] {
        let records = readings(rows);
        let planned = reporter.plan(&request(&records)).unwrap();
        assert_eq!(planned.pages, pages, "{rows} rows");
        assert_eq!(record_pages(&records).page_count(), pages, "{rows} rows");
    }
}

#[test]
fn pdf_page_count_matches_the_plan() {
    let reporter = PdfReporter::new();
    for rows in [20, 21, 58] {
        let records = readings(rows);
        let planned = reporter.plan(&request(&records)).unwrap();
        let bytes = reporter.render(&request(&records)).unwrap();
        assert_eq!(pdf_page_count(&bytes), planned.pages, "{rows} rows");
    }
}

#[test]
fn short_pages_keep_every_block_above_the_margin() {
    let short = PageSize {
        width: 595.28,
        height: 350.0,
    };
    let records = readings(3);
    let canvas = record_pages_on(short, &records);
    let limit = short.height - MARGIN;
    assert!(canvas.page_count() > 1);

    for (index, page) in canvas.pages().iter().enumerate() {
        for op in page {
            match op {
                DrawOp::Rect { y, height, .. } => {
                    assert!(y + height <= limit + 1e-9, "page {index}: rect at {y} overflows");
                }
                DrawOp::Text { text, y, size, .. } => {
                    assert!(
                        y + line_height(*size) <= limit + 1e-9,
                        "page {index}: '{text}' at {y} overflows"
                    );
                }
                DrawOp::Line { from, .. } => assert!(from.1 <= limit, "page {index}: rule overflows"),
                DrawOp::BeginPage => {}
            }
        }
    }

    // a header band is never left without a row under it
    for page in 0..canvas.page_count() {
        let has_header = canvas
            .texts_on_page(page)
            .any(|(text, _, _)| text == HEADER_LABEL);
        if has_header {
            assert!(rows_on_page(&canvas, page) > 0, "page {page}");
        }
    }
    let total: usize = (0..canvas.page_count()).map(|p| rows_on_page(&canvas, p)).sum();
    assert_eq!(total, 3);
}

#[test]
fn every_page_repeats_the_detail_header() {
    let records = readings(150);
    let canvas = record_pages(&records);
    assert!(canvas.page_count() >= 4);

    for page in 0..canvas.page_count() {
        let headers = canvas
            .texts_on_page(page)
            .filter(|(text, _, _)| *text == HEADER_LABEL)
            .count();
        assert_eq!(headers, 1, "page {page}");
    }
    for page in 1..canvas.page_count() {
        let first = canvas.texts_on_page(page).next().map(|(text, _, _)| text);
        assert_eq!(first, Some(HEADER_LABEL), "page {page} must open with the header");
    }
}

#[test]
fn continuation_pages_hold_37_rows() {
    let records = readings(200);
    let canvas = record_pages(&records);
    let pages = canvas.page_count();

    let total: usize = (0..pages).map(|p| rows_on_page(&canvas, p)).sum();
    assert_eq!(total, 200);
    assert!(rows_on_page(&canvas, 0) > 0);
    for page in 1..pages - 1 {
        assert_eq!(rows_on_page(&canvas, page), 37, "page {page}");
    }
}

#[test]
fn nothing_is_drawn_below_the_bottom_margin() {
    let records = readings(120);
    let canvas = record_pages(&records);
    let limit = PageSize::A4.height - MARGIN;

    for page in canvas.pages() {
        for op in page {
            if let DrawOp::Rect { y, height, .. } = op {
                assert!(y + height <= limit + 1e-9, "rect at {y} overflows");
            }
        }
    }
}

#[test]
fn continuation_rows_start_below_the_header() {
    let records = readings(80);
    let canvas = record_pages(&records);
    let header_y = canvas
        .texts_on_page(1)
        .find(|(text, _, _)| *text == HEADER_LABEL)
        .map(|(_, _, y)| y)
        .unwrap();
    let first_row_y = canvas
        .texts_on_page(1)
        .find(|(text, _, _)| text.len() == 17 && text.contains(':'))
        .map(|(_, _, y)| y)
        .unwrap();
    assert!((first_row_y - header_y - ROW_HEIGHT).abs() < 1e-9);
}

#[test]
fn geometry_does_not_depend_on_row_count() {
    let reporter = PdfReporter::new();
    let one = readings(1);
    let many = readings(10_000);

    let small = reporter.plan(&request(&one)).unwrap();
    let large = reporter.plan(&request(&many)).unwrap();
    assert_eq!(small.summary_layout, large.summary_layout);
    assert_eq!(small.detail_layout, large.detail_layout);
    assert_eq!(small.pages, 1);
    assert!(large.pages > 200);
}

#[test]
fn summary_uses_known_statistics() {
    let mut records = readings(3);
    for (record, temp) in records.iter_mut().zip([20.0, 22.0, 24.0]) {
        record.temperature = temp;
    }
    let canvas = record_pages(&records);
    let texts: Vec<&str> = canvas.texts_on_page(0).map(|(text, _, _)| text).collect();
    let row = texts
        .iter()
        .position(|text| *text == "Temperature (°C)")
        .unwrap();
    assert_eq!(&texts[row + 1..row + 4], &["22.00", "20.00", "24.00"]);

    let summary = PdfReporter::new().plan(&request(&records)).unwrap();
    let temp = summary
        .stats
        .get(aqua_report::core::models::ParameterKey::Temperature);
    assert!((temp.mean - 22.0).abs() < 1e-12);
}

#[test]
fn identical_requests_give_identical_bytes() {
    let records = readings(90);
    let reporter = PdfReporter::new();
    let first = reporter.render(&request(&records)).unwrap();
    let second = reporter.render(&request(&records)).unwrap();
    assert_eq!(first, second);
    assert!(first.starts_with(b"%PDF-"));
    assert!(contains(&first[first.len() - 16..], "%%EOF"));

    let mut later = request(&records);
    later.generated_at = generated_at() + Duration::seconds(1);
    assert_ne!(reporter.render(&later).unwrap(), first);
}

#[test]
fn concurrent_reports_do_not_interfere() {
    let sets: Vec<Vec<MeasurementRecord>> = [5, 60, 130, 7].iter().map(|&n| readings(n)).collect();
    let reporter = PdfReporter::new();
    let expected: Vec<Vec<u8>> = sets
        .iter()
        .map(|set| reporter.render(&request(set)).unwrap())
        .collect();

    let produced: Vec<Vec<u8>> = std::thread::scope(|scope| {
        let handles: Vec<_> = sets
            .iter()
            .map(|set| scope.spawn(move || reporter.render(&request(set)).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(produced, expected);
}

#[test]
fn empty_range_writes_no_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reports").join("empty.pdf");

    let err = PdfReporter::new().generate(&request(&[]), &path).unwrap_err();
    assert!(err.is_no_data());
    assert!(!path.exists());
    assert!(!dir.path().join("reports").exists());
}

#[test]
fn report_is_written_to_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reports").join("may.pdf");
    let records = readings(45);

    let summary = PdfReporter::new().generate(&request(&records), &path).unwrap();
    assert_eq!(summary.detail_rows, 45);

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert_eq!(pdf_page_count(&bytes), summary.pages);
}

/// Sink that accepts a fixed number of bytes and then fails
#[derive(Debug)]
struct FailingSink {
    remaining: usize,
}

impl Write for FailingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
        }
        let n = buf.len().min(self.remaining);
        self.remaining -= n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn sink_failure_aborts_rendering() {
    let records = readings(100);
    let err = PdfReporter::new()
        .write_to(&request(&records), FailingSink { remaining: 2_000 })
        .unwrap_err();
    assert!(matches!(err, ReportError::Io(_)));
    assert!(!err.is_validation() && !err.is_no_data());
}

#[test]
fn footer_numbers_every_page_when_enabled() {
    let records = readings(100);
    let plain = record_pages(&records);
    let pages = plain.page_count();
    assert!((0..pages).all(|p| plain.texts_on_page(p).all(|(t, _, _)| !t.starts_with("Page "))));

    let mut numbered = RecordingCanvas::new(PageSize::A4).with_page_numbers(true);
    ReportRenderer::new(&mut numbered)
        .render(&request(&records))
        .unwrap();
    for page in 0..pages {
        let label = format!("Page {} of {pages}", page + 1);
        let footer = numbered
            .texts_on_page(page)
            .find(|(text, _, _)| *text == label)
            .map(|(_, _, y)| y);
        assert_eq!(footer, Some(PageSize::A4.height - 30.0), "page {page}");
    }

    let reporter = PdfReporter::new();
    let plain_pdf = reporter.render(&request(&records)).unwrap();
    let numbered_pdf = reporter
        .with_page_numbers(true)
        .render(&request(&records))
        .unwrap();
    assert_ne!(plain_pdf, numbered_pdf);
    assert_eq!(pdf_page_count(&numbered_pdf), pages);
}

#[test]
fn out_of_order_records_are_rejected() {
    let mut records = readings(4);
    records.swap(1, 2);
    let err = PdfReporter::new().render(&request(&records)).unwrap_err();
    assert!(matches!(err, ReportError::OutOfOrder { index: 2 }));
    assert!(err.is_validation());
}

#[test]
fn blank_author_is_a_validation_error() {
    let records = readings(2);
    let mut req = request(&records);
    req.author = "";
    let err = PdfReporter::new().render(&req).unwrap_err();
    assert!(matches!(err, ReportError::MissingAuthor));
}
