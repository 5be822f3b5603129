//! PDF backend built on `printpdf`
//!
//! The document is assembled in memory and serialized to the sink by
//! [`Canvas::finish`]. Text uses the built-in Helvetica faces, so no font data
//! is embedded. With page numbers enabled the footer is stamped on every page
//! at finish, when the page count is known.
//!
//! `printpdf` writes a fresh instance id into the trailer on every save. The
//! saved file is passed once through `lopdf` to pin that id to one derived
//! from the generation time, so identical requests give identical bytes.

use super::canvas::{
    aligned_x, footer_frame, footer_label, Align, Canvas, PageSize, Rgb, TextStyle, FOOTER_STYLE,
};
use super::fonts::{printable, Font, ASCENDER};
use chrono::NaiveDateTime;
use printpdf::{
    Color, CustomPdfConformance, IndirectFontRef, Line, Mm, PdfConformance,
    PdfDocument, PdfDocumentReference, PdfLayerIndex, PdfLayerReference, PdfPageIndex, Point, Pt,
    Rect,
};
use std::fmt::Display;
use std::io::{self, BufWriter, Cursor, Write};
use time::OffsetDateTime;

/// Producer recorded in the document info
pub const PRODUCER: &str = concat!("aquareport ", env!("CARGO_PKG_VERSION"));

const LAYER_NAME: &str = "Report";

/// Entries of the document information dictionary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    /// Document title
    pub title: String,
    /// Person the report was generated for
    pub author: String,
    /// Creation time; always the pinned generation timestamp
    pub created: NaiveDateTime,
}

impl DocumentInfo {
    /// Identifier written to the trailer `/ID`
    fn document_id(&self) -> String {
        format!("aquareport-{}", self.created.format("%Y%m%d%H%M%S"))
    }
}

fn pdf_error(err: impl Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

/// Points to `printpdf` millimetres
#[allow(clippy::cast_possible_truncation)]
fn mm(points: f64) -> Mm {
    Mm::from(Pt(points as f32))
}

#[allow(clippy::cast_possible_truncation)]
fn font_size(points: f64) -> f32 {
    points as f32
}

fn color(Rgb(r, g, b): Rgb) -> Color {
    let channel = |c: u8| f32::from(c) / 255.0;
    Color::Rgb(printpdf::Rgb::new(channel(r), channel(g), channel(b), None))
}

/// A [`Canvas`] that produces a PDF document on any [`Write`] sink
pub struct PdfCanvas<W: Write> {
    sink: W,
    doc: Option<PdfDocumentReference>,
    size: PageSize,
    document_id: String,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// Page created together with the document, handed out by the first `begin_page`
    initial: Option<(PdfPageIndex, PdfLayerIndex)>,
    pages: Vec<(PdfPageIndex, PdfLayerIndex)>,
    page_numbers: bool,
    finished: bool,
}

impl<W: Write> PdfCanvas<W> {
    /// Start a document that will be written to `sink`
    ///
    /// # Errors
    /// Returns an error if the creation time is out of range or the fonts
    /// cannot be registered.
    pub fn new(sink: W, size: PageSize, info: DocumentInfo) -> io::Result<Self> {
        let created =
            OffsetDateTime::from_unix_timestamp(info.created.and_utc().timestamp()).map_err(pdf_error)?;
        let document_id = info.document_id();

        let (doc, page, layer) =
            PdfDocument::new(info.title.clone(), mm(size.width), mm(size.height), LAYER_NAME);
        let doc = doc
            .with_conformance(PdfConformance::Custom(CustomPdfConformance {
                requires_icc_profile: false,
                requires_xmp_metadata: false,
                ..CustomPdfConformance::default()
            }))
            .with_author(info.author)
            .with_creator(PRODUCER)
            .with_producer(PRODUCER)
            .with_document_id(document_id.clone())
            .with_creation_date(created)
            .with_mod_date(created)
            .with_metadata_date(created);

        let regular = doc
            .add_builtin_font(Font::Regular.builtin())
            .map_err(pdf_error)?;
        let bold = doc
            .add_builtin_font(Font::Bold.builtin())
            .map_err(pdf_error)?;

        Ok(Self {
            sink,
            doc: Some(doc),
            size,
            document_id,
            regular,
            bold,
            initial: Some((page, layer)),
            pages: Vec::new(),
            page_numbers: false,
            finished: false,
        })
    }

    /// Stamp `Page N of M` at the bottom of every page
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn with_page_numbers(mut self, enabled: bool) -> Self {
        self.page_numbers = enabled;
        self
    }

    /// Return the sink once the document is finished
    ///
    /// # Errors
    /// Returns an error if [`Canvas::finish`] was not called.
    pub fn into_inner(self) -> io::Result<W> {
        if !self.finished {
            return Err(pdf_error("PDF document was not finished"));
        }
        Ok(self.sink)
    }

    /// Layer of the page being drawn; `None` before the first page or after finish
    fn layer(&self) -> Option<PdfLayerReference> {
        let (page, layer) = *self.pages.last()?;
        Some(self.doc.as_ref()?.get_page(page).get_layer(layer))
    }

    const fn font(&self, font: Font) -> &IndirectFontRef {
        match font {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn text_on(
        &self,
        layer: &PdfLayerReference,
        text: &str,
        x: f64,
        y: f64,
        width: f64,
        align: Align,
        style: &TextStyle,
    ) {
        let left = aligned_x(text, style, x, width, align);
        let baseline = self.size.height - (y + ASCENDER / 1000.0 * style.size);
        layer.set_fill_color(color(style.color));
        layer.use_text(
            printable(text),
            font_size(style.size),
            mm(left),
            mm(baseline),
            self.font(style.font),
        );
    }

    fn stamp_page_numbers(&self, doc: &PdfDocumentReference) {
        let total = self.pages.len();
        let (x, y, width) = footer_frame(self.size);
        for (index, &(page, layer)) in self.pages.iter().enumerate() {
            let layer = doc.get_page(page).get_layer(layer);
            let label = footer_label(index + 1, total);
            self.text_on(&layer, &label, x, y, width, Align::Center, &FOOTER_STYLE);
        }
    }
}

/// Serialize `doc` and pin its trailer `/ID` to `document_id`
fn save_document(doc: PdfDocumentReference, document_id: &str) -> io::Result<Vec<u8>> {
    let mut buffer = BufWriter::new(Cursor::new(Vec::new()));
    doc.save(&mut buffer).map_err(pdf_error)?;
    let saved = buffer.into_inner().map_err(|e| e.into_error())?.into_inner();

    let mut document = lopdf::Document::load_mem(&saved).map_err(pdf_error)?;
    let id = lopdf::Object::string_literal(document_id);
    document
        .trailer
        .set("ID", lopdf::Object::Array(vec![id.clone(), id]));

    let mut bytes = Vec::new();
    document.save_to(&mut bytes).map_err(pdf_error)?;
    Ok(bytes)
}

impl<W: Write> Canvas for PdfCanvas<W> {
    fn page_size(&self) -> PageSize {
        self.size
    }

    fn begin_page(&mut self) -> io::Result<()> {
        let next = match (self.initial.take(), self.doc.as_ref()) {
            (Some(first), _) => first,
            (None, Some(doc)) => doc.add_page(mm(self.size.width), mm(self.size.height), LAYER_NAME),
            (None, None) => return Err(pdf_error("PDF document is already finished")),
        };
        self.pages.push(next);
        Ok(())
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, fill: Rgb) {
        let Some(layer) = self.layer() else {
            return;
        };
        let bottom = self.size.height - y - height;
        layer.set_fill_color(color(fill));
        layer.add_rect(Rect::new(mm(x), mm(bottom), mm(x + width), mm(bottom + height)));
    }

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), line_width: f64, stroke: Rgb) {
        let Some(layer) = self.layer() else {
            return;
        };
        let height = self.size.height;
        layer.set_outline_color(color(stroke));
        layer.set_outline_thickness(font_size(line_width));
        layer.add_line(Line {
            points: vec![
                (Point::new(mm(from.0), mm(height - from.1)), false),
                (Point::new(mm(to.0), mm(height - to.1)), false),
            ],
            is_closed: false,
        });
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, width: f64, align: Align, style: &TextStyle) {
        if let Some(layer) = self.layer() {
            self.text_on(&layer, text, x, y, width, align, style);
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        let Some(doc) = self.doc.take() else {
            return Ok(());
        };
        if self.page_numbers {
            self.stamp_page_numbers(&doc);
        }

        let bytes = save_document(doc, &self.document_id)?;
        self.sink.write_all(&bytes)?;
        self.sink.flush()?;
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lopdf::content::Content;
    use lopdf::Object;

    fn info() -> DocumentInfo {
        DocumentInfo {
            title: "Test".to_string(),
            author: "Lab (north)".to_string(),
            created: NaiveDate::from_ymd_opt(2025, 1, 2)
                .and_then(|d| d.and_hms_opt(3, 4, 5))
                .unwrap(),
        }
    }

    fn two_pages(page_numbers: bool) -> Vec<u8> {
        let mut canvas = PdfCanvas::new(Vec::new(), PageSize::A4, info())
            .unwrap()
            .with_page_numbers(page_numbers);
        let style = TextStyle::new(Font::Bold, 10.0, Rgb(0, 0, 0));
        canvas.begin_page().unwrap();
        canvas.draw_text("one", 40.0, 40.0, 100.0, Align::Left, &style);
        canvas.stroke_line((50.0, 60.0), (545.0, 60.0), 1.0, Rgb::hex(0xcccccc));
        canvas.begin_page().unwrap();
        canvas.fill_rect(40.0, 40.0, 100.0, 20.0, Rgb::hex(0xe0e0e0));
        canvas.finish().unwrap();
        canvas.into_inner().unwrap()
    }

    /// Strings shown with `Tj`/`TJ` on each page, in page order
    fn shown_text(bytes: &[u8]) -> Vec<Vec<String>> {
        let document = lopdf::Document::load_mem(bytes).unwrap();
        document
            .get_pages()
            .values()
            .map(|&page_id| {
                let content = Content::decode(&document.get_page_content(page_id).unwrap()).unwrap();
                content
                    .operations
                    .iter()
                    .filter(|op| op.operator == "Tj" || op.operator == "TJ")
                    .flat_map(|op| op.operands.iter())
                    .flat_map(|operand| match operand {
                        Object::Array(items) => items.clone(),
                        other => vec![other.clone()],
                    })
                    .filter_map(|operand| match operand {
                        Object::String(raw, _) => Some(String::from_utf8_lossy(&raw).into_owned()),
                        _ => None,
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn document_has_one_pdf_page_per_canvas_page() {
        let bytes = two_pages(false);
        assert!(bytes.starts_with(b"%PDF-"));
        let document = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(document.get_pages().len(), 2);
    }

    #[test]
    fn text_lands_on_the_page_it_was_drawn_on() {
        let pages = shown_text(&two_pages(false));
        assert_eq!(pages.len(), 2);
        assert!(pages[0].iter().any(|text| text == "one"));
        assert!(pages[1].is_empty());
    }

    #[test]
    fn trailer_id_is_pinned_to_the_creation_time() {
        let bytes = two_pages(false);
        let document = lopdf::Document::load_mem(&bytes).unwrap();
        let ids = document.trailer.get(b"ID").unwrap().as_array().unwrap();
        for id in ids {
            assert_eq!(id.as_str().unwrap(), b"aquareport-20250102030405");
        }
        assert_eq!(two_pages(false), bytes);
    }

    #[test]
    fn page_numbers_are_stamped_on_finish() {
        let pages = shown_text(&two_pages(true));
        assert!(pages[0].iter().any(|text| text == "Page 1 of 2"));
        assert!(pages[1].iter().any(|text| text == "Page 2 of 2"));

        let plain = shown_text(&two_pages(false));
        assert!(plain.iter().flatten().all(|text| !text.starts_with("Page ")));
    }

    #[test]
    fn unfinished_document_cannot_be_taken() {
        let canvas = PdfCanvas::new(Vec::new(), PageSize::A4, info()).unwrap();
        assert!(canvas.into_inner().is_err());
    }

    #[test]
    fn finished_document_rejects_new_pages() {
        let mut canvas = PdfCanvas::new(Vec::new(), PageSize::A4, info()).unwrap();
        canvas.begin_page().unwrap();
        canvas.finish().unwrap();
        assert!(canvas.begin_page().is_err());
    }
}
