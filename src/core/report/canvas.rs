//! Drawing surface abstraction
//!
//! Coordinates are in points with the origin at the top-left corner of the
//! page and `y` growing downwards. Text is positioned by the top of its line
//! box. Backends translate to their own coordinate system.

use super::fonts::{self, Font};
use std::io;

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    /// Page width
    pub width: f64,
    /// Page height
    pub height: f64,
}

impl PageSize {
    /// ISO A4 portrait
    pub const A4: Self = Self {
        width: 595.28,
        height: 841.89,
    };
}

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Build a color from a `0xRRGGBB` literal
    #[must_use]
    pub const fn hex(value: u32) -> Self {
        Self(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        )
    }
}

/// Horizontal alignment of text inside its frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// Flush left
    Left,
    /// Centered
    Center,
    /// Flush right
    Right,
}

/// Font, size and color of a text run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font face
    pub font: Font,
    /// Size in points
    pub size: f64,
    /// Fill color
    pub color: Rgb,
}

impl TextStyle {
    /// Create a text style
    #[must_use]
    pub const fn new(font: Font, size: f64, color: Rgb) -> Self {
        Self { font, size, color }
    }
}

/// Resolve the left edge of `text` aligned within a frame starting at `x`
#[must_use]
pub fn aligned_x(text: &str, style: &TextStyle, x: f64, width: f64, align: Align) -> f64 {
    let text_width = fonts::text_width(text, style.font, style.size);
    match align {
        Align::Left => x,
        Align::Center => x + (width - text_width) / 2.0,
        Align::Right => x + width - text_width,
    }
}

/// Style of the `Page N of M` footer
pub const FOOTER_STYLE: TextStyle = TextStyle::new(Font::Regular, 8.0, Rgb::hex(0x66_66_66));

/// Distance of the footer line box from the bottom edge
const FOOTER_OFFSET: f64 = 30.0;
/// Horizontal inset of the footer frame
const FOOTER_INSET: f64 = 50.0;

/// Footer text for page `page` (1-based) of `total`
#[must_use]
pub fn footer_label(page: usize, total: usize) -> String {
    format!("Page {page} of {total}")
}

/// Frame of the footer as `(x, y, width)`; the label is centered in it
#[must_use]
pub fn footer_frame(size: PageSize) -> (f64, f64, f64) {
    (
        FOOTER_INSET,
        size.height - FOOTER_OFFSET,
        size.width - 2.0 * FOOTER_INSET,
    )
}

/// A paginated drawing surface
pub trait Canvas {
    /// Size of every page
    fn page_size(&self) -> PageSize;

    /// Start a new page. The first call opens page 1.
    ///
    /// # Errors
    /// Backends that allocate pages report failures here.
    fn begin_page(&mut self) -> io::Result<()>;

    /// Fill a rectangle whose top-left corner is at (`x`, `y`)
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb);

    /// Stroke a straight line
    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), line_width: f64, color: Rgb);

    /// Draw a single line of text aligned within `[x, x + width]`, top at `y`
    fn draw_text(&mut self, text: &str, x: f64, y: f64, width: f64, align: Align, style: &TextStyle);

    /// Complete the document. Backends with page numbering enabled stamp the
    /// footer on every page here, once the page count is known.
    ///
    /// # Errors
    /// Reports failures writing the output.
    fn finish(&mut self) -> io::Result<()>;
}

/// One recorded drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// A page was started
    BeginPage,
    /// A filled rectangle
    Rect {
        /// Left edge
        x: f64,
        /// Top edge
        y: f64,
        /// Width
        width: f64,
        /// Height
        height: f64,
        /// Fill color
        color: Rgb,
    },
    /// A stroked line
    Line {
        /// Start point
        from: (f64, f64),
        /// End point
        to: (f64, f64),
    },
    /// A text run, with its alignment already resolved
    Text {
        /// Text content
        text: String,
        /// Resolved left edge
        x: f64,
        /// Top of the line box
        y: f64,
        /// Font face
        font: Font,
        /// Size in points
        size: f64,
    },
}

/// Canvas that keeps every operation in memory, grouped by page.
///
/// Used to plan a layout without producing a document (`--dry-run`) and to
/// inspect pagination in tests.
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    size: PageSize,
    pages: Vec<Vec<DrawOp>>,
    page_numbers: bool,
    finished: bool,
}

impl RecordingCanvas {
    /// Create an empty recorder for pages of `size`
    #[must_use]
    pub const fn new(size: PageSize) -> Self {
        Self {
            size,
            pages: Vec::new(),
            page_numbers: false,
            finished: false,
        }
    }

    /// Record the `Page N of M` footer on every page at finish
    #[must_use]
    pub const fn with_page_numbers(mut self, enabled: bool) -> Self {
        self.page_numbers = enabled;
        self
    }

    /// Operations drawn on each page, in order
    #[must_use]
    pub fn pages(&self) -> &[Vec<DrawOp>] {
        &self.pages
    }

    /// Number of pages started
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whether [`Canvas::finish`] was called
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Text runs on one page, in drawing order
    pub fn texts_on_page(&self, page: usize) -> impl Iterator<Item = (&str, f64, f64)> + '_ {
        self.pages.get(page).into_iter().flatten().filter_map(|op| match op {
            DrawOp::Text { text, x, y, .. } => Some((text.as_str(), *x, *y)),
            _ => None,
        })
    }

    fn current(&mut self) -> &mut Vec<DrawOp> {
        if self.pages.is_empty() {
            self.pages.push(vec![DrawOp::BeginPage]);
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }
}

impl Canvas for RecordingCanvas {
    fn page_size(&self) -> PageSize {
        self.size
    }

    fn begin_page(&mut self) -> io::Result<()> {
        self.pages.push(vec![DrawOp::BeginPage]);
        Ok(())
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb) {
        self.current().push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), _line_width: f64, _color: Rgb) {
        self.current().push(DrawOp::Line { from, to });
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, width: f64, align: Align, style: &TextStyle) {
        let x = aligned_x(text, style, x, width, align);
        self.current().push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            font: style.font,
            size: style.size,
        });
    }

    fn finish(&mut self) -> io::Result<()> {
        if self.finished {
            return Ok(());
        }
        if self.page_numbers {
            let total = self.pages.len();
            let (x, y, width) = footer_frame(self.size);
            for (index, page) in self.pages.iter_mut().enumerate() {
                let label = footer_label(index + 1, total);
                page.push(DrawOp::Text {
                    x: aligned_x(&label, &FOOTER_STYLE, x, width, Align::Center),
                    text: label,
                    y,
                    font: FOOTER_STYLE.font,
                    size: FOOTER_STYLE.size,
                });
            }
        }
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_split_into_channels() {
        assert_eq!(Rgb::hex(0x0066cc), Rgb(0x00, 0x66, 0xcc));
        assert_eq!(Rgb::hex(0xe0e0e0), Rgb(224, 224, 224));
    }

    #[test]
    fn alignment_places_text_inside_frame() {
        let style = TextStyle::new(Font::Regular, 10.0, Rgb(0, 0, 0));
        // "00" is 11.12pt wide at 10pt
        assert!((aligned_x("00", &style, 100.0, 90.0, Align::Left) - 100.0).abs() < 1e-9);
        assert!((aligned_x("00", &style, 100.0, 90.0, Align::Center) - 139.44).abs() < 1e-9);
        assert!((aligned_x("00", &style, 100.0, 90.0, Align::Right) - 178.88).abs() < 1e-9);
    }

    #[test]
    fn recorder_groups_operations_by_page() {
        let mut canvas = RecordingCanvas::new(PageSize::A4);
        let style = TextStyle::new(Font::Bold, 9.0, Rgb(0, 0, 0));
        canvas.begin_page().unwrap();
        canvas.draw_text("first", 0.0, 10.0, 100.0, Align::Left, &style);
        canvas.begin_page().unwrap();
        canvas.fill_rect(0.0, 0.0, 10.0, 10.0, Rgb(1, 2, 3));
        canvas.draw_text("second", 0.0, 20.0, 100.0, Align::Left, &style);
        canvas.finish().unwrap();

        assert_eq!(canvas.page_count(), 2);
        assert!(canvas.is_finished());
        let second: Vec<_> = canvas.texts_on_page(1).map(|(t, _, _)| t).collect();
        assert_eq!(second, vec!["second"]);
    }

    #[test]
    fn footers_are_stamped_once_the_count_is_known() {
        let mut canvas = RecordingCanvas::new(PageSize::A4).with_page_numbers(true);
        canvas.begin_page().unwrap();
        canvas.begin_page().unwrap();
        canvas.finish().unwrap();
        canvas.finish().unwrap();

        let footers: Vec<_> = (0..2)
            .flat_map(|page| canvas.texts_on_page(page).map(|(t, _, y)| (t.to_string(), y)))
            .collect();
        let y = PageSize::A4.height - 30.0;
        assert_eq!(
            footers,
            vec![("Page 1 of 2".to_string(), y), ("Page 2 of 2".to_string(), y)]
        );
    }
}
