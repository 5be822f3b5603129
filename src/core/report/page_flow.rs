//! Vertical page flow for streamed table rows
//!
//! The controller owns the cursor for one document. Before each row the
//! renderer asks for space; when the row would cross the bottom margin the
//! controller opens a new page, redraws the table header at the top margin and
//! moves the cursor below it. The cursor only ever moves forward.

use super::canvas::Canvas;
use std::io;

/// Position of the drawing cursor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCursor {
    /// Distance from the top edge of the current page
    pub y: f64,
    /// Zero-based index of the current page
    pub page_index: usize,
}

/// Outcome of [`PageFlowController::ensure_space_for_row`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpace {
    /// Whether a new page (with a fresh header) was started for this row
    pub page_break_occurred: bool,
}

/// A band redrawn at the top of every continuation page
pub trait RepeatingHeader {
    /// Height of the band
    fn height(&self) -> f64;

    /// Draw the band with its top edge at `y`
    fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C, y: f64);
}

/// Tracks the cursor across pages for a single report
#[derive(Debug)]
pub struct PageFlowController {
    cursor: PageCursor,
    top_margin: f64,
}

impl PageFlowController {
    /// Open page 1 on `canvas` and place the cursor at `top_margin`
    ///
    /// # Errors
    /// Propagates canvas failures opening the first page.
    pub fn begin_document<C: Canvas + ?Sized>(canvas: &mut C, top_margin: f64) -> io::Result<Self> {
        canvas.begin_page()?;
        Ok(Self {
            cursor: PageCursor {
                y: top_margin,
                page_index: 0,
            },
            top_margin,
        })
    }

    /// Current cursor
    #[must_use]
    pub const fn cursor(&self) -> PageCursor {
        self.cursor
    }

    /// Current vertical position
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.cursor.y
    }

    /// Number of pages opened so far
    #[must_use]
    pub const fn page_count(&self) -> usize {
        self.cursor.page_index + 1
    }

    /// Make sure a row of `row_height` fits above the bottom margin.
    ///
    /// If it does not, a new page is opened, `header` is drawn at the top
    /// margin and the cursor is moved just below it. A row taller than the
    /// printable area still gets exactly one break and is then drawn at the top
    /// of the new page; rows are never split.
    ///
    /// # Errors
    /// Propagates canvas failures opening the new page.
    pub fn ensure_space_for_row<C, H>(
        &mut self,
        canvas: &mut C,
        header: &H,
        row_height: f64,
        bottom_margin: f64,
        page_height: f64,
    ) -> io::Result<RowSpace>
    where
        C: Canvas + ?Sized,
        H: RepeatingHeader,
    {
        if self.cursor.y + row_height <= page_height - bottom_margin {
            return Ok(RowSpace {
                page_break_occurred: false,
            });
        }

        self.break_page(canvas)?;
        header.draw(canvas, self.cursor.y);
        self.advance(header.height());

        Ok(RowSpace {
            page_break_occurred: true,
        })
    }

    /// Make sure a block of `height` (a title, a rule, a table head kept with
    /// its first row) fits above the bottom margin.
    ///
    /// Unlike [`ensure_space_for_row`](Self::ensure_space_for_row) no header is
    /// drawn on the new page, and a block already sitting at the top margin is
    /// drawn where it is.
    ///
    /// # Errors
    /// Propagates canvas failures opening the new page.
    pub fn ensure_space<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        height: f64,
        bottom_margin: f64,
        page_height: f64,
    ) -> io::Result<RowSpace> {
        let fits = self.cursor.y + height <= page_height - bottom_margin;
        if fits || self.cursor.y <= self.top_margin {
            return Ok(RowSpace {
                page_break_occurred: false,
            });
        }

        self.break_page(canvas)?;
        Ok(RowSpace {
            page_break_occurred: true,
        })
    }

    fn break_page<C: Canvas + ?Sized>(&mut self, canvas: &mut C) -> io::Result<()> {
        canvas.begin_page()?;
        self.cursor = PageCursor {
            y: self.top_margin,
            page_index: self.cursor.page_index + 1,
        };
        Ok(())
    }

    /// Move the cursor down by `height`
    pub fn advance(&mut self, height: f64) {
        self.cursor.y += height;
    }
}
