//! Table geometry for the report
//!
//! Both tables use fixed column widths and are centered horizontally. The
//! geometry depends only on the page width, never on how many rows follow.

use crate::core::models::ParameterKey;

/// Uniform page margin
pub const MARGIN: f64 = 40.0;

/// Height of every table row, header bands included
pub const ROW_HEIGHT: f64 = 20.0;

/// Width of the summary label column
pub const SUMMARY_LABEL_WIDTH: f64 = 180.0;

/// Width of each summary value column (mean, min, max)
pub const SUMMARY_VALUE_WIDTH: f64 = 90.0;

/// Width of the detail timestamp column
pub const DETAIL_TIMESTAMP_WIDTH: f64 = 140.0;

/// Detail parameter columns, left to right, with their widths
pub const DETAIL_COLUMNS: [(ParameterKey, f64); 7] = [
    (ParameterKey::Temperature, 60.0),
    (ParameterKey::Ph, 40.0),
    (ParameterKey::TotalDissolvedSolids, 60.0),
    (ParameterKey::ElectricalConductivity, 60.0),
    (ParameterKey::Resistivity, 90.0),
    (ParameterKey::Salinity, 60.0),
    (ParameterKey::Purity, 60.0),
];

/// Horizontal layout of one table
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnGeometry {
    /// Left edge of the table
    pub start_x: f64,
    /// Width of each column, left to right
    pub column_widths: Vec<f64>,
    /// Sum of all column widths
    pub table_width: f64,
}

impl ColumnGeometry {
    /// Center columns of the given widths on a page of `page_width`
    #[must_use]
    pub fn centered(column_widths: Vec<f64>, page_width: f64) -> Self {
        let table_width: f64 = column_widths.iter().sum();
        Self {
            start_x: (page_width - table_width) / 2.0,
            column_widths,
            table_width,
        }
    }

    /// `(left edge, width)` of every column, left to right
    pub fn columns(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.column_widths.iter().scan(self.start_x, |x, &width| {
            let left = *x;
            *x += width;
            Some((left, width))
        })
    }

    /// Left edge of column `index`
    #[must_use]
    pub fn column_x(&self, index: usize) -> f64 {
        self.start_x + self.column_widths.iter().take(index).sum::<f64>()
    }
}

/// Plan the summary table: one label column plus mean/min/max value columns
#[must_use]
pub fn plan_summary_layout(page_width: f64) -> ColumnGeometry {
    let mut widths = vec![SUMMARY_LABEL_WIDTH];
    widths.extend([SUMMARY_VALUE_WIDTH; 3]);
    fit_to_page(widths, page_width)
}

/// Plan the detail table: the timestamp column plus one column per parameter
///
/// On A4 the detail table is wider than the space between the margins and
/// reaches into them, but stays centered on the page.
#[must_use]
pub fn plan_detail_layout(page_width: f64) -> ColumnGeometry {
    let mut widths = vec![DETAIL_TIMESTAMP_WIDTH];
    widths.extend(DETAIL_COLUMNS.iter().map(|&(_, width)| width));
    fit_to_page(widths, page_width)
}

/// Center the columns, shrinking them proportionally to the printable width
/// only when they would not fit on the page at all
fn fit_to_page(widths: Vec<f64>, page_width: f64) -> ColumnGeometry {
    let total: f64 = widths.iter().sum();
    if total <= page_width {
        return ColumnGeometry::centered(widths, page_width);
    }
    let printable = (page_width - 2.0 * MARGIN).max(0.0);
    let scale = printable / total;
    ColumnGeometry::centered(widths.into_iter().map(|w| w * scale).collect(), page_width)
}
