//! Grouping of the flat result buffer into rows of `cols` items

use std::ops::Range;

use crate::models::ViewMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    /// Index range into the flat item buffer
    Items(Range<usize>),
    /// Synthetic last row hosting the loading indicator
    Sentinel,
}

/// A materialized virtual row
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualRow {
    pub index: usize,
    pub kind: RowKind,
    pub offset: f64,
    pub size: f64,
}

impl VirtualRow {
    pub fn is_sentinel(&self) -> bool {
        matches!(self.kind, RowKind::Sentinel)
    }
}

/// `ceil(len / cols)`
pub fn row_count(len: usize, cols: usize) -> usize {
    len.div_ceil(cols.max(1))
}

/// Items of row `index`; the last row may be short
pub fn row_bounds(index: usize, len: usize, cols: usize) -> Range<usize> {
    let cols = cols.max(1);
    let start = (index * cols).min(len);
    start..(start + cols).min(len)
}

pub fn partition_rows<T>(items: &[T], cols: usize) -> Vec<&[T]> {
    items.chunks(cols.max(1)).collect()
}

/// Column count for a view mode at a viewport width.
/// `breakpoints` are the minimum widths for 3 and 4 grid columns.
pub fn columns_for(view_mode: ViewMode, viewport_width: f64, breakpoints: [f64; 2]) -> usize {
    match view_mode {
        ViewMode::List => 1,
        ViewMode::Grid if viewport_width >= breakpoints[1] => 4,
        ViewMode::Grid if viewport_width >= breakpoints[0] => 3,
        ViewMode::Grid => 2,
    }
}
