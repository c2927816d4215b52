//! Row geometry for the virtualized result list.
//!
//! Heights start as a per-view-mode estimate and are replaced by real
//! measurements as rows get painted. Offsets are prefix sums over those
//! heights, so lookups from a scroll offset are a binary search.

use std::ops::Range;

/// What a scroll container needs from a virtualizer
pub trait ScrollLayout {
    /// Indices of rows to materialize for a scroll position, overscan included
    fn visible_range(&self, scroll_offset: f64, viewport_size: f64) -> Range<usize>;

    /// Height of the whole scrollable surface
    fn total_extent(&self) -> f64;
}

#[derive(Debug, Clone)]
pub struct RowLayout {
    estimate: f64,
    overscan: usize,
    measured: Vec<Option<f64>>,
    /// `offsets[i]` is the start of row `i`; `offsets[count]` is the total extent
    offsets: Vec<f64>,
}

impl RowLayout {
    pub fn new(count: usize, estimate: f64, overscan: usize) -> Self {
        let mut layout = Self {
            estimate: estimate.max(1.0),
            overscan,
            measured: vec![None; count],
            offsets: Vec::new(),
        };
        layout.rebuild_offsets();
        layout
    }

    pub fn count(&self) -> usize {
        self.measured.len()
    }

    pub fn estimate(&self) -> f64 {
        self.estimate
    }

    /// Grow or shrink the row count, keeping measurements of surviving rows
    pub fn set_count(&mut self, count: usize) {
        if count != self.measured.len() {
            self.measured.resize(count, None);
            self.rebuild_offsets();
        }
    }

    /// Drop every measurement, e.g. after the column count changed
    pub fn reset(&mut self, count: usize, estimate: f64) {
        self.estimate = estimate.max(1.0);
        self.measured = vec![None; count];
        self.rebuild_offsets();
    }

    pub fn forget(&mut self, index: usize) {
        if let Some(slot) = self.measured.get_mut(index) {
            if slot.take().is_some() {
                self.rebuild_offsets();
            }
        }
    }

    /// Record the real height of a painted row. Returns whether it changed.
    pub fn measure(&mut self, index: usize, size: f64) -> bool {
        if !size.is_finite() || size <= 0.0 {
            return false;
        }
        match self.measured.get_mut(index) {
            Some(slot) if *slot != Some(size) => {
                *slot = Some(size);
                self.rebuild_offsets();
                true
            }
            _ => false,
        }
    }

    pub fn row_size(&self, index: usize) -> f64 {
        self.measured
            .get(index)
            .copied()
            .flatten()
            .unwrap_or(self.estimate)
    }

    pub fn row_offset(&self, index: usize) -> f64 {
        self.offsets.get(index).copied().unwrap_or_else(|| self.total_extent())
    }

    fn rebuild_offsets(&mut self) {
        self.offsets.clear();
        self.offsets.reserve(self.measured.len() + 1);
        let mut acc = 0.0;
        self.offsets.push(acc);
        for slot in &self.measured {
            acc += slot.unwrap_or(self.estimate);
            self.offsets.push(acc);
        }
    }
}

impl ScrollLayout for RowLayout {
    fn visible_range(&self, scroll_offset: f64, viewport_size: f64) -> Range<usize> {
        let count = self.count();
        if count == 0 || viewport_size <= 0.0 {
            return 0..0;
        }
        let top = scroll_offset.max(0.0);
        let bottom = top + viewport_size;

        // first row whose end lies below the top edge
        let first = self.offsets[1..].partition_point(|end| *end <= top).min(count - 1);
        // rows starting above the bottom edge
        let last = self.offsets[..count].partition_point(|start| *start < bottom).max(first + 1);

        first.saturating_sub(self.overscan)..(last + self.overscan).min(count)
    }

    fn total_extent(&self) -> f64 {
        self.offsets.last().copied().unwrap_or(0.0)
    }
}
