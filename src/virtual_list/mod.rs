//! Virtualized, infinitely scrolling result list.
//!
//! The renderer groups the flat result buffer into rows of `cols` items,
//! appends a sentinel row while more pages exist, and only materializes
//! rows near the viewport. When the sentinel comes into view it asks for
//! the next page once, and stays quiet until that fetch completes or the
//! sentinel leaves the viewport.

pub mod layout;
pub mod rows;

use std::sync::Arc;

use crate::{config::ListConfig, models::{BookSummary, ViewMode}};

pub use layout::{RowLayout, ScrollLayout};
pub use rows::{columns_for, partition_rows, row_bounds, row_count, RowKind, VirtualRow};

#[derive(Debug, Clone, PartialEq)]
pub struct RowsFrame {
    pub rows: Vec<VirtualRow>,
    pub total_extent: f64,
    /// The caller should start fetching the next page
    pub fetch_next_page: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderFrame {
    /// No items yet and a fetch is in progress
    Loading,
    /// No items and nothing pending
    Empty,
    Rows(RowsFrame),
}

pub struct VirtualizedListRenderer {
    config: ListConfig,
    view_mode: ViewMode,
    viewport_width: f64,
    cols: usize,
    items: Arc<Vec<BookSummary>>,
    has_next_page: bool,
    is_fetching_next_page: bool,
    is_loading: bool,
    layout: RowLayout,
    trigger_armed: bool,
}

impl VirtualizedListRenderer {
    pub fn new(config: ListConfig, view_mode: ViewMode, viewport_width: f64) -> Self {
        let cols = columns_for(view_mode, viewport_width, config.grid_breakpoints);
        let estimate = row_estimate(&config, view_mode);
        let layout = RowLayout::new(0, estimate, config.overscan);
        Self {
            config,
            view_mode,
            viewport_width,
            cols,
            items: Arc::new(Vec::new()),
            has_next_page: false,
            is_fetching_next_page: false,
            is_loading: false,
            layout,
            trigger_armed: true,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn items(&self) -> &[BookSummary] {
        &self.items
    }

    pub fn row_count(&self) -> usize {
        row_count(self.items.len(), self.cols)
    }

    /// Rows plus the sentinel when another page exists
    pub fn virtual_count(&self) -> usize {
        self.row_count() + usize::from(self.has_next_page)
    }

    pub fn rows(&self) -> Vec<&[BookSummary]> {
        partition_rows(&self.items, self.cols)
    }

    pub fn items_in(&self, row: &VirtualRow) -> &[BookSummary] {
        match row.kind {
            RowKind::Items(ref range) => self.items.get(range.clone()).unwrap_or(&[]),
            RowKind::Sentinel => &[],
        }
    }

    pub fn layout(&self) -> &RowLayout {
        &self.layout
    }

    pub fn set_viewport_width(&mut self, width: f64) -> bool {
        self.viewport_width = width;
        self.apply_columns()
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) -> bool {
        if view_mode == self.view_mode {
            return false;
        }
        self.view_mode = view_mode;
        if !self.apply_columns() {
            // same column count but a different row height estimate
            let estimate = row_estimate(&self.config, view_mode);
            self.layout.reset(self.virtual_count(), estimate);
        }
        true
    }

    /// Row membership is not stable across column counts: recompute everything.
    fn apply_columns(&mut self) -> bool {
        let cols = columns_for(self.view_mode, self.viewport_width, self.config.grid_breakpoints);
        if cols == self.cols {
            return false;
        }
        tracing::debug!("Result list columns {} -> {}", self.cols, cols);
        self.cols = cols;
        let estimate = row_estimate(&self.config, self.view_mode);
        self.layout.reset(self.virtual_count(), estimate);
        true
    }

    pub fn set_items(&mut self, items: Arc<Vec<BookSummary>>) {
        if Arc::ptr_eq(&items, &self.items) {
            return;
        }
        let old_rows = self.row_count();
        let appended = items.len() >= self.items.len()
            && self.items.iter().zip(items.iter()).all(|(a, b)| a.id == b.id);
        let grew = items.len() != self.items.len();
        self.items = items;

        if appended {
            // the old short last row and the old sentinel slot may change height
            self.layout.forget(old_rows.saturating_sub(1));
            self.layout.forget(old_rows);
            self.layout.set_count(self.virtual_count());
        } else {
            let estimate = row_estimate(&self.config, self.view_mode);
            self.layout.reset(self.virtual_count(), estimate);
        }
        if grew || !appended {
            self.trigger_armed = true;
        }
    }

    pub fn set_paging(&mut self, has_next_page: bool, is_fetching_next_page: bool, is_loading: bool) {
        if self.is_fetching_next_page && !is_fetching_next_page {
            self.trigger_armed = true;
        }
        self.has_next_page = has_next_page;
        self.is_fetching_next_page = is_fetching_next_page;
        self.is_loading = is_loading;
        self.layout.set_count(self.virtual_count());
    }

    pub fn measure_row(&mut self, index: usize, size: f64) -> bool {
        self.layout.measure(index, size)
    }

    pub fn render(&mut self, scroll_offset: f64, viewport_height: f64) -> RenderFrame {
        if self.items.is_empty() {
            return if self.is_loading || self.is_fetching_next_page {
                RenderFrame::Loading
            } else {
                RenderFrame::Empty
            };
        }

        let len = self.items.len();
        let real_rows = self.row_count();
        let range = self.layout.visible_range(scroll_offset, viewport_height);

        let rows: Vec<VirtualRow> = range
            .clone()
            .map(|index| VirtualRow {
                index,
                kind: if index < real_rows {
                    RowKind::Items(row_bounds(index, len, self.cols))
                } else {
                    RowKind::Sentinel
                },
                offset: self.layout.row_offset(index),
                size: self.layout.row_size(index),
            })
            .collect();

        let sentinel_visible = self.has_next_page && range.end > real_rows;
        let fetch_next_page = if sentinel_visible {
            let fire = self.trigger_armed && !self.is_fetching_next_page && !self.is_loading;
            if fire {
                self.trigger_armed = false;
                tracing::debug!("Sentinel visible, requesting next page");
            }
            fire
        } else {
            self.trigger_armed = true;
            false
        };

        RenderFrame::Rows(RowsFrame {
            rows,
            total_extent: self.layout.total_extent(),
            fetch_next_page,
        })
    }
}

fn row_estimate(config: &ListConfig, view_mode: ViewMode) -> f64 {
    match view_mode {
        ViewMode::List => config.list_row_estimate,
        ViewMode::Grid => config.grid_row_estimate,
    }
}
