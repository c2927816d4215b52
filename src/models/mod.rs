//! Data models for catalog discovery

pub mod book;
pub mod enums;
pub mod filter;

// Re-export commonly used types
pub use book::{BookSummary, CatalogPage, Highlight, InstantSearchResponse, Pagination};
pub use enums::{SortOrder, ViewMode};
pub use filter::{CatalogBounds, FilterState, NumericRange};
