//! Shared domain enums

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SortOrder
// ---------------------------------------------------------------------------

/// Result ordering requested from the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    TitleAsc,
}

impl SortOrder {
    /// Wire/URL code for this ordering
    pub fn as_code(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::PriceAsc => "price_asc",
            SortOrder::PriceDesc => "price_desc",
            SortOrder::TitleAsc => "title_asc",
        }
    }

    /// Parse a URL code; unknown codes yield `None`
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "newest" => Some(SortOrder::Newest),
            "oldest" => Some(SortOrder::Oldest),
            "price_asc" => Some(SortOrder::PriceAsc),
            "price_desc" => Some(SortOrder::PriceDesc),
            "title_asc" => Some(SortOrder::TitleAsc),
            _ => None,
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SortOrder::Newest => "Newest",
            SortOrder::Oldest => "Oldest",
            SortOrder::PriceAsc => "Price: low to high",
            SortOrder::PriceDesc => "Price: high to low",
            SortOrder::TitleAsc => "Title A-Z",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// ViewMode
// ---------------------------------------------------------------------------

/// Result list presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}
