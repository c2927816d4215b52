//! Faceted filter state for a catalog view.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::enums::SortOrder;

/// Inclusive `[min, max]` integer range used for prices and publication years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: i64,
    pub max: i64,
}

impl NumericRange {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Endpoints in ascending order
    pub fn ordered(self) -> Self {
        if self.min <= self.max {
            self
        } else {
            Self::new(self.max, self.min)
        }
    }

    /// Clamp both endpoints into `bounds`, swapping them if inverted.
    pub fn normalized(self, bounds: NumericRange) -> Self {
        let bounds = bounds.ordered();
        let NumericRange { min: lo, max: hi } = self.ordered();
        Self {
            min: lo.clamp(bounds.min, bounds.max),
            max: hi.clamp(bounds.min, bounds.max),
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }
}

impl From<(i64, i64)> for NumericRange {
    fn from((min, max): (i64, i64)) -> Self {
        Self { min, max }
    }
}

/// Catalog-wide constants that the slider ranges live within
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogBounds {
    pub price: NumericRange,
    pub year: NumericRange,
}

/// The single authoritative filter state of a catalog view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub genres: BTreeSet<String>,
    pub language: Option<String>,
    pub price_range: NumericRange,
    pub year_range: NumericRange,
    pub search_query: String,
    pub sort_order: SortOrder,
}

impl FilterState {
    /// State with every field at its bound or default
    pub fn defaults(bounds: &CatalogBounds) -> Self {
        Self {
            genres: BTreeSet::new(),
            language: None,
            price_range: bounds.price,
            year_range: bounds.year,
            search_query: String::new(),
            sort_order: SortOrder::default(),
        }
    }

    pub fn is_price_active(&self, bounds: &CatalogBounds) -> bool {
        self.price_range != bounds.price
    }

    pub fn is_year_active(&self, bounds: &CatalogBounds) -> bool {
        self.year_range != bounds.year
    }

    /// Number of facets that differ from their default, for filter badges.
    /// Each selected genre counts once; the free-text query is not a facet.
    pub fn active_filter_count(&self, bounds: &CatalogBounds) -> usize {
        self.genres.len()
            + usize::from(self.language.is_some())
            + usize::from(self.is_price_active(bounds))
            + usize::from(self.is_year_active(bounds))
    }

    /// True when nothing differs from the defaults
    pub fn is_pristine(&self, bounds: &CatalogBounds) -> bool {
        *self == Self::defaults(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> CatalogBounds {
        CatalogBounds {
            price: NumericRange::new(0, 2_000_000),
            year: NumericRange::new(1900, 2025),
        }
    }

    #[test]
    fn test_normalized_clamps_and_swaps() {
        let b = bounds().price;
        assert_eq!(NumericRange::new(-5, 3_000_000).normalized(b), b);
        assert_eq!(
            NumericRange::new(900, 100).normalized(b),
            NumericRange::new(100, 900)
        );
        assert_eq!(
            NumericRange::new(2_500_000, 2_600_000).normalized(b),
            NumericRange::new(2_000_000, 2_000_000)
        );
    }

    #[test]
    fn test_active_flags() {
        let b = bounds();
        let mut state = FilterState::defaults(&b);
        assert!(state.is_pristine(&b));
        assert_eq!(state.active_filter_count(&b), 0);

        state.price_range = NumericRange::new(300_000, 2_000_000);
        state.genres.insert("Fiction".to_string());
        state.genres.insert("Poetry".to_string());
        assert!(state.is_price_active(&b));
        assert!(!state.is_year_active(&b));
        assert_eq!(state.active_filter_count(&b), 3);

        state.search_query = "dune".to_string();
        assert_eq!(state.active_filter_count(&b), 3);
    }
}
