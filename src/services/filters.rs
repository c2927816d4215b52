//! Filter state store and its two-way sync with the URL query string.
//!
//! Only active fields (those differing from their bound or default) are
//! written to the URL. Keys of fields that become inactive are removed, and
//! keys owned by other components are left alone.

use crate::{
    api::CatalogFilter,
    location::{Location, QueryParams},
    models::{CatalogBounds, FilterState, NumericRange, SortOrder},
};

pub const PARAM_QUERY: &str = "q";
pub const PARAM_GENRES: &str = "genres";
pub const PARAM_LANGUAGE: &str = "lang";
pub const PARAM_MIN_PRICE: &str = "minPrice";
pub const PARAM_MAX_PRICE: &str = "maxPrice";
pub const PARAM_MIN_YEAR: &str = "minYear";
pub const PARAM_MAX_YEAR: &str = "maxYear";
pub const PARAM_SORT: &str = "sort";
pub const PARAM_PAGE: &str = "page";

/// URL keys written by the store
pub const OWNED_KEYS: [&str; 9] = [
    PARAM_QUERY,
    PARAM_GENRES,
    PARAM_LANGUAGE,
    PARAM_MIN_PRICE,
    PARAM_MAX_PRICE,
    PARAM_MIN_YEAR,
    PARAM_MAX_YEAR,
    PARAM_SORT,
    PARAM_PAGE,
];

/// Canonical URL parameters for a state. Inactive fields produce no key.
pub fn encode_params(state: &FilterState, bounds: &CatalogBounds, page: u32) -> QueryParams {
    let mut params = QueryParams::new();

    let query = state.search_query.trim();
    if !query.is_empty() {
        params.insert(PARAM_QUERY.to_string(), query.to_string());
    }
    if !state.genres.is_empty() {
        let joined = state.genres.iter().map(String::as_str).collect::<Vec<_>>().join(",");
        params.insert(PARAM_GENRES.to_string(), joined);
    }
    if let Some(ref lang) = state.language {
        params.insert(PARAM_LANGUAGE.to_string(), lang.clone());
    }

    encode_range(&mut params, state.price_range, bounds.price, PARAM_MIN_PRICE, PARAM_MAX_PRICE);
    encode_range(&mut params, state.year_range, bounds.year, PARAM_MIN_YEAR, PARAM_MAX_YEAR);

    if state.sort_order != SortOrder::default() {
        params.insert(PARAM_SORT.to_string(), state.sort_order.as_code().to_string());
    }
    if page > 1 {
        params.insert(PARAM_PAGE.to_string(), page.to_string());
    }
    params
}

fn encode_range(
    params: &mut QueryParams,
    range: NumericRange,
    bounds: NumericRange,
    min_key: &str,
    max_key: &str,
) {
    if range.min != bounds.min {
        params.insert(min_key.to_string(), range.min.to_string());
    }
    if range.max != bounds.max {
        params.insert(max_key.to_string(), range.max.to_string());
    }
}

/// Parse URL parameters into a state and page. Missing or malformed values
/// fall back to their default; out-of-range values are clamped.
pub fn decode_params(params: &QueryParams, bounds: &CatalogBounds) -> (FilterState, u32) {
    let mut state = FilterState::defaults(bounds);

    if let Some(q) = params.get(PARAM_QUERY) {
        state.search_query = q.trim().to_string();
    }
    if let Some(genres) = params.get(PARAM_GENRES) {
        state.genres = genres
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect();
    }
    state.language = params
        .get(PARAM_LANGUAGE)
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string);

    state.price_range = decode_range(params, bounds.price, PARAM_MIN_PRICE, PARAM_MAX_PRICE);
    state.year_range = decode_range(params, bounds.year, PARAM_MIN_YEAR, PARAM_MAX_YEAR);

    state.sort_order = params
        .get(PARAM_SORT)
        .and_then(|s| SortOrder::from_code(s.trim()))
        .unwrap_or_default();

    let page = params
        .get(PARAM_PAGE)
        .and_then(|p| p.trim().parse::<u32>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1);

    (state, page)
}

fn decode_range(params: &QueryParams, bounds: NumericRange, min_key: &str, max_key: &str) -> NumericRange {
    let min = params.get(min_key).and_then(|v| parse_integer(v)).unwrap_or(bounds.min);
    let max = params.get(max_key).and_then(|v| parse_integer(v)).unwrap_or(bounds.max);
    NumericRange::new(min, max).normalized(bounds)
}

fn parse_integer(raw: &str) -> Option<i64> {
    let parsed = raw.trim().parse::<i64>().ok();
    if parsed.is_none() {
        tracing::debug!("Ignoring malformed numeric parameter: {:?}", raw);
    }
    parsed
}

/// Holds the filter state of one catalog view and mirrors it into the URL
pub struct FilterStateStore {
    state: FilterState,
    bounds: CatalogBounds,
    current_page: u32,
    revision: u64,
    location: Location,
}

impl FilterStateStore {
    /// Build the store from whatever the URL currently says
    pub fn hydrate(location: Location, bounds: CatalogBounds) -> Self {
        let (state, current_page) = decode_params(&location.params(), &bounds);
        tracing::debug!(
            "Hydrated filters: {} active facet(s), page {}",
            state.active_filter_count(&bounds),
            current_page
        );
        Self {
            state,
            bounds,
            current_page,
            revision: 0,
            location,
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn bounds(&self) -> &CatalogBounds {
        &self.bounds
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Incremented on every filter change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn criteria(&self) -> CatalogFilter {
        CatalogFilter::from_state(&self.state, &self.bounds)
    }

    pub fn active_filter_count(&self) -> usize {
        self.state.active_filter_count(&self.bounds)
    }

    /// Add or remove a genre. Names containing a comma cannot round-trip
    /// through the comma-joined URL value and are rejected.
    pub fn toggle_genre(&mut self, name: &str, checked: bool) -> bool {
        let name = name.trim();
        if name.is_empty() || name.contains(',') {
            tracing::debug!("Rejected genre name {:?}", name);
            return false;
        }
        let mut next = self.state.clone();
        if checked {
            next.genres.insert(name.to_string());
        } else {
            next.genres.remove(name);
        }
        self.commit(next)
    }

    pub fn set_language(&mut self, language: Option<&str>) -> bool {
        let mut next = self.state.clone();
        next.language = language.map(str::trim).filter(|l| !l.is_empty()).map(str::to_string);
        self.commit(next)
    }

    pub fn set_price_range(&mut self, range: NumericRange) -> bool {
        let mut next = self.state.clone();
        next.price_range = range.normalized(self.bounds.price);
        self.commit(next)
    }

    pub fn set_year_range(&mut self, range: NumericRange) -> bool {
        let mut next = self.state.clone();
        next.year_range = range.normalized(self.bounds.year);
        self.commit(next)
    }

    pub fn set_search_query(&mut self, query: &str) -> bool {
        let mut next = self.state.clone();
        next.search_query = query.trim().to_string();
        self.commit(next)
    }

    pub fn set_sort(&mut self, order: SortOrder) -> bool {
        let mut next = self.state.clone();
        next.sort_order = order;
        self.commit(next)
    }

    /// Move to another page without touching the filters
    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        if page == self.current_page {
            return false;
        }
        self.current_page = page;
        self.sync_url();
        true
    }

    /// Restore every field to its bound or default
    pub fn reset(&mut self) -> bool {
        self.commit(FilterState::defaults(&self.bounds))
    }

    /// Re-read the URL after external navigation (back/forward). Does not
    /// write to the URL. Returns whether the filters changed.
    pub fn rehydrate(&mut self) -> bool {
        let (state, page) = decode_params(&self.location.params(), &self.bounds);
        self.current_page = page;
        if state == self.state {
            return false;
        }
        self.state = state;
        self.revision += 1;
        true
    }

    fn commit(&mut self, next: FilterState) -> bool {
        if next == self.state {
            return false;
        }
        self.state = next;
        self.current_page = 1;
        self.revision += 1;
        self.sync_url();
        true
    }

    fn sync_url(&self) -> bool {
        let params = encode_params(&self.state, &self.bounds, self.current_page);
        self.location.merge(&OWNED_KEYS, &params)
    }
}
