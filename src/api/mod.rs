//! Remote catalog search service contract

pub mod http;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{
        filter::{CatalogBounds, FilterState, NumericRange},
        CatalogPage, InstantSearchResponse, SortOrder,
    },
};

pub use http::HttpCatalogApi;

/// Search backend consumed by the discovery client
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /search/instant?q=`
    async fn instant_search(&self, query: &str) -> AppResult<InstantSearchResponse>;

    /// `GET /catalog/filter`. `Ok(None)` means the backend answered without
    /// usable data (null or undecodable payload).
    async fn filter_catalog(&self, query: &CatalogQuery) -> AppResult<Option<CatalogPage>>;
}

/// Filter criteria sent to the catalog, independent of the page number.
/// Inactive facets are `None`/empty so they are omitted from the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub search: Option<String>,
    pub genres: Vec<String>,
    pub language: Option<String>,
    pub price_range: Option<NumericRange>,
    pub year_range: Option<NumericRange>,
    pub order: SortOrder,
}

impl CatalogFilter {
    pub fn from_state(state: &FilterState, bounds: &CatalogBounds) -> Self {
        Self {
            search: Some(state.search_query.trim().to_string()).filter(|q| !q.is_empty()),
            genres: state.genres.iter().cloned().collect(),
            language: state.language.clone(),
            price_range: state.is_price_active(bounds).then_some(state.price_range),
            year_range: state.is_year_active(bounds).then_some(state.year_range),
            order: state.sort_order,
        }
    }
}

/// One page request for a filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub filter: CatalogFilter,
    pub page: u32,
}

impl CatalogQuery {
    pub fn new(filter: CatalogFilter, page: u32) -> Self {
        Self {
            filter,
            page: page.max(1),
        }
    }

    /// Query pairs with arrays as repeated keys (`genres=A&genres=B`)
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let filter = &self.filter;
        let mut pairs = vec![("page", self.page.to_string())];

        if let Some(range) = filter.year_range {
            pairs.push(("yearRange", range.min.to_string()));
            pairs.push(("yearRange", range.max.to_string()));
        }
        if let Some(range) = filter.price_range {
            pairs.push(("priceRange", range.min.to_string()));
            pairs.push(("priceRange", range.max.to_string()));
        }
        if let Some(ref search) = filter.search {
            pairs.push(("search", search.clone()));
        }
        pairs.push(("order", filter.order.as_code().to_string()));
        for genre in &filter.genres {
            pairs.push(("genres", genre.clone()));
        }
        if let Some(ref language) = filter.language {
            pairs.push(("language", language.clone()));
        }
        pairs
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scriptable in-memory backend for timing-sensitive tests

    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::{CatalogApi, CatalogQuery};
    use crate::error::{AppError, AppResult};
    use crate::models::book::{SuggestionGroups, SuggestionText};
    use crate::models::{BookSummary, CatalogPage, InstantSearchResponse, Pagination};

    #[derive(Debug, Clone, Copy)]
    pub enum Outcome {
        Generated,
        Null,
        Fail,
    }

    pub struct FakeCatalogApi {
        pub instant_calls: Mutex<Vec<String>>,
        pub catalog_calls: Mutex<Vec<CatalogQuery>>,
        pub fail_instant: AtomicBool,
        instant_delays: Mutex<HashMap<String, Duration>>,
        catalog_script: Mutex<VecDeque<(Duration, Outcome)>>,
        total_pages: u32,
        page_size: u32,
    }

    impl FakeCatalogApi {
        pub fn new(total_pages: u32, page_size: u32) -> Self {
            Self {
                instant_calls: Mutex::new(Vec::new()),
                catalog_calls: Mutex::new(Vec::new()),
                fail_instant: AtomicBool::new(false),
                instant_delays: Mutex::new(HashMap::new()),
                catalog_script: Mutex::new(VecDeque::new()),
                total_pages,
                page_size,
            }
        }

        pub fn delay_instant(&self, query: &str, delay: Duration) {
            self.instant_delays
                .lock()
                .unwrap()
                .insert(query.to_string(), delay);
        }

        /// Queue the behaviour of the next catalog call
        pub fn script(&self, delay: Duration, outcome: Outcome) {
            self.catalog_script.lock().unwrap().push_back((delay, outcome));
        }

        pub fn instant_queries(&self) -> Vec<String> {
            self.instant_calls.lock().unwrap().clone()
        }

        pub fn catalog_queries(&self) -> Vec<CatalogQuery> {
            self.catalog_calls.lock().unwrap().clone()
        }

        pub fn page(&self, query: &CatalogQuery) -> CatalogPage {
            let tag = query.filter.search.clone().unwrap_or_else(|| "all".to_string());
            let result = (0..self.page_size)
                .map(|i| BookSummary {
                    id: format!("{}-{}-{}", tag, query.page, i),
                    title: format!("{} {}", tag, i),
                    authors: vec![],
                    description: None,
                    genres: query.filter.genres.clone(),
                    language: query.filter.language.clone(),
                    price: None,
                    published_year: None,
                    cover_url: None,
                    highlight: None,
                })
                .collect();
            CatalogPage {
                result,
                pagination: Pagination {
                    current_page: query.page,
                    total_pages: self.total_pages,
                    total_items: u64::from(self.total_pages * self.page_size),
                    page_size: self.page_size,
                },
            }
        }
    }

    #[async_trait]
    impl CatalogApi for FakeCatalogApi {
        async fn instant_search(&self, query: &str) -> AppResult<InstantSearchResponse> {
            self.instant_calls.lock().unwrap().push(query.to_string());
            let delay = self
                .instant_delays
                .lock()
                .unwrap()
                .get(query)
                .copied()
                .unwrap_or_default();
            tokio::time::sleep(delay).await;

            if self.fail_instant.load(Ordering::SeqCst) {
                return Err(AppError::Internal("connection refused".to_string()));
            }
            let text = |s: String| SuggestionText { text: s };
            Ok(InstantSearchResponse {
                suggestions: SuggestionGroups {
                    titles: vec![text(format!("{} title", query))],
                    authors: vec![text(format!("{} author", query))],
                },
                books: vec![],
            })
        }

        async fn filter_catalog(&self, query: &CatalogQuery) -> AppResult<Option<CatalogPage>> {
            self.catalog_calls.lock().unwrap().push(query.clone());
            let (delay, outcome) = self
                .catalog_script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or((Duration::ZERO, Outcome::Generated));
            tokio::time::sleep(delay).await;

            match outcome {
                Outcome::Generated => Ok(Some(self.page(query))),
                Outcome::Null => Ok(None),
                Outcome::Fail => Err(AppError::Internal("connection reset".to_string())),
            }
        }
    }
}
