//! Catalog result fetching for paginated and infinite-scroll views

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    api::{CatalogApi, CatalogFilter, CatalogQuery},
    config::FetchMode,
    error::AppError,
    models::{BookSummary, Pagination},
};

/// Lightweight user-visible message for a recoverable failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub detail: String,
}

impl From<&AppError> for Notice {
    fn from(err: &AppError) -> Self {
        Self {
            message: err.user_message(),
            detail: err.to_string(),
        }
    }
}

/// What happened to a fetch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was applied to the buffer
    Applied { received: usize },
    /// A newer request or a filter change superseded this one
    Discarded,
    /// Nothing to do (no next page, or one already in flight)
    Skipped,
    /// Transport failure; the previous buffer is kept
    Failed(Notice),
}

#[derive(Debug, Clone, Copy)]
enum PageTarget {
    Page(u32),
    /// The page after the last one received, decided under the lock
    Next,
}

#[derive(Debug)]
struct FetcherInner {
    filter: CatalogFilter,
    generation: u64,
    items: Arc<Vec<BookSummary>>,
    pagination: Pagination,
    /// No response received yet for the current filter
    pristine: bool,
    loading: bool,
    fetching_next: bool,
    last_error: Option<Notice>,
}

/// Fetches pages of results for the current filter. Cloning shares state.
#[derive(Clone)]
pub struct ResultFetcher {
    api: Arc<dyn CatalogApi>,
    mode: FetchMode,
    inner: Arc<Mutex<FetcherInner>>,
}

impl ResultFetcher {
    pub fn new(api: Arc<dyn CatalogApi>, mode: FetchMode, filter: CatalogFilter) -> Self {
        Self {
            api,
            mode,
            inner: Arc::new(Mutex::new(FetcherInner {
                filter,
                generation: 0,
                items: Arc::new(Vec::new()),
                pagination: Pagination::default(),
                pristine: true,
                loading: false,
                fetching_next: false,
                last_error: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FetcherInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    pub fn items(&self) -> Arc<Vec<BookSummary>> {
        Arc::clone(&self.lock().items)
    }

    pub fn pagination(&self) -> Pagination {
        self.lock().pagination
    }

    pub fn filter(&self) -> CatalogFilter {
        self.lock().filter.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn is_fetching_next_page(&self) -> bool {
        self.lock().fetching_next
    }

    pub fn has_next_page(&self) -> bool {
        let inner = self.lock();
        !inner.pristine && inner.pagination.has_next_page()
    }

    pub fn last_error(&self) -> Option<Notice> {
        self.lock().last_error.clone()
    }

    /// Switch to a new filter. Resets to page 1, drops the accumulated
    /// buffer in infinite mode and invalidates in-flight requests.
    pub fn set_criteria(&self, filter: CatalogFilter) -> bool {
        let mut inner = self.lock();
        if inner.filter == filter {
            return false;
        }
        inner.filter = filter;
        inner.generation += 1;
        inner.pagination.current_page = 1;
        inner.pristine = true;
        inner.loading = false;
        inner.fetching_next = false;
        if self.mode == FetchMode::Infinite {
            inner.items = Arc::new(Vec::new());
        }
        true
    }

    /// Fetch one page for the filter current at the time this runs.
    /// The latest request wins; earlier ones resolving later are discarded.
    pub async fn fetch_page(&self, page: u32) -> FetchOutcome {
        self.fetch(PageTarget::Page(page)).await
    }

    /// Fetch the page after the last one received. No-op while a next-page
    /// fetch is in flight or when the last page has been reached.
    pub async fn fetch_next_page(&self) -> FetchOutcome {
        self.fetch(PageTarget::Next).await
    }

    async fn fetch(&self, target: PageTarget) -> FetchOutcome {
        // page choice, in-flight flag and filter snapshot share one critical section
        let (generation, query) = {
            let mut inner = self.lock();
            let (page, next_page) = match target {
                PageTarget::Page(page) => (page, false),
                PageTarget::Next => {
                    if inner.fetching_next
                        || inner.loading
                        || inner.pristine
                        || !inner.pagination.has_next_page()
                    {
                        return FetchOutcome::Skipped;
                    }
                    (inner.pagination.current_page + 1, true)
                }
            };
            inner.generation += 1;
            if next_page {
                inner.fetching_next = true;
            } else {
                inner.loading = true;
                inner.fetching_next = false;
            }
            (inner.generation, CatalogQuery::new(inner.filter.clone(), page))
        };

        let result = self.api.filter_catalog(&query).await;

        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::debug!("Discarding superseded catalog response for page {}", query.page);
            return FetchOutcome::Discarded;
        }
        inner.loading = false;
        inner.fetching_next = false;

        match result {
            Ok(Some(body)) => {
                let received = body.result.len();
                let pagination = body.pagination.for_page(query.page);
                let append = self.mode == FetchMode::Infinite && query.page > 1 && !inner.pristine;
                if append {
                    Arc::make_mut(&mut inner.items).extend(body.result);
                } else {
                    inner.items = Arc::new(body.result);
                }
                inner.pagination = pagination;
                inner.pristine = false;
                inner.last_error = None;
                tracing::info!(
                    "Catalog page {}/{}: {} result(s), {} total",
                    pagination.current_page,
                    pagination.total_pages,
                    received,
                    pagination.total_items
                );
                FetchOutcome::Applied { received }
            }
            Ok(None) => {
                tracing::warn!("Catalog returned no usable data for page {}", query.page);
                if !(self.mode == FetchMode::Infinite && query.page > 1) {
                    inner.items = Arc::new(Vec::new());
                }
                inner.pagination = Pagination {
                    current_page: query.page,
                    total_pages: query.page,
                    total_items: inner.items.len() as u64,
                    page_size: inner.pagination.page_size,
                }
                .sanitized();
                inner.pristine = false;
                inner.last_error = None;
                FetchOutcome::Applied { received: 0 }
            }
            Err(e) => {
                tracing::warn!("Catalog fetch failed for page {}: {}", query.page, e);
                let notice = Notice::from(&e);
                inner.last_error = Some(notice.clone());
                FetchOutcome::Failed(notice)
            }
        }
    }
}
