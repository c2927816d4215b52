//! One catalog view: filters, results and the virtualized list wired together

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{
    api::CatalogApi,
    config::{AppConfig, FetchMode},
    location::Location,
    models::ViewMode,
    services::{
        catalog::{FetchOutcome, ResultFetcher},
        filters::FilterStateStore,
    },
    virtual_list::{RenderFrame, VirtualizedListRenderer},
};

pub struct CatalogSession {
    store: FilterStateStore,
    fetcher: ResultFetcher,
    list: VirtualizedListRenderer,
    /// `(filter revision, page)` of the last fetch issued by `refresh`
    fetched: Option<(u64, u32)>,
    pending_next: Option<JoinHandle<FetchOutcome>>,
}

impl CatalogSession {
    /// Mount a catalog view, hydrating filters from the current URL
    pub fn new(api: Arc<dyn CatalogApi>, location: Location, config: &AppConfig, viewport_width: f64) -> Self {
        let store = FilterStateStore::hydrate(location, config.catalog.bounds());
        let fetcher = ResultFetcher::new(api, config.catalog.mode, store.criteria());
        let list = VirtualizedListRenderer::new(config.list.clone(), ViewMode::default(), viewport_width);
        Self {
            store,
            fetcher,
            list,
            fetched: None,
            pending_next: None,
        }
    }

    pub fn store(&self) -> &FilterStateStore {
        &self.store
    }

    pub fn fetcher(&self) -> &ResultFetcher {
        &self.fetcher
    }

    pub fn list(&self) -> &VirtualizedListRenderer {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut VirtualizedListRenderer {
        &mut self.list
    }

    pub fn current_page(&self) -> u32 {
        self.store.current_page()
    }

    /// Apply filter mutations synchronously. On change the fetcher is reset
    /// to page 1 right away; the network call waits for `refresh`.
    pub fn update<F>(&mut self, mutate: F) -> bool
    where
        F: FnOnce(&mut FilterStateStore) -> bool,
    {
        if !mutate(&mut self.store) {
            return false;
        }
        self.fetcher.set_criteria(self.store.criteria());
        self.sync_list();
        true
    }

    /// Re-read the URL after back/forward navigation
    pub fn on_navigation(&mut self) -> bool {
        let changed = self.store.rehydrate();
        if changed {
            self.fetcher.set_criteria(self.store.criteria());
            self.sync_list();
        }
        changed
    }

    /// Fetch results for the latest filters if they changed since the last
    /// call. A burst of mutations between two calls costs one request.
    pub async fn refresh(&mut self) -> Option<FetchOutcome> {
        let page = match self.fetcher.mode() {
            FetchMode::SinglePage => self.store.current_page(),
            FetchMode::Infinite => 1,
        };
        let key = (self.store.revision(), page);
        if self.fetched == Some(key) {
            tracing::debug!("Filters unchanged since last fetch, skipping");
            return None;
        }
        self.fetched = Some(key);

        self.fetcher.set_criteria(self.store.criteria());
        self.list.set_paging(false, false, true);
        let outcome = self.fetcher.fetch_page(page).await;
        if matches!(outcome, FetchOutcome::Failed(_)) {
            self.fetched = None;
        }
        self.sync_list();
        Some(outcome)
    }

    /// Single-page navigation
    pub async fn go_to_page(&mut self, page: u32) -> Option<FetchOutcome> {
        self.store.set_page(page);
        self.refresh().await
    }

    /// Render the list for a scroll position and start fetching the next
    /// page when the sentinel asks for it.
    pub fn scroll(&mut self, scroll_offset: f64, viewport_height: f64) -> RenderFrame {
        self.sync_list();
        let frame = self.list.render(scroll_offset, viewport_height);

        if let RenderFrame::Rows(ref rows) = frame {
            if rows.fetch_next_page && self.pending_next.is_none() {
                let fetcher = self.fetcher.clone();
                self.pending_next = Some(tokio::spawn(async move { fetcher.fetch_next_page().await }));
            }
        }
        frame
    }

    /// Wait for an in-flight next-page fetch, if any
    pub async fn settle(&mut self) -> Option<FetchOutcome> {
        let handle = self.pending_next.take()?;
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Next-page fetch task failed: {}", e);
                FetchOutcome::Discarded
            }
        };
        self.sync_list();
        Some(outcome)
    }

    /// Pull the fetcher's buffer and paging flags into the renderer
    pub fn sync_list(&mut self) {
        if self.pending_next.as_ref().is_some_and(|h| h.is_finished()) {
            self.pending_next = None;
        }
        let fetching_next = self.fetcher.is_fetching_next_page() || self.pending_next.is_some();
        self.list.set_items(self.fetcher.items());
        self.list.set_paging(self.fetcher.has_next_page(), fetching_next, self.fetcher.is_loading());
    }
}
