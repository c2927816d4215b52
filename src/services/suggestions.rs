//! Debounced instant suggestions.
//!
//! Each keystroke bumps a generation counter and cancels the pending timer
//! and request. A response is applied only if its generation is still the
//! latest and it was issued for the current query.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use unicode_normalization::UnicodeNormalization;

use crate::{
    api::CatalogApi,
    config::SuggestionConfig,
    error::AppResult,
    models::{BookSummary, InstantSearchResponse},
};

/// Suggestions produced for exactly one query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionSet {
    pub query: String,
    pub titles: Vec<String>,
    pub authors: Vec<String>,
    pub books: Vec<BookSummary>,
    /// A request for `query` is pending
    pub loading: bool,
    /// Whether the dropdown has anything to show
    pub open: bool,
}

impl SuggestionSet {
    fn cleared(query: String) -> Self {
        Self {
            query,
            ..Self::default()
        }
    }

    fn from_response(query: String, response: InstantSearchResponse, config: &SuggestionConfig) -> Self {
        let titles = dedup_capped(
            response.suggestions.titles.into_iter().map(|s| s.text),
            config.max_titles,
        );
        let authors = dedup_capped(
            response.suggestions.authors.into_iter().map(|s| s.text),
            config.max_authors,
        );
        let books: Vec<BookSummary> = response.books.into_iter().take(config.max_books).collect();
        let open = !(titles.is_empty() && authors.is_empty() && books.is_empty());
        Self {
            query,
            titles,
            authors,
            books,
            loading: false,
            open,
        }
    }

    /// Titles first, then authors
    pub fn ranked(&self) -> impl Iterator<Item = &str> {
        self.titles.iter().chain(self.authors.iter()).map(String::as_str)
    }
}

/// NFC + lowercase key used for case-insensitive comparisons
pub fn normalize_term(term: &str) -> String {
    term.trim().nfc().collect::<String>().to_lowercase()
}

fn dedup_capped(texts: impl Iterator<Item = String>, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    texts
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(normalize_term(t)))
        .take(cap)
        .collect()
}

struct Shared {
    generation: AtomicU64,
    pending: Mutex<Option<CancellationToken>>,
    state: watch::Sender<SuggestionSet>,
}

impl Shared {
    fn replace_pending(&self, token: Option<CancellationToken>) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = std::mem::replace(&mut *pending, token) {
            previous.cancel();
        }
    }

    fn apply(
        &self,
        generation: u64,
        query: String,
        result: AppResult<InstantSearchResponse>,
        config: &SuggestionConfig,
    ) {
        if self.generation.load(Ordering::SeqCst) != generation || self.state.borrow().query != query {
            tracing::debug!("Discarding stale suggestions for {:?}", query);
            return;
        }
        let next = match result {
            Ok(response) => SuggestionSet::from_response(query, response, config),
            Err(e) => {
                tracing::warn!("Instant search failed for {:?}: {}", query, e);
                SuggestionSet::cleared(query)
            }
        };
        self.state.send_replace(next);
    }
}

/// Keystroke-to-suggestion pipeline. Must be driven from within a tokio runtime.
pub struct SuggestionEngine {
    api: Arc<dyn CatalogApi>,
    config: SuggestionConfig,
    shared: Arc<Shared>,
}

impl SuggestionEngine {
    pub fn new(api: Arc<dyn CatalogApi>, config: SuggestionConfig) -> Self {
        let (state, _) = watch::channel(SuggestionSet::default());
        Self {
            api,
            config,
            shared: Arc::new(Shared {
                generation: AtomicU64::new(0),
                pending: Mutex::new(None),
                state,
            }),
        }
    }

    pub fn snapshot(&self) -> SuggestionSet {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SuggestionSet> {
        self.shared.state.subscribe()
    }

    /// Feed the current content of the search input
    pub fn on_query_change(&self, input: &str) {
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = input.trim().to_string();

        if query.chars().count() < self.config.min_query_chars {
            self.shared.replace_pending(None);
            self.shared.state.send_replace(SuggestionSet::cleared(query));
            return;
        }

        let token = CancellationToken::new();
        self.shared.replace_pending(Some(token.clone()));
        self.shared.state.send_modify(|s| {
            if s.query != query {
                *s = SuggestionSet::cleared(query.clone());
            }
            s.loading = true;
        });

        let api = Arc::clone(&self.api);
        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();
        let debounce = Duration::from_millis(self.config.debounce_ms);

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(debounce) => {}
            }
            if shared.generation.load(Ordering::SeqCst) != generation {
                return;
            }

            tracing::debug!("Requesting suggestions for {:?}", query);
            let result = tokio::select! {
                _ = token.cancelled() => return,
                result = api.instant_search(&query) => result,
            };
            shared.apply(generation, query, result, &config);
        });
    }

    /// Drop pending work and hide the dropdown
    pub fn cancel(&self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.shared.replace_pending(None);
        self.shared.state.send_modify(|s| {
            s.loading = false;
            s.open = false;
        });
    }
}

impl Drop for SuggestionEngine {
    fn drop(&mut self) {
        self.shared.replace_pending(None);
    }
}
