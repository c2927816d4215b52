//! Shared address bar of the catalog page.
//!
//! The query string is the one resource written by several components (the
//! filter store and the search box). Writers never replace it wholesale: they
//! read the current parameters and patch only the keys they own.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use reqwest::Url;

use crate::error::{AppError, AppResult};

/// Query parameters in URL order, one value per key (last occurrence wins)
pub type QueryParams = IndexMap<String, String>;

#[derive(Debug)]
struct LocationInner {
    url: Url,
    history: Vec<Url>,
}

/// Cloneable handle on the current URL and its history stack
#[derive(Debug, Clone)]
pub struct Location {
    inner: Arc<Mutex<LocationInner>>,
}

impl Location {
    pub fn parse(href: &str) -> AppResult<Self> {
        let url = Url::parse(href)
            .map_err(|e| AppError::InvalidParameter(format!("invalid location {}: {}", href, e)))?;
        Ok(Self {
            inner: Arc::new(Mutex::new(LocationInner {
                url,
                history: Vec::new(),
            })),
        })
    }

    fn lock(&self) -> MutexGuard<'_, LocationInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn href(&self) -> String {
        self.lock().url.to_string()
    }

    pub fn query(&self) -> Option<String> {
        self.lock().url.query().map(str::to_string)
    }

    pub fn params(&self) -> QueryParams {
        self.lock()
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.params().shift_remove(key)
    }

    /// Number of entries behind the current one
    pub fn history_len(&self) -> usize {
        self.lock().history.len()
    }

    /// Patch the `owned` keys so they hold exactly `patch`, leaving every
    /// other key untouched. Returns `false` (and records no history entry)
    /// when the owned keys already hold those values.
    pub fn merge(&self, owned: &[&str], patch: &QueryParams) -> bool {
        let mut inner = self.lock();

        let pairs: Vec<(String, String)> = inner
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let current: BTreeMap<&str, &str> = pairs
            .iter()
            .filter(|(k, _)| owned.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let wanted: BTreeMap<&str, &str> = patch
            .iter()
            .filter(|(k, _)| owned.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        if current == wanted {
            return false;
        }

        let mut next: Vec<(String, String)> = pairs
            .into_iter()
            .filter(|(k, _)| !owned.contains(&k.as_str()))
            .collect();
        next.extend(
            patch
                .iter()
                .filter(|(k, _)| owned.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        let mut url = inner.url.clone();
        if next.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(next);
        }

        tracing::debug!("Location updated: {}", url);
        let previous = std::mem::replace(&mut inner.url, url);
        inner.history.push(previous);
        true
    }

    /// External navigation (link, typed URL)
    pub fn navigate(&self, href: &str) -> AppResult<()> {
        let url = Url::parse(href)
            .map_err(|e| AppError::InvalidParameter(format!("invalid location {}: {}", href, e)))?;
        let mut inner = self.lock();
        let previous = std::mem::replace(&mut inner.url, url);
        inner.history.push(previous);
        Ok(())
    }

    /// Pop the history stack. Returns `false` when there is nothing to go back to.
    pub fn back(&self) -> bool {
        let mut inner = self.lock();
        match inner.history.pop() {
            Some(previous) => {
                inner.url = previous;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_merge_preserves_foreign_keys() {
        let location = Location::parse("https://lib.example/catalog?tab=new&q=old").unwrap();
        assert!(location.merge(&["q", "genres"], &patch(&[("genres", "Fiction")])));

        let params = location.params();
        assert_eq!(params.get("tab").map(String::as_str), Some("new"));
        assert_eq!(params.get("genres").map(String::as_str), Some("Fiction"));
        assert!(params.get("q").is_none());
        assert_eq!(location.history_len(), 1);
    }

    #[test]
    fn test_merge_unchanged_is_noop() {
        let location = Location::parse("https://lib.example/catalog?maxPrice=9&minPrice=1").unwrap();
        let same = patch(&[("minPrice", "1"), ("maxPrice", "9")]);
        assert!(!location.merge(&["minPrice", "maxPrice"], &same));
        assert_eq!(location.history_len(), 0);
        assert_eq!(location.query().as_deref(), Some("maxPrice=9&minPrice=1"));
    }

    #[test]
    fn test_merge_to_empty_drops_query() {
        let location = Location::parse("https://lib.example/catalog?q=dune").unwrap();
        assert!(location.merge(&["q"], &QueryParams::new()));
        assert_eq!(location.href(), "https://lib.example/catalog");
    }

    #[test]
    fn test_back_restores_previous_url() {
        let location = Location::parse("https://lib.example/catalog").unwrap();
        location.merge(&["q"], &patch(&[("q", "dune")]));
        assert_eq!(location.get("q").as_deref(), Some("dune"));
        assert!(location.back());
        assert_eq!(location.get("q"), None);
        assert!(!location.back());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Location::parse("not a url").is_err());
    }
}
