//! Client-side discovery services

pub mod catalog;
pub mod filters;
pub mod recent_searches;
pub mod search_bar;
pub mod session;
pub mod suggestions;

use std::sync::Arc;

use crate::{
    api::{CatalogApi, HttpCatalogApi},
    config::AppConfig,
    error::AppResult,
    location::Location,
};

/// Container for the pieces every catalog view is built from
#[derive(Clone)]
pub struct Services {
    pub api: Arc<dyn CatalogApi>,
    pub config: Arc<AppConfig>,
}

impl Services {
    /// Services backed by the configured HTTP catalog
    pub fn new(config: Arc<AppConfig>) -> AppResult<Self> {
        let api = HttpCatalogApi::new(&config.backend)?;
        Ok(Self::with_api(Arc::new(api), config))
    }

    pub fn with_api(api: Arc<dyn CatalogApi>, config: Arc<AppConfig>) -> Self {
        Self { api, config }
    }

    /// Mount a catalog view on `location`
    pub fn session(&self, location: Location, viewport_width: f64) -> session::CatalogSession {
        session::CatalogSession::new(Arc::clone(&self.api), location, &self.config, viewport_width)
    }

    pub fn search_bar(&self) -> search_bar::SearchBar {
        let engine = suggestions::SuggestionEngine::new(Arc::clone(&self.api), self.config.suggestions.clone());
        let recent = recent_searches::RecentSearches::load(&self.config.recent_searches);
        search_bar::SearchBar::new(engine, recent)
    }
}
