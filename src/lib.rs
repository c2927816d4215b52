//! Elidune catalog discovery client
//!
//! Headless core of the catalog browsing page: faceted filters kept in sync
//! with the page URL, instant search suggestions, paginated or infinite
//! result fetching and a virtualized result list.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod location;
pub mod models;
pub mod services;
pub mod virtual_list;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use location::Location;

/// Application state shared across catalog views
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let config = Arc::new(config);
        let services = services::Services::new(Arc::clone(&config))?;
        Ok(Self {
            config,
            services: Arc::new(services),
        })
    }
}
