//! Configuration management for the discovery client

use chrono::Datelike;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::models::filter::{CatalogBounds, NumericRange};

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

/// How the result list accumulates pages
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    SinglePage,
    Infinite,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub mode: FetchMode,
    pub price_min: i64,
    pub price_max: i64,
    pub year_min: i64,
    pub year_max: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SuggestionConfig {
    pub min_query_chars: usize,
    pub debounce_ms: u64,
    pub max_titles: usize,
    pub max_authors: usize,
    pub max_books: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecentSearchConfig {
    pub path: String,
    pub storage_key: String,
    pub capacity: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListConfig {
    /// Rows materialized above and below the viewport
    pub overscan: usize,
    pub list_row_estimate: f64,
    pub grid_row_estimate: f64,
    /// Minimum viewport widths for 3 and 4 grid columns
    pub grid_breakpoints: [f64; 2],
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub suggestions: SuggestionConfig,
    #[serde(default)]
    pub recent_searches: RecentSearchConfig,
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Environment variables (with prefix ELIDUNE_), e.g. ELIDUNE_BACKEND__BASE_URL
            .add_source(
                Environment::with_prefix("ELIDUNE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("backend.base_url", env::var("CATALOG_API_URL").ok())?
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.catalog.validate()?;
        Ok(config)
    }
}

impl CatalogConfig {
    /// Slider bounds. Inverted pairs are reordered so hydration never sees
    /// `min > max`; `validate` rejects them at load time.
    pub fn bounds(&self) -> CatalogBounds {
        CatalogBounds {
            price: NumericRange::new(self.price_min, self.price_max).ordered(),
            year: NumericRange::new(self.year_min, self.year_max).ordered(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.price_min > self.price_max {
            return Err(ConfigError::Message(format!(
                "catalog.price_min ({}) is greater than catalog.price_max ({})",
                self.price_min, self.price_max
            )));
        }
        if self.year_min > self.year_max {
            return Err(ConfigError::Message(format!(
                "catalog.year_min ({}) is greater than catalog.year_max ({})",
                self.year_min, self.year_max
            )));
        }
        Ok(())
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            mode: FetchMode::Infinite,
            price_min: 0,
            price_max: 2_000_000,
            year_min: 1900,
            year_max: chrono::Utc::now().year() as i64,
        }
    }
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            min_query_chars: 2,
            debounce_ms: 260,
            max_titles: 6,
            max_authors: 6,
            max_books: 4,
        }
    }
}

impl Default for RecentSearchConfig {
    fn default() -> Self {
        Self {
            path: ".elidune/local_storage.json".to_string(),
            storage_key: "recent_searches".to_string(),
            capacity: 5,
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            overscan: 3,
            list_row_estimate: 160.0,
            grid_row_estimate: 380.0,
            grid_breakpoints: [768.0, 1280.0],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
