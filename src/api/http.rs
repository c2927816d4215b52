//! reqwest implementation of the catalog search contract

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{CatalogApi, CatalogQuery};
use crate::{
    config::BackendConfig,
    error::{AppError, AppResult},
    models::{book::unwrap_data, CatalogPage, InstantSearchResponse},
};

#[derive(Clone)]
pub struct HttpCatalogApi {
    client: Client,
    base_url: String,
}

impl HttpCatalogApi {
    pub fn new(config: &BackendConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<P: serde::Serialize + ?Sized>(&self, path: &str, params: &P) -> AppResult<Value> {
        let response = self
            .client
            .get(self.endpoint(path))
            .query(params)
            .send()
            .await?
            .error_for_status()?;

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn instant_search(&self, query: &str) -> AppResult<InstantSearchResponse> {
        tracing::debug!("Instant search: {}", query);
        let body = self.get_json("search/instant", &[("q", query)]).await?;
        Ok(unwrap_data(body)?.unwrap_or_default())
    }

    async fn filter_catalog(&self, query: &CatalogQuery) -> AppResult<Option<CatalogPage>> {
        let pairs = query.to_pairs();
        tracing::debug!("Catalog filter: {:?}", pairs);

        let body = match self.get_json("catalog/filter", &pairs).await {
            Ok(body) => body,
            Err(AppError::Payload(e)) => {
                tracing::warn!("Catalog response is not JSON, treating as empty: {}", e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        match unwrap_data::<CatalogPage>(body) {
            Ok(page) => Ok(page),
            Err(e) => {
                tracing::warn!("Catalog response could not be decoded, treating as empty: {}", e);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let api = HttpCatalogApi::new(&BackendConfig {
            base_url: "http://localhost:9000/api/".to_string(),
            timeout_ms: 1000,
        })
        .unwrap();
        assert_eq!(api.endpoint("search/instant"), "http://localhost:9000/api/search/instant");
    }
}
