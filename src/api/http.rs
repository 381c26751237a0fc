//! HTTP implementation of the analysis service API
//!
//! Thin reqwest wrapper: builds URLs under a base, decodes JSON bodies and
//! maps failures onto `SyncError`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::api::AnalysisApi;
use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::models::{
    AddWatchlistRequest, MutationResponse, SectorStatsResponse, StockHistory, Symbol,
    SystemMetrics, WatchlistResponse,
};

// == HTTP API ==
/// reqwest-backed client for the analysis service.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
}

impl HttpApi {
    /// Creates a client rooted at `base_url`.
    ///
    /// A trailing slash is added when missing so relative paths nest under it.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| SyncError::Network(format!("invalid base url {base_url}: {e}")))?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // == URL Building ==
    /// Appends path segments to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| SyncError::Network(format!("base url {} cannot be a base", self.base_url)))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.url(segments)?;
        debug!(%method, %url, "analysis api request");
        Ok(self.client.request(method, url))
    }

    // == Response Handling ==
    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Remote {
                status: status.as_u16(),
                message: remote_message(&body)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Extracts a human-readable message from an error body.
fn remote_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    ["detail", "error", "message"]
        .iter()
        .find_map(|field| json.get(field).and_then(Value::as_str))
        .map(str::to_string)
}

#[async_trait]
impl AnalysisApi for HttpApi {
    async fn get_watchlist(&self) -> Result<WatchlistResponse> {
        Self::send(self.request(Method::GET, &["watchlist"])?).await
    }

    async fn add_to_watchlist(
        &self,
        symbol: &Symbol,
        notes: Option<&str>,
    ) -> Result<MutationResponse> {
        let body = AddWatchlistRequest {
            symbol: symbol.clone(),
            notes: notes.map(str::to_string),
        };
        Self::send(self.request(Method::POST, &["watchlist"])?.json(&body)).await
    }

    async fn remove_from_watchlist(&self, symbol: &Symbol) -> Result<MutationResponse> {
        Self::send(self.request(Method::DELETE, &["watchlist", symbol.as_str()])?).await
    }

    async fn get_sector_stats(&self, days: u32) -> Result<SectorStatsResponse> {
        let request = self
            .request(Method::GET, &["analytics", "sectors"])?
            .query(&[("days", days)]);
        Self::send(request).await
    }

    async fn get_stock_history(
        &self,
        symbol: &Symbol,
        days: u32,
        include_price: bool,
    ) -> Result<StockHistory> {
        let request = self
            .request(Method::GET, &["history", "stock", symbol.as_str()])?
            .query(&[
                ("days", days.to_string()),
                ("include_price", include_price.to_string()),
            ]);
        Self::send(request).await
    }

    async fn get_system_metrics(&self) -> Result<SystemMetrics> {
        Self::send(self.request(Method::GET, &["analytics", "system"])?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> HttpApi {
        HttpApi::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_url_nests_under_base_path() {
        let api = api("http://localhost:8000/api");
        let url = api.url(&["history", "stock", "TCS"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/history/stock/TCS");
    }

    #[test]
    fn test_url_with_trailing_slash_base() {
        let api = api("http://localhost:8000/api/");
        let url = api.url(&["watchlist"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/watchlist");
    }

    #[test]
    fn test_url_encodes_segments() {
        let api = api("http://localhost:8000");
        let url = api.url(&["watchlist", "M&M"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/watchlist/M&M");

        let url = api.url(&["watchlist", "A?B"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/watchlist/A%3FB");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpApi::new("not a url", Duration::from_secs(1)),
            Err(SyncError::Network(_))
        ));
    }

    #[test]
    fn test_remote_message_fields() {
        assert_eq!(
            remote_message(r#"{"detail": "Stock not found"}"#).as_deref(),
            Some("Stock not found")
        );
        assert_eq!(remote_message(r#"{"error": "boom"}"#).as_deref(), Some("boom"));
        assert_eq!(remote_message("<html>"), None);
    }
}
