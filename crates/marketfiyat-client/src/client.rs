//! HTTP client for the Market Fiyatı REST endpoints.
//!
//! Both upstream operations are JSON-over-POST. The client holds one
//! long-lived `reqwest::Client`; construct it once at process start and share
//! it across every tool invocation.

use std::time::Duration;

use crate::error::ApiError;
use crate::types::{Coordinate, NearbyDepot, SearchResponse};

const USER_AGENT: &str = "marketfiyat/0.1 (price-aggregation)";
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Client for the Market Fiyatı price-comparison API.
///
/// Holds the shared HTTP connection pool and the two endpoint URLs. Point the
/// URLs at a mock server in tests.
pub struct MarketApiClient {
    client: reqwest::Client,
    nearest_url: String,
    search_url: String,
    page_size: u32,
}

impl MarketApiClient {
    /// Creates a new client.
    ///
    /// `timeout_secs` applies uniformly to every outbound call; `page_size`
    /// caps how many listings a single product search may return.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(
        nearest_url: &str,
        search_url: &str,
        timeout_secs: u64,
        page_size: u32,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            nearest_url: nearest_url.to_owned(),
            search_url: search_url.to_owned(),
            page_size,
        })
    }

    /// Looks up stores within `radius_km` kilometers of `location`.
    ///
    /// Returns the stores in upstream order. An empty collection is a valid
    /// response; callers decide what "no stores" means for them.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] on network failure or non-2xx HTTP status.
    /// - [`ApiError::Deserialize`] if the response is not a store array.
    pub async fn nearby_depots(
        &self,
        location: Coordinate,
        radius_km: u32,
    ) -> Result<Vec<NearbyDepot>, ApiError> {
        let payload = serde_json::json!({
            "latitude": location.latitude,
            "longitude": location.longitude,
            "distance": radius_km,
        });

        let body = self.post_json(&self.nearest_url, &payload).await?;
        serde_json::from_value(body).map_err(|e| ApiError::Deserialize {
            context: format!("nearest(radius_km={radius_km})"),
            source: e,
        })
    }

    /// Searches prices for one free-text product keyword across `depot_ids`.
    ///
    /// One call per product name; the depot set is whatever the caller
    /// resolved beforehand and is sent verbatim.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] on network failure or non-2xx HTTP status.
    /// - [`ApiError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn search_product(
        &self,
        keywords: &str,
        depot_ids: &[String],
    ) -> Result<SearchResponse, ApiError> {
        let payload = serde_json::json!({
            "keywords": keywords,
            "depots": depot_ids,
            "size": self.page_size,
        });

        let body = self.post_json(&self.search_url, &payload).await?;
        serde_json::from_value(body).map_err(|e| ApiError::Deserialize {
            context: format!("search(keywords={keywords})"),
            source: e,
        })
    }

    /// Sends a POST request with a JSON body, asserts a 2xx status, and
    /// parses the response body as JSON.
    async fn post_json(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        let response = self.client.post(url).json(payload).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}
