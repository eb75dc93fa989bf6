//! MCP tool surface for the price aggregation pipeline.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars::{self, JsonSchema},
    tool, tool_handler, tool_router, ServerHandler,
};
use serde::{Deserialize, Serialize};

use marketfiyat_client::{rank, Coordinate, MarketApiClient, SortKey};

fn default_radius_km() -> u32 {
    1
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ShoppingListInput {
    #[schemars(
        description = "Product names to price, e.g. [\"süt\", \"ekmek\", \"domates\"]. May be empty."
    )]
    pub product_list: Vec<String>,
    #[schemars(description = "Latitude of the shopper's location.")]
    pub latitude: f64,
    #[schemars(description = "Longitude of the shopper's location.")]
    pub longitude: f64,
    #[serde(default = "default_radius_km")]
    #[schemars(description = "Search radius in kilometers. Defaults to 1 km.")]
    pub radius_km: u32,
    #[serde(default)]
    #[schemars(description = "Keep only the first N records after sorting. Omit or 0 for all.")]
    pub limit: Option<u32>,
    #[serde(default)]
    #[schemars(description = "Sort key: absolute price or normalized unit price.")]
    pub sort_by: SortBy,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Price,
    UnitPrice,
}

impl From<SortBy> for SortKey {
    fn from(value: SortBy) -> Self {
        match value {
            SortBy::Price => SortKey::Price,
            SortBy::UnitPrice => SortKey::UnitPrice,
        }
    }
}

/// One product price at one store, with the store's distance merged in.
#[derive(Debug, Serialize, JsonSchema)]
pub struct DetailedProductPrice {
    pub product_title: String,
    pub product_quantity: Option<String>,
    pub price: f64,
    pub unit_price: Option<String>,
    pub market_name: String,
    pub distance_km: f64,
}

/// Terminal result of one tool invocation. Failures of any kind surface in
/// `error_message`, never as a protocol error.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ShoppingListResult {
    pub records: Vec<DetailedProductPrice>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// MCP server exposing the shopping-list aggregation as a single tool.
#[derive(Clone)]
pub struct PriceMcpServer {
    api: Arc<MarketApiClient>,
    tool_router: ToolRouter<Self>,
}

impl PriceMcpServer {
    pub fn new(api: Arc<MarketApiClient>) -> Self {
        Self {
            api,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl PriceMcpServer {
    #[tool(
        description = "Find grocery prices for a shopping list at stores near a coordinate. \
                       Locates stores within the radius, searches every product across them, \
                       and returns price records sorted by price or unit price, each with \
                       market name and distance."
    )]
    async fn find_shopping_list_prices(
        &self,
        Parameters(input): Parameters<ShoppingListInput>,
    ) -> String {
        tracing::info!(
            products = input.product_list.len(),
            radius_km = input.radius_km,
            "find_shopping_list_prices called"
        );

        let location = Coordinate {
            latitude: input.latitude,
            longitude: input.longitude,
        };

        let mut aggregation = self
            .api
            .find_shopping_list_prices(&input.product_list, location, input.radius_km)
            .await;

        rank(
            &mut aggregation.records,
            input.sort_by.into(),
            input.limit.map(|l| l as usize),
        );

        let records: Vec<DetailedProductPrice> = aggregation
            .records
            .into_iter()
            .map(|r| DetailedProductPrice {
                product_title: r.product_title,
                product_quantity: r.product_quantity,
                price: r.price,
                unit_price: r.unit_price,
                market_name: r.market_name,
                distance_km: r.distance_km,
            })
            .collect();

        let result = ShoppingListResult {
            count: records.len(),
            records,
            error_message: aggregation.message,
        };

        serde_json::to_string_pretty(&result).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to serialize tool result");
            serde_json::json!({
                "records": [],
                "count": 0,
                "error_message": format!("technical error: {e}"),
            })
            .to_string()
        })
    }
}

#[tool_handler]
impl ServerHandler for PriceMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Finds grocery product prices at Turkish chain markets (A101, BİM, Migros, ...) \
                 near the user's location. Call find_shopping_list_prices with a product list \
                 and coordinates to get the cheapest options at nearby stores."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_server(mock: &MockServer) -> PriceMcpServer {
        let api = MarketApiClient::new(
            &format!("{}/nearest", mock.uri()),
            &format!("{}/search", mock.uri()),
            30,
            20,
        )
        .expect("client construction should not fail");
        PriceMcpServer::new(Arc::new(api))
    }

    fn input(products: &[&str]) -> ShoppingListInput {
        ShoppingListInput {
            product_list: products.iter().map(|p| (*p).to_string()).collect(),
            latitude: 39.92,
            longitude: 32.85,
            radius_km: 1,
            limit: None,
            sort_by: SortBy::Price,
        }
    }

    #[test]
    fn input_defaults_match_the_tool_contract() {
        let parsed: ShoppingListInput = serde_json::from_value(serde_json::json!({
            "product_list": ["süt"],
            "latitude": 39.92,
            "longitude": 32.85,
        }))
        .expect("minimal input should parse");

        assert_eq!(parsed.radius_km, 1);
        assert!(parsed.limit.is_none());
        assert!(matches!(parsed.sort_by, SortBy::Price));
    }

    #[test]
    fn sort_by_accepts_unit_price() {
        let parsed: ShoppingListInput = serde_json::from_value(serde_json::json!({
            "product_list": [],
            "latitude": 0.0,
            "longitude": 0.0,
            "sort_by": "unit_price",
        }))
        .expect("unit_price sort key should parse");
        assert!(matches!(parsed.sort_by, SortBy::UnitPrice));
    }

    #[tokio::test]
    async fn upstream_outage_becomes_a_structured_error_result() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/nearest"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock)
            .await;

        let server = test_server(&mock);
        let raw = server
            .find_shopping_list_prices(Parameters(input(&["süt"])))
            .await;

        let parsed: serde_json::Value = serde_json::from_str(&raw).expect("tool returns JSON");
        assert_eq!(parsed["count"].as_u64(), Some(0));
        assert_eq!(parsed["records"].as_array().map(Vec::len), Some(0));
        assert!(parsed["error_message"].is_string());
    }

    #[tokio::test]
    async fn sorts_and_limits_before_shaping_the_result() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/nearest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "A", "distance": 500.0, "sellerName": "A101" },
                { "id": "B", "distance": 2500.0, "sellerName": "BİM" }
            ])))
            .mount(&mock)
            .await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{
                    "title": "Süt 1 L",
                    "productDepotInfoList": [
                        { "depotId": "A", "price": 25.0, "marketAdi": "A101" },
                        { "depotId": "B", "price": 22.0, "marketAdi": "BİM" }
                    ]
                }]
            })))
            .mount(&mock)
            .await;

        let server = test_server(&mock);
        let mut request = input(&["süt"]);
        request.limit = Some(1);
        let raw = server
            .find_shopping_list_prices(Parameters(request))
            .await;

        let parsed: serde_json::Value = serde_json::from_str(&raw).expect("tool returns JSON");
        assert_eq!(parsed["count"].as_u64(), Some(1));
        assert_eq!(
            parsed["records"][0]["market_name"].as_str(),
            Some("BİM"),
            "cheapest record should survive the limit"
        );
        assert!(parsed.get("error_message").is_none());
    }
}
