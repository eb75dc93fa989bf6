//! Market Fiyatı API wire types and the domain records built from them.
//!
//! Wire structs model the JSON shapes the upstream actually sends (camelCase
//! field names, optional fields that come and go between provider versions).
//! Missing optionals are defaulted at the boundary rather than carried as
//! loose maps through the pipeline.

use serde::{Deserialize, Serialize};

/// A geographic point supplied per request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// A store returned by the nearest-depots endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct NearbyDepot {
    pub id: String,
    /// Distance from the query coordinate, in meters. Some provider
    /// revisions omit it.
    #[serde(default)]
    pub distance: f64,
    /// Store display name; the field name varies across provider revisions.
    #[serde(rename = "sellerName", alias = "marketAdi", default)]
    pub name: Option<String>,
    /// Remaining provider fields, preserved untouched for debugging.
    #[serde(flatten)]
    pub raw: serde_json::Map<String, serde_json::Value>,
}

/// Envelope of the product search endpoint: `{ "content": [...] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub content: Vec<ProductListing>,
}

/// One distinct product match, with its price at every depot that stocks it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    pub title: String,
    #[serde(default)]
    pub refined_quantity_unit: Option<String>,
    #[serde(default)]
    pub product_depot_info_list: Vec<DepotPrice>,
}

/// One product's price at one depot.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepotPrice {
    pub depot_id: String,
    pub price: f64,
    /// Localized per-unit label such as `"101,37 ₺/kg"`.
    #[serde(default)]
    pub unit_price: Option<String>,
    #[serde(default)]
    pub market_adi: String,
}

/// A price entry merged with the metadata of the store that offers it.
///
/// The atomic unit carried through ranking and into the tool result.
#[derive(Debug, Clone, Serialize)]
pub struct PriceRecord {
    pub product_title: String,
    pub product_quantity: Option<String>,
    pub price: f64,
    pub unit_price: Option<String>,
    pub market_name: String,
    pub distance_km: f64,
}

/// Outcome of one shopping-list aggregation call.
///
/// `message` is populated exactly when `records` is empty and explains the
/// degraded outcome (no stores in range, nothing matched, upstream down).
/// Both cases are normal returns, not errors.
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub records: Vec<PriceRecord>,
    pub message: Option<String>,
}

impl Aggregation {
    pub(crate) fn empty(message: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            message: Some(message.into()),
        }
    }
}
