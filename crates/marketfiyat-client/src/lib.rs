//! HTTP client for the Market Fiyatı price-comparison API.
//!
//! Wraps `reqwest` with typed request/response handling for the two upstream
//! endpoints (nearest-store lookup and product price search) and builds the
//! shopping-list aggregation on top: locate stores once, fan out one search
//! per product, merge store metadata into every price entry.

mod aggregate;
mod client;
mod error;
mod rank;
mod types;
pub mod unit_price;

pub use client::MarketApiClient;
pub use error::ApiError;
pub use rank::{rank, SortKey};
pub use types::{
    Aggregation, Coordinate, DepotPrice, NearbyDepot, PriceRecord, ProductListing, SearchResponse,
};
