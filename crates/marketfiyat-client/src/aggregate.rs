//! Shopping-list aggregation over the two upstream endpoints.
//!
//! Stores are resolved once per call, then every product in the list is
//! searched concurrently against that frozen store set. Results are merged in
//! product-list order, never completion order, so identical upstream data
//! always yields identical output order.

use std::collections::HashMap;

use futures::future;

use crate::client::MarketApiClient;
use crate::types::{Aggregation, Coordinate, NearbyDepot, PriceRecord, ProductListing};

impl MarketApiClient {
    /// Aggregates prices for every product on the list across all stores
    /// within `radius_km` of `location`.
    ///
    /// Degrades instead of failing: an unreachable or empty store lookup
    /// short-circuits to an empty result with an explanatory message, and a
    /// failed search for one product contributes zero listings without
    /// touching the others. Price entries referencing a store the locator did
    /// not return are dropped.
    ///
    /// Duplicate product names are searched independently, one call each.
    pub async fn find_shopping_list_prices(
        &self,
        products: &[String],
        location: Coordinate,
        radius_km: u32,
    ) -> Aggregation {
        let depots = match self.nearby_depots(location, radius_km).await {
            Ok(depots) if depots.is_empty() => {
                tracing::info!(radius_km, "no stores within the search radius");
                return Aggregation::empty("no stores found within the search radius");
            }
            Ok(depots) => depots,
            Err(e) => {
                tracing::warn!(error = %e, "store lookup failed");
                return Aggregation::empty(
                    "store lookup failed; prices are unavailable for this location right now",
                );
            }
        };

        let by_id: HashMap<&str, &NearbyDepot> =
            depots.iter().map(|d| (d.id.as_str(), d)).collect();
        let depot_ids: Vec<String> = depots.iter().map(|d| d.id.clone()).collect();
        tracing::debug!(stores = depot_ids.len(), "resolved nearby stores");

        // Every product searches the same frozen store set; `join_all` keeps
        // the results in product-list order regardless of completion order.
        let searches = products
            .iter()
            .map(|name| self.search_product(name, &depot_ids));
        let responses = future::join_all(searches).await;

        let mut records = Vec::new();
        for (name, response) in products.iter().zip(responses) {
            let page = match response {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(product = %name, error = %e, "product search failed, skipping");
                    continue;
                }
            };

            for listing in page.content {
                let ProductListing {
                    title,
                    refined_quantity_unit,
                    product_depot_info_list,
                } = listing;

                for entry in product_depot_info_list {
                    let Some(depot) = by_id.get(entry.depot_id.as_str()) else {
                        tracing::debug!(
                            depot_id = %entry.depot_id,
                            product = %title,
                            "price entry references an unknown store, dropping"
                        );
                        continue;
                    };

                    records.push(PriceRecord {
                        product_title: title.clone(),
                        product_quantity: refined_quantity_unit.clone(),
                        price: entry.price,
                        unit_price: entry.unit_price,
                        market_name: entry.market_adi,
                        distance_km: depot.distance / 1000.0,
                    });
                }
            }
        }

        if records.is_empty() {
            return Aggregation::empty("no matching products found at nearby stores");
        }

        Aggregation {
            records,
            message: None,
        }
    }
}
