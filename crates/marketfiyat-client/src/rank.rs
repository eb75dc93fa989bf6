//! Ordering and truncation of aggregated price records.

use std::cmp::Ordering;

use crate::types::PriceRecord;
use crate::unit_price;

/// Which value to order records by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Ascending absolute price.
    Price,
    /// Ascending parsed unit price; records without a parseable unit-price
    /// label sort last.
    UnitPrice,
}

/// Sorts `records` in place by `key` and optionally truncates them.
///
/// The sort is stable: records comparing equal keep the relative order the
/// aggregation produced. `limit` of `None` or `Some(0)` means no truncation.
pub fn rank(records: &mut Vec<PriceRecord>, key: SortKey, limit: Option<usize>) {
    match key {
        SortKey::Price => records.sort_by(|a, b| total_order(a.price, b.price)),
        SortKey::UnitPrice => records.sort_by(|a, b| {
            total_order(
                unit_price::parse(a.unit_price.as_deref()),
                unit_price::parse(b.unit_price.as_deref()),
            )
        }),
    }

    if let Some(limit) = limit {
        if limit > 0 {
            records.truncate(limit);
        }
    }
}

fn total_order(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
