//! Cost totals and top-N ranking.

use std::cmp::Ordering;

use rust_decimal::Decimal;

use crate::records::CostRecord;

/// Number of resources listed in a daily alert.
pub const TOP_RESOURCE_LIMIT: usize = 5;

/// Ordering used for every cost ranking: cost descending, then name
/// ascending, then resource ID ascending.
#[must_use]
pub fn by_cost_desc(a: (Decimal, &str, &str), b: (Decimal, &str, &str)) -> Ordering {
    b.0.cmp(&a.0)
        .then_with(|| a.1.cmp(b.1))
        .then_with(|| a.2.cmp(b.2))
}

/// Compare two records by [`by_cost_desc`].
#[must_use]
pub fn compare_records(a: &CostRecord, b: &CostRecord) -> Ordering {
    by_cost_desc(
        (a.cost, &a.resource_name, &a.resource_id),
        (b.cost, &b.resource_name, &b.resource_id),
    )
}

/// Sum of all record costs.
#[must_use]
pub fn total_cost(records: &[CostRecord]) -> Decimal {
    records.iter().map(|r| r.cost).sum()
}

/// The `limit` most expensive records, most expensive first.
///
/// Zero-cost records sort after every non-zero record, so they only appear
/// when fewer than `limit` records have a cost.
#[must_use]
pub fn top_resources(records: &[CostRecord], limit: usize) -> Vec<&CostRecord> {
    let mut ranked: Vec<&CostRecord> = records.iter().collect();
    ranked.sort_by(|a, b| compare_records(a, b));
    ranked.truncate(limit);
    ranked
}
