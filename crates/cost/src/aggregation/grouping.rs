//! Grouping cost records by creator.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::creator::resolve_creator;
use super::ranking::compare_records;
use crate::records::CostRecord;

/// Spend attributed to a single creator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatorGroup {
    /// Resolved creator, or `Unknown`.
    pub creator: String,
    /// Sum of the creator's resource costs.
    pub total_cost: Decimal,
    /// Number of resources attributed to the creator.
    pub resource_count: usize,
    /// Share of the grand total, 0-100.
    pub percentage: Decimal,
    /// The creator's resources, most expensive first.
    pub resources: Vec<CostRecord>,
}

/// Group records by resolved creator.
///
/// Groups are ordered by total cost descending, then creator ascending.
/// Percentages are relative to the sum of all records and are zero when that
/// sum is zero.
#[must_use]
pub fn group_by_creator(records: &[CostRecord]) -> Vec<CreatorGroup> {
    let mut by_creator: HashMap<&str, Vec<&CostRecord>> = HashMap::new();
    for record in records {
        by_creator
            .entry(resolve_creator(&record.tags))
            .or_default()
            .push(record);
    }

    let grand_total: Decimal = records.iter().map(|r| r.cost).sum();

    let mut groups: Vec<CreatorGroup> = by_creator
        .into_iter()
        .map(|(creator, mut members)| {
            members.sort_by(|a, b| compare_records(a, b));
            let total_cost: Decimal = members.iter().map(|r| r.cost).sum();
            let percentage = if grand_total.is_zero() {
                Decimal::ZERO
            } else {
                total_cost / grand_total * Decimal::ONE_HUNDRED
            };

            CreatorGroup {
                creator: creator.to_string(),
                total_cost,
                resource_count: members.len(),
                percentage,
                resources: members.into_iter().cloned().collect(),
            }
        })
        .collect();

    groups.sort_by(|a, b| {
        b.total_cost
            .cmp(&a.total_cost)
            .then_with(|| a.creator.cmp(&b.creator))
    });

    groups
}
