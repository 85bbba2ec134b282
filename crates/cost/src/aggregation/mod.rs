//! Aggregation of cost records into daily and monthly summaries.
//!
//! Everything here is pure: records in, summaries out.

pub mod creator;
pub mod grouping;
pub mod ranking;
pub mod threshold;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub use creator::{resolve_creator, CREATOR_TAG_KEYS, UNKNOWN_CREATOR};
pub use grouping::{group_by_creator, CreatorGroup};
pub use ranking::{top_resources, total_cost, TOP_RESOURCE_LIMIT};
pub use threshold::ThresholdResult;

use crate::money::DEFAULT_CURRENCY;
use crate::period::ReportPeriod;
use crate::records::CostRecord;

/// Currency reported for a set of records.
///
/// Amounts are summed as-is; a subscription billed in more than one
/// currency is labelled with the first one and logged.
fn report_currency(records: &[CostRecord]) -> String {
    let currencies = distinct_currencies(records);
    if currencies.len() > 1 {
        warn!(
            currencies = ?currencies,
            "Cost records span several currencies, totals mix them"
        );
    }
    currencies
        .first()
        .copied()
        .unwrap_or(DEFAULT_CURRENCY)
        .to_string()
}

/// Currency codes in first-seen order.
fn distinct_currencies(records: &[CostRecord]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for record in records {
        if !seen.contains(&record.currency.as_str()) {
            seen.push(&record.currency);
        }
    }
    seen
}

/// A record placed in the daily top list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResource {
    /// 1-based position.
    pub rank: usize,
    /// Resolved creator.
    pub creator: String,
    pub record: CostRecord,
}

/// Result of the daily threshold check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub period: ReportPeriod,
    pub threshold: ThresholdResult,
    pub currency: String,
    /// Most expensive resources, at most [`TOP_RESOURCE_LIMIT`].
    pub top_resources: Vec<RankedResource>,
    pub resource_count: usize,
}

impl DailySummary {
    /// Aggregate a day's records against `threshold`.
    #[must_use]
    pub fn build(period: ReportPeriod, records: &[CostRecord], threshold: Decimal) -> Self {
        let top = top_resources(records, TOP_RESOURCE_LIMIT)
            .into_iter()
            .enumerate()
            .map(|(idx, record)| RankedResource {
                rank: idx + 1,
                creator: resolve_creator(&record.tags).to_string(),
                record: record.clone(),
            })
            .collect();

        Self {
            period,
            threshold: ThresholdResult::evaluate(total_cost(records), threshold),
            currency: report_currency(records),
            top_resources: top,
            resource_count: records.len(),
        }
    }

    /// Whether an alert should go out.
    #[must_use]
    pub fn exceeded(&self) -> bool {
        self.threshold.exceeded
    }
}

/// Creator breakdown for a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub period: ReportPeriod,
    pub total_cost: Decimal,
    pub currency: String,
    pub resource_count: usize,
    /// Creator groups, most expensive first.
    pub groups: Vec<CreatorGroup>,
}

impl MonthlySummary {
    #[must_use]
    pub fn build(period: ReportPeriod, records: &[CostRecord]) -> Self {
        Self {
            period,
            total_cost: total_cost(records),
            currency: report_currency(records),
            resource_count: records.len(),
            groups: group_by_creator(records),
        }
    }

    /// True when the period had no cost records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resource_count == 0
    }

    #[must_use]
    pub fn creator_count(&self) -> usize {
        self.groups.len()
    }
}
