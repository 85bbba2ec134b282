//! Cost records: cost rows joined with the tags of their resource.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregation::ranking::by_cost_desc;
use crate::period::ReportPeriod;
use crate::providers::{resource_name_from_id, CostProvider, CostProviderError, CostRow};

/// Snapshot of one resource's spend for a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    /// Fully qualified resource ID.
    pub resource_id: String,
    /// Short resource name.
    pub resource_name: String,
    /// Resource type.
    pub resource_type: String,
    /// Resource group.
    pub resource_group: String,
    /// Cost over the period.
    pub cost: Decimal,
    /// Billing currency code.
    pub currency: String,
    /// Resource tags at collection time.
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl CostRecord {
    /// Build a record from a cost row and the resource's tags.
    #[must_use]
    pub fn from_row(row: CostRow, tags: HashMap<String, String>) -> Self {
        let resource_name = resource_name_from_id(&row.resource_id).to_string();
        Self {
            resource_id: row.resource_id,
            resource_name,
            resource_type: row.resource_type,
            resource_group: row.resource_group,
            cost: row.cost,
            currency: row.currency,
            tags,
        }
    }
}

/// Which records get a tag lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagScope {
    /// Every record.
    All,
    /// Only the `n` most expensive records; the rest keep empty tags.
    Top(usize),
}

/// Fetch cost rows for `period` and attach tags according to `scope`.
///
/// Tag lookups run one after another. Any failure aborts collection.
/// Unassigned spend has no resource to look up and keeps empty tags.
///
/// # Errors
///
/// Returns the first error from the cost query or a tag lookup.
pub async fn collect_records(
    provider: &dyn CostProvider,
    period: &ReportPeriod,
    scope: TagScope,
) -> Result<Vec<CostRecord>, CostProviderError> {
    let mut rows = provider.query_costs(period).await?;

    let lookups = match scope {
        TagScope::All => rows.len(),
        TagScope::Top(n) => {
            rows.sort_by(|a, b| {
                by_cost_desc(
                    (a.cost, a.resource_name(), &a.resource_id),
                    (b.cost, b.resource_name(), &b.resource_id),
                )
            });
            n.min(rows.len())
        }
    };

    let mut records = Vec::with_capacity(rows.len());
    for (idx, row) in rows.into_iter().enumerate() {
        let tags = if idx < lookups && !row.is_unassigned() {
            provider.resource_tags(&row.resource_id).await?
        } else {
            HashMap::new()
        };
        records.push(CostRecord::from_row(row, tags));
    }

    debug!(lookups, "Resolved resource tags");
    info!(
        provider = provider.name(),
        period = %period,
        records = records.len(),
        "Collected cost records"
    );

    Ok(records)
}
