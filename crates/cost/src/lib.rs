//! Cloud cost collection and creator-based aggregation.
//!
//! The crate is split into three layers:
//!
//! - [`providers`] fetches per-resource cost rows and resource tags from a
//!   cost data source. Azure Cost Management is the built-in implementation.
//! - [`records`] joins rows with their tags into [`CostRecord`]s.
//! - [`aggregation`] turns records into a [`DailySummary`] (threshold check
//!   and top resources) or a [`MonthlySummary`] (spend per creator).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use costwatch_cost::{
//!     collect_records, AzureCostProvider, AzureCredentials, DailySummary, ReportPeriod, TagScope,
//! };
//!
//! let creds = AzureCredentials::new(tenant, client_id, secret);
//! let provider = AzureCostProvider::new(creds, subscription_id)?;
//!
//! let period = ReportPeriod::yesterday(chrono::Local::now().date_naive());
//! let records = collect_records(&provider, &period, TagScope::Top(5)).await?;
//! let summary = DailySummary::build(period, &records, threshold);
//!
//! if summary.exceeded() {
//!     println!("over budget by {}", summary.threshold.overage);
//! }
//! ```

pub mod aggregation;
pub mod money;
pub mod period;
pub mod providers;
pub mod records;

pub use aggregation::{
    resolve_creator, CreatorGroup, DailySummary, MonthlySummary, RankedResource, ThresholdResult,
    TOP_RESOURCE_LIMIT,
};
pub use money::{format_amount, format_percentage, DEFAULT_CURRENCY};
pub use period::ReportPeriod;
pub use providers::{
    AzureCostProvider, AzureCredentials, CostProvider, CostProviderError, CostRow,
    UNASSIGNED_RESOURCE_ID,
};
pub use records::{collect_records, CostRecord, TagScope};
