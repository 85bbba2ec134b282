//! Cost data source implementations.
//!
//! This module provides integrations with:
//!
//! - Azure - Cost Management Query API and Resources Tags API

pub mod azure;
mod traits;

pub use azure::{AzureCostProvider, AzureCredentials};
pub use traits::{
    resource_name_from_id, CostProvider, CostProviderError, CostRow, UNASSIGNED_RESOURCE_ID,
};
