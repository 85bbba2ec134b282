//! Cost data source trait and common types.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::period::ReportPeriod;

/// Errors that can occur while talking to a cost data source.
#[derive(Error, Debug)]
pub enum CostProviderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Authentication error (bad credentials or missing role assignment).
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The response parsed but did not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Resource ID given to spend that Azure does not attribute to a resource
/// (Marketplace charges, support plans, reservation purchases).
pub const UNASSIGNED_RESOURCE_ID: &str = "Unassigned";

/// One row of a cost query: the spend of a single resource over the period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRow {
    /// Fully qualified resource ID.
    pub resource_id: String,
    /// Resource type (e.g. `microsoft.compute/virtualmachines`).
    pub resource_type: String,
    /// Resource group the resource lives in.
    pub resource_group: String,
    /// Cost over the period.
    pub cost: Decimal,
    /// Billing currency code.
    pub currency: String,
}

impl CostRow {
    /// Short resource name: the last path segment of the resource ID.
    #[must_use]
    pub fn resource_name(&self) -> &str {
        resource_name_from_id(&self.resource_id)
    }

    /// Whether this spend is not tied to any resource.
    #[must_use]
    pub fn is_unassigned(&self) -> bool {
        self.resource_id == UNASSIGNED_RESOURCE_ID
    }
}

/// Last `/`-separated segment of a resource ID, or the whole ID if it has none.
#[must_use]
pub fn resource_name_from_id(resource_id: &str) -> &str {
    let trimmed = resource_id.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((_, name)) if !name.is_empty() => name,
        _ => resource_id,
    }
}

/// Trait for cloud cost data sources.
///
/// Implementations handle authentication and API communication for their
/// provider. Callers treat every error as "data source unavailable".
#[async_trait]
pub trait CostProvider: Send + Sync {
    /// Get the provider name (e.g., "azure").
    fn name(&self) -> &'static str;

    /// Fetch per-resource costs for every day in `period`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or authentication fails.
    async fn query_costs(&self, period: &ReportPeriod) -> Result<Vec<CostRow>, CostProviderError>;

    /// Fetch the tags attached to a resource.
    ///
    /// A resource that no longer exists has no tags.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or authentication fails.
    async fn resource_tags(
        &self,
        resource_id: &str,
    ) -> Result<HashMap<String, String>, CostProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_name_from_id() {
        assert_eq!(
            resource_name_from_id(
                "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Compute/virtualMachines/vm-01"
            ),
            "vm-01"
        );
        assert_eq!(resource_name_from_id("plain-name"), "plain-name");
        assert_eq!(resource_name_from_id("/a/b/"), "b");
        assert_eq!(resource_name_from_id(UNASSIGNED_RESOURCE_ID), "Unassigned");
    }
}
