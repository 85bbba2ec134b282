//! Azure API request and response models.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Cost Management query
// ============================================================================

/// Cost Management query request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDefinition {
    /// Cost type (`ActualCost` or `AmortizedCost`).
    #[serde(rename = "type")]
    pub cost_type: String,
    /// Timeframe (`Custom` when `time_period` is set).
    pub timeframe: String,
    /// Explicit time window.
    pub time_period: QueryTimePeriod,
    /// What to aggregate and how to group it.
    pub dataset: QueryDataset,
}

/// Custom time window for a query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryTimePeriod {
    /// Start (inclusive), RFC 3339.
    pub from: String,
    /// End (inclusive), RFC 3339.
    pub to: String,
}

/// Dataset section of a query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryDataset {
    /// Granularity (`None` for one row per group).
    pub granularity: String,
    /// Named aggregations.
    pub aggregation: HashMap<String, QueryAggregation>,
    /// Dimensions to group by.
    pub grouping: Vec<QueryGrouping>,
}

/// A single aggregation.
#[derive(Debug, Clone, Serialize)]
pub struct QueryAggregation {
    /// Source column (e.g. `PreTaxCost`).
    pub name: String,
    /// Function (`Sum`).
    pub function: String,
}

/// A single grouping dimension.
#[derive(Debug, Clone, Serialize)]
pub struct QueryGrouping {
    /// Grouping type (`Dimension` or `TagKey`).
    #[serde(rename = "type")]
    pub grouping_type: String,
    /// Dimension name.
    pub name: String,
}

impl QueryGrouping {
    /// Group by a dimension.
    #[must_use]
    pub fn dimension(name: &str) -> Self {
        Self {
            grouping_type: "Dimension".to_string(),
            name: name.to_string(),
        }
    }
}

/// Cost Management query response.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResult {
    /// Result payload.
    pub properties: QueryProperties,
}

/// Query result columns and rows.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryProperties {
    /// Link to the next page, if any.
    #[serde(default)]
    pub next_link: Option<String>,
    /// Column descriptors, in row order.
    #[serde(default)]
    pub columns: Vec<QueryColumn>,
    /// Rows of loosely typed values.
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
}

/// Query result column descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryColumn {
    /// Column name.
    pub name: String,
    /// Column type (`Number`, `String`).
    #[serde(rename = "type", default)]
    pub column_type: Option<String>,
}

// ============================================================================
// Tags
// ============================================================================

/// Response from the Resources Tags API (`.../tags/default`).
#[derive(Debug, Clone, Deserialize)]
pub struct TagsResource {
    /// Tag payload.
    #[serde(default)]
    pub properties: TagsProperties,
}

/// Tags attached to a resource.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagsProperties {
    /// Tag map; Azure omits it when the resource has none.
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
}

// ============================================================================
// Authentication
// ============================================================================

/// OAuth2 token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Bearer token.
    pub access_token: String,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: u64,
    /// Token type (`Bearer`).
    #[serde(default)]
    pub token_type: Option<String>,
}

/// OAuth2 token endpoint error.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenError {
    /// Error code (e.g. `invalid_client`).
    pub error: String,
    /// Description.
    #[serde(default)]
    pub error_description: Option<String>,
}

// ============================================================================
// Error response
// ============================================================================

/// Azure Resource Manager error envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct AzureErrorResponse {
    /// Error body.
    pub error: AzureErrorBody,
}

/// Azure Resource Manager error body.
#[derive(Debug, Clone, Deserialize)]
pub struct AzureErrorBody {
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
}
