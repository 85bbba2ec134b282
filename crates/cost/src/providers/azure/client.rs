//! Azure Cost Management client implementation.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use super::auth::{AzureCredentials, TokenCache};
use super::models::{
    AzureErrorResponse, QueryAggregation, QueryColumn, QueryDataset, QueryDefinition,
    QueryGrouping, QueryResult, QueryTimePeriod, TagsResource,
};
use crate::money::DEFAULT_CURRENCY;
use crate::period::ReportPeriod;
use crate::providers::{CostProvider, CostProviderError, CostRow, UNASSIGNED_RESOURCE_ID};

/// Azure Resource Manager endpoint.
pub const DEFAULT_MANAGEMENT_URL: &str = "https://management.azure.com";

/// Microsoft Entra ID login endpoint.
pub const DEFAULT_LOGIN_URL: &str = "https://login.microsoftonline.com";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Azure API version for Cost Management queries.
const COST_MANAGEMENT_API_VERSION: &str = "2023-03-01";

/// Azure API version for the Tags API.
const TAGS_API_VERSION: &str = "2021-04-01";

/// Upper bound on `nextLink` pages followed per query.
const MAX_PAGES: usize = 100;

/// Column names the cost value may appear under.
const COST_COLUMNS: [&str; 3] = ["PreTaxCost", "Cost", "totalCost"];

/// Azure Cost Management data source for a single subscription.
#[derive(Clone)]
pub struct AzureCostProvider {
    /// HTTP client.
    client: Client,
    /// Service principal credentials.
    credentials: AzureCredentials,
    /// Subscription ID.
    subscription_id: String,
    /// Resource Manager base URL.
    management_url: String,
    /// Entra ID base URL.
    login_url: String,
    /// Cached access token.
    token: Arc<TokenCache>,
}

impl AzureCostProvider {
    /// Create a new Azure cost provider against the public cloud endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials or subscription are blank, or if the
    /// HTTP client cannot be created.
    pub fn new(
        credentials: AzureCredentials,
        subscription_id: impl Into<String>,
    ) -> Result<Self, CostProviderError> {
        Self::with_endpoints(
            credentials,
            subscription_id,
            DEFAULT_MANAGEMENT_URL,
            DEFAULT_LOGIN_URL,
        )
    }

    /// Create a provider against explicit endpoints (sovereign clouds, tests).
    ///
    /// # Errors
    ///
    /// Returns an error if credentials or subscription are blank, or if the
    /// HTTP client cannot be created.
    pub fn with_endpoints(
        credentials: AzureCredentials,
        subscription_id: impl Into<String>,
        management_url: impl Into<String>,
        login_url: impl Into<String>,
    ) -> Result<Self, CostProviderError> {
        credentials.validate()?;

        let subscription_id = subscription_id.into();
        if subscription_id.trim().is_empty() {
            return Err(CostProviderError::Config(
                "Azure subscription ID is required".to_string(),
            ));
        }

        let client = Client::builder()
            .user_agent(concat!("costwatch/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(CostProviderError::Http)?;

        Ok(Self {
            client,
            credentials,
            subscription_id,
            management_url: management_url.into().trim_end_matches('/').to_string(),
            login_url: login_url.into(),
            token: Arc::new(TokenCache::default()),
        })
    }

    /// Subscription scope path.
    fn scope(&self) -> String {
        format!("/subscriptions/{}", self.subscription_id)
    }

    /// Cost Management query URL for the subscription.
    fn query_url(&self) -> String {
        format!(
            "{}{}/providers/Microsoft.CostManagement/query?api-version={COST_MANAGEMENT_API_VERSION}",
            self.management_url,
            self.scope()
        )
    }

    /// Tags API URL for a resource.
    fn tags_url(&self, resource_id: &str) -> String {
        let resource_id = if resource_id.starts_with('/') {
            resource_id.to_string()
        } else {
            format!("/{resource_id}")
        };
        format!(
            "{}{resource_id}/providers/Microsoft.Resources/tags/default?api-version={TAGS_API_VERSION}",
            self.management_url
        )
    }

    /// Build the query body: actual pre-tax cost per resource over the period.
    fn build_query(period: &ReportPeriod) -> QueryDefinition {
        let mut aggregation = HashMap::new();
        aggregation.insert(
            "totalCost".to_string(),
            QueryAggregation {
                name: "PreTaxCost".to_string(),
                function: "Sum".to_string(),
            },
        );

        QueryDefinition {
            cost_type: "ActualCost".to_string(),
            timeframe: "Custom".to_string(),
            time_period: QueryTimePeriod {
                from: period.start_timestamp(),
                to: period.end_timestamp(),
            },
            dataset: QueryDataset {
                granularity: "None".to_string(),
                aggregation,
                grouping: vec![
                    QueryGrouping::dimension("ResourceId"),
                    QueryGrouping::dimension("ResourceType"),
                    QueryGrouping::dimension("ResourceGroupName"),
                ],
            },
        }
    }

    /// Make an authenticated POST request.
    async fn post<T, B>(&self, url: &str, body: &B) -> Result<T, CostProviderError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + Sync,
    {
        debug!(url = %url, "POST request");
        let token = self
            .token
            .bearer(&self.client, &self.login_url, &self.credentials)
            .await?;

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Make an authenticated GET request.
    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, CostProviderError> {
        debug!(url = %url, "GET request");
        let token = self
            .token
            .bearer(&self.client, &self.login_url, &self.credentials)
            .await?;

        let response = self.client.get(url).bearer_auth(token).send().await?;

        Self::handle_response(response).await
    }

    /// Handle API response.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CostProviderError> {
        let status = response.status();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&text).map_err(|e| {
                warn!(error = %e, "Failed to parse Azure response");
                CostProviderError::Serialization(e)
            });
        }

        let message = serde_json::from_str::<AzureErrorResponse>(&text)
            .map_or(text, |e| format!("{}: {}", e.error.code, e.error.message));

        match status {
            StatusCode::NOT_FOUND => Err(CostProviderError::NotFound(message)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(CostProviderError::Auth(message))
            }
            StatusCode::TOO_MANY_REQUESTS => Err(CostProviderError::RateLimited(
                retry_after.map_or(message.clone(), |secs| {
                    format!("{message} (retry after {secs}s)")
                }),
            )),
            _ => Err(CostProviderError::Api {
                status: status.as_u16(),
                message,
            }),
        }
    }

    /// Convert one page of query results into cost rows.
    fn parse_rows(
        columns: &[QueryColumn],
        rows: &[Vec<serde_json::Value>],
    ) -> Result<Vec<CostRow>, CostProviderError> {
        let find = |names: &[&str]| {
            columns
                .iter()
                .position(|c| names.iter().any(|n| c.name.eq_ignore_ascii_case(n)))
        };

        let cost_idx = find(&COST_COLUMNS).ok_or_else(|| {
            CostProviderError::MalformedResponse("query result has no cost column".to_string())
        })?;
        let id_idx = find(&["ResourceId"]).ok_or_else(|| {
            CostProviderError::MalformedResponse(
                "query result has no ResourceId column".to_string(),
            )
        })?;
        let type_idx = find(&["ResourceType"]);
        let group_idx = find(&["ResourceGroupName", "ResourceGroup"]);
        let currency_idx = find(&["Currency"]);

        let mut parsed = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(cost) = row.get(cost_idx).and_then(parse_decimal) else {
                debug!(row = ?row, "Skipping row without a cost value");
                continue;
            };
            let mut resource_id = text_at(row, Some(id_idx));
            if resource_id.is_empty() {
                debug!(row = ?row, "Row has no resource id, counting it as unassigned");
                resource_id = UNASSIGNED_RESOURCE_ID.to_string();
            }

            let cost = if cost.is_sign_negative() {
                debug!(resource_id = %resource_id, cost = %cost, "Clamping negative cost to zero");
                Decimal::ZERO
            } else {
                cost
            };

            let currency = text_at(row, currency_idx);
            parsed.push(CostRow {
                resource_id,
                resource_type: non_empty_or_unknown(text_at(row, type_idx)),
                resource_group: non_empty_or_unknown(text_at(row, group_idx)),
                cost,
                currency: if currency.is_empty() {
                    DEFAULT_CURRENCY.to_string()
                } else {
                    currency
                },
            });
        }

        Ok(parsed)
    }
}

/// String value of a cell, or empty when missing or null.
fn text_at(row: &[serde_json::Value], idx: Option<usize>) -> String {
    match idx.and_then(|i| row.get(i)) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn non_empty_or_unknown(value: String) -> String {
    if value.is_empty() {
        "Unknown".to_string()
    } else {
        value
    }
}

/// Parse a JSON number or numeric string into a decimal.
fn parse_decimal(value: &serde_json::Value) -> Option<Decimal> {
    let text = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

#[async_trait]
impl CostProvider for AzureCostProvider {
    fn name(&self) -> &'static str {
        "azure"
    }

    #[instrument(skip(self, period), fields(provider = "azure", period = %period))]
    async fn query_costs(&self, period: &ReportPeriod) -> Result<Vec<CostRow>, CostProviderError> {
        let body = Self::build_query(period);
        let mut url = self.query_url();
        let mut rows = Vec::new();

        for page in 1..=MAX_PAGES {
            let result: QueryResult = self.post(&url, &body).await?;
            let props = result.properties;
            rows.extend(Self::parse_rows(&props.columns, &props.rows)?);
            debug!(page, rows = rows.len(), "Fetched cost query page");

            match props.next_link {
                Some(next) if !next.is_empty() => url = next,
                _ => break,
            }

            if page == MAX_PAGES {
                warn!(max_pages = MAX_PAGES, "Stopped following cost query pages");
            }
        }

        info!(
            subscription = %self.subscription_id,
            resources = rows.len(),
            "Retrieved resource costs"
        );
        Ok(rows)
    }

    #[instrument(skip(self), fields(provider = "azure"))]
    async fn resource_tags(
        &self,
        resource_id: &str,
    ) -> Result<HashMap<String, String>, CostProviderError> {
        match self.get::<TagsResource>(&self.tags_url(resource_id)).await {
            Ok(resource) => Ok(resource.properties.tags.unwrap_or_default()),
            Err(CostProviderError::NotFound(message)) => {
                debug!(resource_id, message = %message, "Resource no longer exists, no tags");
                Ok(HashMap::new())
            }
            Err(e) => Err(e),
        }
    }
}
