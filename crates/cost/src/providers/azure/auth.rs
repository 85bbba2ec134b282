//! Service principal authentication against Microsoft Entra ID.

use std::time::{Duration, Instant};

use reqwest::Client;
use tokio::sync::Mutex;
use tracing::debug;

use super::models::{TokenError, TokenResponse};
use crate::providers::CostProviderError;

/// OAuth2 scope for Azure Resource Manager.
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

/// Tokens are refreshed this long before they expire.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Service principal credentials (needs the Cost Management Reader role).
#[derive(Clone)]
pub struct AzureCredentials {
    /// Directory (tenant) ID.
    pub tenant_id: String,
    /// Application (client) ID.
    pub client_id: String,
    /// Client secret.
    pub client_secret: String,
}

impl AzureCredentials {
    /// Create credentials for a service principal.
    #[must_use]
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Check that no field is blank.
    ///
    /// # Errors
    ///
    /// Returns [`CostProviderError::Auth`] naming the first blank field.
    pub fn validate(&self) -> Result<(), CostProviderError> {
        for (field, value) in [
            ("tenant_id", &self.tenant_id),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
        ] {
            if value.trim().is_empty() {
                return Err(CostProviderError::Auth(format!(
                    "Azure {field} is required"
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for AzureCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureCredentials")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Caches the current access token and refreshes it when close to expiry.
#[derive(Default)]
pub(super) struct TokenCache {
    token: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    /// Return a valid bearer token, requesting a new one if needed.
    pub(super) async fn bearer(
        &self,
        client: &Client,
        login_url: &str,
        credentials: &AzureCredentials,
    ) -> Result<String, CostProviderError> {
        let mut guard = self.token.lock().await;

        if let Some(token) = guard.as_ref() {
            if token.expires_at > Instant::now() + TOKEN_REFRESH_MARGIN {
                return Ok(token.value.clone());
            }
        }

        let fresh = request_token(client, login_url, credentials).await?;
        let value = fresh.access_token.clone();
        *guard = Some(CachedToken {
            value: fresh.access_token,
            expires_at: Instant::now() + Duration::from_secs(fresh.expires_in),
        });

        Ok(value)
    }
}

/// Exchange client credentials for an access token.
async fn request_token(
    client: &Client,
    login_url: &str,
    credentials: &AzureCredentials,
) -> Result<TokenResponse, CostProviderError> {
    let url = format!(
        "{}/{}/oauth2/v2.0/token",
        login_url.trim_end_matches('/'),
        credentials.tenant_id
    );
    debug!(url = %url, client_id = %credentials.client_id, "Requesting Azure access token");

    let params = [
        ("grant_type", "client_credentials"),
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
        ("scope", MANAGEMENT_SCOPE),
    ];

    let response = client.post(&url).form(&params).send().await?;
    let status = response.status();
    let text = response.text().await?;

    if status.is_success() {
        return serde_json::from_str(&text).map_err(CostProviderError::Serialization);
    }

    let message = serde_json::from_str::<TokenError>(&text).map_or(text, |e| {
        e.error_description
            .map_or(e.error.clone(), |desc| format!("{}: {desc}", e.error))
    });

    if status.is_client_error() {
        Err(CostProviderError::Auth(message))
    } else {
        Err(CostProviderError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
