use std::fmt;

use reqwest::Client;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::KeyVaultError;
use crate::vault::wire::{ErrorDetail, TokenResponse};

const IMDS_API_VERSION: &str = "2018-02-01";

/// How to obtain an access token for the vault.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// OAuth2 client-credentials grant against Azure AD.
    ClientSecret {
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
    /// Azure instance metadata service, optionally for a user-assigned identity.
    ManagedIdentity { client_id: Option<String> },
}

impl Credential {
    /// Picks a credential the way the Azure environment authorizer does:
    /// a service principal when tenant, client id and secret are all
    /// present, otherwise managed identity.
    pub fn from_parts(
        tenant_id: Option<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Self {
        match (tenant_id, client_id, client_secret) {
            (Some(tenant_id), Some(client_id), Some(client_secret)) => Credential::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            },
            (_, client_id, _) => Credential::ManagedIdentity { client_id },
        }
    }

    pub async fn access_token(
        &self,
        http: &Client,
        config: &ClientConfig,
    ) -> Result<String, KeyVaultError> {
        let request = match self {
            Credential::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            } => {
                let endpoint = format!(
                    "{}/{}/oauth2/v2.0/token",
                    config.authority_host.trim_end_matches('/'),
                    tenant_id
                );
                debug!(%endpoint, %client_id, "requesting client-credentials token");
                let scope = format!("{}/.default", config.vault_resource.trim_end_matches('/'));
                http.post(endpoint).form(&[
                    ("grant_type", "client_credentials"),
                    ("client_id", client_id.as_str()),
                    ("client_secret", client_secret.as_str()),
                    ("scope", scope.as_str()),
                ])
            }
            Credential::ManagedIdentity { client_id } => {
                debug!(endpoint = %config.imds_endpoint, "requesting managed identity token");
                let mut query = vec![
                    ("api-version", IMDS_API_VERSION),
                    ("resource", config.vault_resource.as_str()),
                ];
                if let Some(client_id) = client_id {
                    query.push(("client_id", client_id.as_str()));
                }
                http.get(&config.imds_endpoint)
                    .header("Metadata", "true")
                    .query(&query)
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| {
                KeyVaultError::AuthenticationFailure(format!("token request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KeyVaultError::AuthenticationFailure(format!(
                "token endpoint returned HTTP {}: {}",
                status.as_u16(),
                describe_token_error(&body)
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| {
                KeyVaultError::AuthenticationFailure(format!("malformed token response: {e}"))
            })?;
        Ok(token.access_token)
    }
}

// Azure AD reports `{"error": "...", "error_description": "..."}` rather than the vault's shape.
fn describe_token_error(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match (value["error"].as_str(), value["error_description"].as_str()) {
            (Some(code), Some(description)) => format!("{code}: {description}"),
            (Some(code), None) => code.to_string(),
            _ => ErrorDetail::describe(body),
        },
        Err(_) => body.trim().to_string(),
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::ClientSecret {
                tenant_id, client_id, ..
            } => f
                .debug_struct("ClientSecret")
                .field("tenant_id", tenant_id)
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .finish(),
            Credential::ManagedIdentity { client_id } => f
                .debug_struct("ManagedIdentity")
                .field("client_id", client_id)
                .finish(),
        }
    }
}
