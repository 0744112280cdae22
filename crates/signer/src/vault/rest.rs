use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::KeyVaultError;
use crate::signing::{DigestCodec, WireValue};
use crate::vault::api::{ApiVersion, WireFormat};
use crate::vault::client::{ClientFactory, KeyVaultClient, SignOutcome};
use crate::vault::wire::{
    BASE64URL, ErrorDetail, JsonWebKey, KeyBundle, KeyOperationResult, KeySignParameters,
};

/// [`KeyVaultClient`] speaking the Key Vault REST API with a bearer token.
pub struct RestClient {
    http: Client,
    token: String,
    api_version: ApiVersion,
}

impl RestClient {
    pub fn new(http: Client, token: impl Into<String>, api_version: ApiVersion) -> Self {
        Self {
            http,
            token: token.into(),
            api_version,
        }
    }

    pub fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .query(&[("api-version", self.api_version.as_str())])
    }

    async fn check(response: Response) -> Result<Response, KeyVaultError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = ErrorDetail::describe(&body);
        Err(match status {
            StatusCode::UNAUTHORIZED => KeyVaultError::AuthenticationFailure(message),
            _ => KeyVaultError::Transport {
                status: Some(status.as_u16()),
                message,
            },
        })
    }
}

/// `{vault}/keys/{name}` or `{vault}/keys/{name}/{version}`.
pub(crate) fn key_url(vault: &str, name: &str, version: &str) -> String {
    let vault = vault.trim_end_matches('/');
    if version.is_empty() {
        format!("{vault}/keys/{name}")
    } else {
        format!("{vault}/keys/{name}/{version}")
    }
}

/// The version segment is always present, so the latest version is
/// addressed as `keys/{name}//sign`.
pub(crate) fn sign_url(vault: &str, name: &str, version: &str) -> String {
    format!("{}/keys/{name}/{version}/sign", vault.trim_end_matches('/'))
}

#[async_trait]
impl KeyVaultClient for RestClient {
    async fn get_key(
        &self,
        vault: &str,
        name: &str,
        version: &str,
    ) -> Result<JsonWebKey, KeyVaultError> {
        let url = key_url(vault, name, version);
        debug!(%url, api_version = %self.api_version, "fetching key");

        let response = self.authorized(self.http.get(&url)).send().await?;
        let bundle: KeyBundle = Self::check(response).await?.json().await?;
        Ok(bundle.key)
    }

    async fn sign(
        &self,
        vault: &str,
        name: &str,
        version: &str,
        algorithm: &str,
        digest: WireValue,
    ) -> Result<SignOutcome, KeyVaultError> {
        let url = sign_url(vault, name, version);
        debug!(%url, %algorithm, api_version = %self.api_version, "signing digest");

        let value = match digest {
            WireValue::Text(text) => text,
            WireValue::Bytes(bytes) => BASE64URL.encode(bytes),
        };
        let parameters = KeySignParameters {
            alg: algorithm.to_string(),
            value,
        };

        let response = self
            .authorized(self.http.post(&url))
            .json(&parameters)
            .send()
            .await?;
        let result: KeyOperationResult = Self::check(response).await?.json().await?;

        let value = result
            .value
            .ok_or_else(|| KeyVaultError::InvalidResponse("sign response has no value".into()))?;
        let value = match self.api_version.wire_format() {
            WireFormat::Base64UrlText => WireValue::Text(value),
            WireFormat::RawBytes => WireValue::Bytes(BASE64URL.decode(value.trim()).map_err(|e| {
                KeyVaultError::InvalidResponse(format!("sign response value is not base64url: {e}"))
            })?),
        };

        Ok(SignOutcome { kid: result.kid, value })
    }

    fn digest_codec(&self) -> &'static dyn DigestCodec {
        self.api_version.codec()
    }
}

/// Acquires a token for the configured credential and hands out [`RestClient`]s.
pub struct RestClientFactory {
    config: ClientConfig,
}

impl RestClientFactory {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ClientFactory for RestClientFactory {
    async fn connect(&self) -> Result<Arc<dyn KeyVaultClient>, KeyVaultError> {
        let http = Client::builder()
            .timeout(self.config.request_timeout)
            .build()
            .map_err(|e| {
                KeyVaultError::AuthenticationFailure(format!("building HTTP client: {e}"))
            })?;

        let token = self.config.credential.access_token(&http, &self.config).await?;
        debug!(api_version = %self.config.api_version, "obtained vault access token");

        Ok(Arc::new(RestClient::new(http, token, self.config.api_version)))
    }
}
