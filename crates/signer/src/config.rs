use std::time::Duration;

use crate::vault::{ApiVersion, Credential};

pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub const DEFAULT_VAULT_RESOURCE: &str = "https://vault.azure.net";
pub const DEFAULT_IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for [`RestClientFactory`](crate::vault::RestClientFactory).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub credential: Credential,
    pub api_version: ApiVersion,
    pub authority_host: String,
    /// Audience of the vault token; `/.default` is appended for the v2 token endpoint.
    pub vault_resource: String,
    pub imds_endpoint: String,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            api_version: ApiVersion::default(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            vault_resource: DEFAULT_VAULT_RESOURCE.to_string(),
            imds_endpoint: DEFAULT_IMDS_ENDPOINT.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
