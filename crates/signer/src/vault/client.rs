use std::sync::Arc;

use async_trait::async_trait;

use crate::error::KeyVaultError;
use crate::signing::{DigestCodec, WireValue};
use crate::vault::wire::JsonWebKey;

/// Result of a remote sign operation, before codec decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOutcome {
    /// Versioned key identifier the service actually used.
    pub kid: Option<String>,
    pub value: WireValue,
}

/// Authenticated handle to a key-management service.
///
/// `vault` is the vault root (`https://<host>/`); an empty `version`
/// addresses the latest version of the key. Implementations are
/// read-only after construction and may be shared across tasks.
#[async_trait]
pub trait KeyVaultClient: Send + Sync {
    /// Fetch the public part of a key.
    async fn get_key(
        &self,
        vault: &str,
        name: &str,
        version: &str,
    ) -> Result<JsonWebKey, KeyVaultError>;

    /// Sign a digest with the named key.
    async fn sign(
        &self,
        vault: &str,
        name: &str,
        version: &str,
        algorithm: &str,
        digest: WireValue,
    ) -> Result<SignOutcome, KeyVaultError>;

    /// Encoding this client expects for digests and returns for signatures.
    fn digest_codec(&self) -> &'static dyn DigestCodec;
}

/// Produces authenticated clients. Failures here are credential or
/// environment problems and are reported as
/// [`KeyVaultError::AuthenticationFailure`].
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn KeyVaultClient>, KeyVaultError>;
}
