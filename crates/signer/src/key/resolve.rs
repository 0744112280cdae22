use std::fmt;
use std::sync::Arc;

use rsa::traits::PublicKeyParts;
use tracing::{info, warn};

use crate::error::KeyVaultError;
use crate::key::public_key::{PublicKeyPem, rsa_public_key};
use crate::key::reference::KeyReference;
use crate::signing::{SignResult, sign};
use crate::vault::{ClientFactory, KeyVaultClient};

/// A key resolved against its vault: where it lives, its public key, and
/// the authenticated client used to reach it.
#[derive(Clone)]
pub struct VaultKey {
    reference: KeyReference,
    public_key: PublicKeyPem,
    modulus_len: usize,
    client: Arc<dyn KeyVaultClient>,
}

impl VaultKey {
    pub fn reference(&self) -> &KeyReference {
        &self.reference
    }

    pub fn public_key_pem(&self) -> &PublicKeyPem {
        &self.public_key
    }

    /// RSA modulus length in bytes; every signature has this length.
    pub fn modulus_len(&self) -> usize {
        self.modulus_len
    }

    pub fn client(&self) -> &Arc<dyn KeyVaultClient> {
        &self.client
    }

    /// Sign `digest` with this key.
    pub async fn sign(&self, digest: &[u8]) -> Result<SignResult, KeyVaultError> {
        sign(&self.reference, digest, self.client.as_ref()).await
    }
}

impl fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultKey")
            .field("reference", &self.reference)
            .field("modulus_len", &self.modulus_len)
            .finish_non_exhaustive()
    }
}

/// Validates `uri`, authenticates through `factory` and fetches the key's
/// public half.
///
/// URI validation happens before any network traffic, so a malformed URI
/// never touches the credential chain.
pub async fn resolve(uri: &str, factory: &dyn ClientFactory) -> Result<VaultKey, KeyVaultError> {
    let reference = KeyReference::parse(uri)?;

    let client = factory.connect().await.map_err(|e| match e {
        e @ KeyVaultError::AuthenticationFailure(_) => e,
        other => KeyVaultError::AuthenticationFailure(other.to_string()),
    })?;

    let jwk = client
        .get_key(reference.base_uri(), reference.name(), reference.version())
        .await
        .map_err(|e| KeyVaultError::key_lookup(&reference, e))?;
    if !jwk.key_ops.is_empty() && !jwk.key_ops.iter().any(|op| op == "sign") {
        warn!(key = %reference, key_ops = ?jwk.key_ops, "key does not permit the sign operation");
    }

    let public_key = rsa_public_key(&jwk, &reference.to_string())?;
    let modulus_len = public_key.size();
    let pem = PublicKeyPem::encode(&public_key)?;

    info!(
        key = %reference,
        kid = jwk.kid.as_deref().unwrap_or_default(),
        bits = modulus_len * 8,
        "resolved vault key"
    );

    Ok(VaultKey {
        reference,
        public_key: pem,
        modulus_len,
        client,
    })
}
