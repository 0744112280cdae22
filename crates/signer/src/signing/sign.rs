use tracing::debug;

use crate::error::KeyVaultError;
use crate::key::KeyReference;
use crate::vault::KeyVaultClient;

/// RSASSA-PKCS1-v1_5 with SHA-256. The only algorithm this crate requests.
pub const SIGN_ALGORITHM: &str = "RS256";

/// Output of one remote signing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignResult {
    /// Versioned URI of the key the service used. For an unversioned
    /// reference this names the version that was current at sign time.
    pub key_id: String,
    /// Raw PKCS#1 v1.5 signature, as long as the RSA modulus.
    pub signature: Vec<u8>,
}

/// Signs `digest` with the key at `reference`.
///
/// The digest is passed through as-is: its length is not checked against
/// the algorithm, the service rejects mismatches itself.
pub async fn sign(
    reference: &KeyReference,
    digest: &[u8],
    client: &dyn KeyVaultClient,
) -> Result<SignResult, KeyVaultError> {
    if digest.is_empty() {
        return Err(KeyVaultError::EmptyDigest);
    }

    let codec = client.digest_codec();
    debug!(
        key = %reference,
        codec = codec.name(),
        digest_len = digest.len(),
        "requesting signature"
    );

    let outcome = client
        .sign(
            reference.base_uri(),
            reference.name(),
            reference.version(),
            SIGN_ALGORITHM,
            codec.encode(digest),
        )
        .await
        .map_err(|e| KeyVaultError::signing(reference, e))?;

    let key_id = outcome
        .kid
        .map(|kid| kid.trim().to_string())
        .filter(|kid| !kid.is_empty())
        .ok_or_else(|| {
            KeyVaultError::signing(
                reference,
                KeyVaultError::InvalidResponse("sign response has no key identifier".into()),
            )
        })?;
    let signature = codec
        .decode(outcome.value)
        .map_err(|e| KeyVaultError::signing(reference, e))?;

    debug!(%key_id, signature_len = signature.len(), "digest signed");
    Ok(SignResult { key_id, signature })
}
