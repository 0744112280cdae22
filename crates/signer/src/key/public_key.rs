use std::fmt;

use base64::Engine as _;
use rsa::pkcs1::{EncodeRsaPublicKey, LineEnding};
use rsa::{BigUint, RsaPublicKey};

use crate::error::KeyVaultError;
use crate::vault::wire::{BASE64URL, JsonWebKey};

/// PEM label of the emitted key. PKCS#1 `RSAPublicKey`, not SubjectPublicKeyInfo;
/// switching formats breaks every downstream verifier.
pub const PEM_LABEL: &str = "RSA PUBLIC KEY";

const RSA_KEY_TYPES: [&str; 2] = ["RSA", "RSA-HSM"];

/// PEM-encoded RSA public key of a resolved vault key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyPem(String);

impl PublicKeyPem {
    pub fn encode(key: &RsaPublicKey) -> Result<Self, KeyVaultError> {
        key.to_pkcs1_pem(LineEnding::LF)
            .map(Self)
            .map_err(|e| KeyVaultError::InvalidResponse(format!("encoding RSA public key: {e}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PublicKeyPem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Converts a JSON Web Key from the vault into an RSA public key.
///
/// `key_id` names the key in errors when the JWK carries no `kid`.
pub fn rsa_public_key(jwk: &JsonWebKey, key_id: &str) -> Result<RsaPublicKey, KeyVaultError> {
    let kid = jwk.kid.as_deref().unwrap_or(key_id);
    if !RSA_KEY_TYPES.contains(&jwk.kty.as_str()) {
        return Err(KeyVaultError::UnsupportedKeyType {
            kid: kid.to_string(),
            kty: jwk.kty.clone(),
        });
    }

    let n = component(jwk.n.as_deref(), "n", kid)?;
    let e = component(jwk.e.as_deref(), "e", kid)?;
    RsaPublicKey::new(n, e).map_err(|err| {
        KeyVaultError::InvalidResponse(format!("key {kid} is not a usable RSA key: {err}"))
    })
}

fn component(value: Option<&str>, field: &str, kid: &str) -> Result<BigUint, KeyVaultError> {
    let encoded = value.filter(|v| !v.is_empty()).ok_or_else(|| {
        KeyVaultError::InvalidResponse(format!("key {kid} has no '{field}' component"))
    })?;
    let bytes = BASE64URL.decode(encoded).map_err(|err| {
        KeyVaultError::InvalidResponse(format!(
            "key {kid} has malformed '{field}' component: {err}"
        ))
    })?;
    Ok(BigUint::from_bytes_be(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs1::DecodeRsaPublicKey;
    use rsa::traits::PublicKeyParts;

    // RFC 7517 appendix A.1 example modulus (2048-bit).
    const N: &str = "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw";

    fn rsa_jwk() -> JsonWebKey {
        JsonWebKey {
            kid: Some(
                "https://foo.vault.azure.net/keys/bar/1371ade5d34f4d77bc193267adface2f".into(),
            ),
            kty: "RSA".into(),
            key_ops: vec!["sign".into(), "verify".into()],
            n: Some(N.into()),
            e: Some("AQAB".into()),
            crv: None,
        }
    }

    #[test]
    fn converts_rsa_jwk() {
        let key = rsa_public_key(&rsa_jwk(), "bar").unwrap();
        assert_eq!(key.size(), 256);
        assert_eq!(key.e(), &BigUint::from(65537u32));
    }

    #[test]
    fn accepts_hsm_keys() {
        let jwk = JsonWebKey {
            kty: "RSA-HSM".into(),
            ..rsa_jwk()
        };
        assert!(rsa_public_key(&jwk, "bar").is_ok());
    }

    #[test]
    fn rejects_ec_keys() {
        let jwk = JsonWebKey {
            kid: None,
            kty: "EC".into(),
            crv: Some("P-256".into()),
            n: None,
            e: None,
            ..rsa_jwk()
        };
        let err = rsa_public_key(&jwk, "https://foo.vault.azure.net/keys/ec").unwrap_err();
        match err {
            KeyVaultError::UnsupportedKeyType { kid, kty } => {
                assert_eq!(kid, "https://foo.vault.azure.net/keys/ec");
                assert_eq!(kty, "EC");
            }
            other => panic!("expected UnsupportedKeyType, got {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_modulus() {
        let jwk = JsonWebKey { n: None, ..rsa_jwk() };
        let err = rsa_public_key(&jwk, "bar").unwrap_err();
        assert!(err.to_string().contains("'n'"));
    }

    #[test]
    fn rejects_malformed_exponent() {
        let jwk = JsonWebKey {
            e: Some("not base64!".into()),
            ..rsa_jwk()
        };
        let err = rsa_public_key(&jwk, "bar").unwrap_err();
        assert!(matches!(err, KeyVaultError::InvalidResponse(_)));
    }

    #[test]
    fn pem_is_pkcs1() {
        let key = rsa_public_key(&rsa_jwk(), "bar").unwrap();
        let pem = PublicKeyPem::encode(&key).unwrap();
        assert!(pem.as_str().starts_with(&format!("-----BEGIN {PEM_LABEL}-----\n")));
        assert!(pem.as_str().trim_end().ends_with(&format!("-----END {PEM_LABEL}-----")));

        let decoded = RsaPublicKey::from_pkcs1_pem(pem.as_str()).unwrap();
        assert_eq!(decoded, key);
    }
}
