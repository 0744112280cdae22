#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use akv_signer::signing::{DigestCodec, WireValue};
use akv_signer::vault::wire::BASE64URL;
use akv_signer::vault::{ApiVersion, JsonWebKey, SignOutcome, WireFormat};
use akv_signer::{ClientFactory, KeyVaultClient, KeyVaultError};
use async_trait::async_trait;
use base64::Engine as _;
use rand_chacha::ChaCha20Rng;
use rand_chacha::rand_core::SeedableRng;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

pub const KEY_VERSION: &str = "1371ade5d34f4d77bc193267adface2f";
pub const RSA_KEY_BITS: usize = 2048;

/// Deterministic RSA key derived from a seed string. Generated once per test binary.
pub fn test_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        let hash = Sha256::digest(b"akv-signer-test-key");
        let mut rng = ChaCha20Rng::from_seed(hash.into());
        RsaPrivateKey::new(&mut rng, RSA_KEY_BITS).expect("generating RSA test key")
    })
}

pub fn rsa_jwk(kid: String, public_key: &RsaPublicKey) -> JsonWebKey {
    JsonWebKey {
        kid: Some(kid),
        kty: "RSA".into(),
        key_ops: vec!["sign".into(), "verify".into()],
        n: Some(BASE64URL.encode(public_key.n().to_bytes_be())),
        e: Some(BASE64URL.encode(public_key.e().to_bytes_be())),
        crv: None,
    }
}

/// Signs a SHA-256 digest the way the vault does for `RS256`.
pub fn vault_sign(key: &RsaPrivateKey, digest: &[u8]) -> Result<Vec<u8>, KeyVaultError> {
    key.sign(Pkcs1v15Sign::new::<Sha256>(), digest)
        .map_err(|e| KeyVaultError::Transport {
            status: Some(400),
            message: format!("BadParameter: {e}"),
        })
}

pub fn verify(public_key: &RsaPublicKey, digest: &[u8], signature: &[u8]) -> bool {
    public_key
        .verify(Pkcs1v15Sign::new::<Sha256>(), digest, signature)
        .is_ok()
}

/// In-process stand-in for a vault holding a single key.
pub struct FakeVault {
    pub vault: String,
    pub name: String,
    pub kty: String,
    pub api_version: ApiVersion,
    pub sign_calls: AtomicUsize,
}

impl FakeVault {
    pub fn new(vault: &str, name: &str, api_version: ApiVersion) -> Self {
        Self {
            vault: vault.to_string(),
            name: name.to_string(),
            kty: "RSA".into(),
            api_version,
            sign_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_key_type(mut self, kty: &str) -> Self {
        self.kty = kty.to_string();
        self
    }

    pub fn kid(&self) -> String {
        format!("{}keys/{}/{}", self.vault, self.name, KEY_VERSION)
    }

    fn find(&self, vault: &str, name: &str, version: &str) -> Result<(), KeyVaultError> {
        if vault != self.vault
            || name != self.name
            || !(version.is_empty() || version == KEY_VERSION)
        {
            return Err(KeyVaultError::Transport {
                status: Some(404),
                message: format!(
                    "KeyNotFound: A key with (name/id) {name} was not found in this key vault."
                ),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl KeyVaultClient for FakeVault {
    async fn get_key(
        &self,
        vault: &str,
        name: &str,
        version: &str,
    ) -> Result<JsonWebKey, KeyVaultError> {
        self.find(vault, name, version)?;
        let mut jwk = rsa_jwk(self.kid(), &test_key().to_public_key());
        jwk.kty = self.kty.clone();
        Ok(jwk)
    }

    async fn sign(
        &self,
        vault: &str,
        name: &str,
        version: &str,
        algorithm: &str,
        digest: WireValue,
    ) -> Result<SignOutcome, KeyVaultError> {
        self.find(vault, name, version)?;
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(algorithm, "RS256");

        let digest = match (self.api_version.wire_format(), digest) {
            (WireFormat::Base64UrlText, WireValue::Text(text)) => BASE64URL.decode(text).unwrap(),
            (WireFormat::RawBytes, WireValue::Bytes(bytes)) => bytes,
            (format, value) => panic!("{format:?} client received {value:?}"),
        };
        let signature = vault_sign(test_key(), &digest)?;
        let value = match self.api_version.wire_format() {
            WireFormat::Base64UrlText => WireValue::Text(BASE64URL.encode(signature)),
            WireFormat::RawBytes => WireValue::Bytes(signature),
        };
        Ok(SignOutcome {
            kid: Some(self.kid()),
            value,
        })
    }

    fn digest_codec(&self) -> &'static dyn DigestCodec {
        self.api_version.codec()
    }
}

/// Hands out a fixed client, or fails like a broken credential chain.
pub struct FakeFactory {
    pub client: Option<Arc<dyn KeyVaultClient>>,
    pub failure: Option<fn() -> KeyVaultError>,
    pub connects: AtomicUsize,
}

impl FakeFactory {
    pub fn new(client: Arc<dyn KeyVaultClient>) -> Self {
        Self {
            client: Some(client),
            failure: None,
            connects: AtomicUsize::new(0),
        }
    }

    pub fn failing(failure: fn() -> KeyVaultError) -> Self {
        Self {
            client: None,
            failure: Some(failure),
            connects: AtomicUsize::new(0),
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientFactory for FakeFactory {
    async fn connect(&self) -> Result<Arc<dyn KeyVaultClient>, KeyVaultError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        match (&self.client, self.failure) {
            (Some(client), _) => Ok(client.clone()),
            (None, Some(failure)) => Err(failure()),
            (None, None) => unreachable!("factory needs a client or a failure"),
        }
    }
}
