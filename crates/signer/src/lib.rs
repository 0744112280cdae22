//! Sign digests with RSA keys held in Azure Key Vault.
//!
//! [`resolve`] turns a key URI into a [`VaultKey`] carrying the key's PKCS#1
//! PEM public key and an authenticated client; [`VaultKey::sign`] asks the
//! vault for an `RS256` signature over a caller-computed digest.

pub mod config;
pub mod error;
pub mod key;
pub mod signing;
pub mod vault;

pub use config::ClientConfig;
pub use error::KeyVaultError;
pub use key::{KeyReference, PublicKeyPem, VaultKey, resolve};
pub use signing::{DigestCodec, SignResult, sign};
pub use vault::{ApiVersion, ClientFactory, Credential, KeyVaultClient, RestClientFactory};
