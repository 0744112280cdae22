use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyVaultError {
    #[error("Invalid key URI {uri:?}: {reason}")]
    InvalidUri { uri: String, reason: String },
    #[error("Key URI {uri:?} has non-https scheme {scheme:?}")]
    UnsupportedScheme { uri: String, scheme: String },
    #[error("Key URI path {path:?} must have the form /keys/<name>[/<version>]")]
    MalformedKeyPath { path: String },
    #[error("Key URI must be for keys, not {found:?}")]
    WrongObjectType { found: String },
    #[error(
        "A Key Vault object version must be exactly 32 characters long, got {len} in {version:?}"
    )]
    InvalidVersionFormat { version: String, len: usize },
    #[error("Authentication failed: {0}")]
    AuthenticationFailure(String),
    #[error("Key {kid} has unsupported type {kty:?}, only RSA keys can be used")]
    UnsupportedKeyType { kid: String, kty: String },
    #[error("Looking up key {key} failed: {source}")]
    KeyLookupFailure {
        key: String,
        #[source]
        source: Box<KeyVaultError>,
    },
    #[error("Refusing to sign an empty digest")]
    EmptyDigest,
    #[error("Signing with key {key} failed: {source}")]
    SigningFailure {
        key: String,
        #[source]
        source: Box<KeyVaultError>,
    },
    #[error("Invalid response from Key Vault: {0}")]
    InvalidResponse(String),
    #[error("Wire encoding mismatch: {0}")]
    Codec(String),
    #[error(
        "Transport error{}: {message}",
        status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
    )]
    Transport { status: Option<u16>, message: String },
}

impl KeyVaultError {
    /// True for failures detected locally from the key URI, before any network call.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidUri { .. }
                | Self::UnsupportedScheme { .. }
                | Self::MalformedKeyPath { .. }
                | Self::WrongObjectType { .. }
                | Self::InvalidVersionFormat { .. }
        )
    }

    /// HTTP status reported by the service, looking through the per-key wrappers.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::KeyLookupFailure { source, .. } | Self::SigningFailure { source, .. } => {
                source.status()
            }
            _ => None,
        }
    }

    pub(crate) fn key_lookup(key: impl ToString, source: KeyVaultError) -> Self {
        Self::KeyLookupFailure {
            key: key.to_string(),
            source: Box::new(source),
        }
    }

    pub(crate) fn signing(key: impl ToString, source: KeyVaultError) -> Self {
        Self::SigningFailure {
            key: key.to_string(),
            source: Box::new(source),
        }
    }
}

impl From<reqwest::Error> for KeyVaultError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return Self::InvalidResponse(error.to_string());
        }
        Self::Transport {
            status: error.status().map(|s| s.as_u16()),
            message: error.to_string(),
        }
    }
}
