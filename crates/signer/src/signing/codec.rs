use std::fmt;

use base64::Engine as _;

use crate::error::KeyVaultError;
use crate::vault::wire::BASE64URL;

/// A digest or signature as it crosses the
/// [`KeyVaultClient`](crate::vault::KeyVaultClient) boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireValue {
    /// base64url text placed verbatim in the JSON `value` field.
    Text(String),
    /// Raw bytes; the client does the JSON encoding itself.
    Bytes(Vec<u8>),
}

impl WireValue {
    fn kind(&self) -> &'static str {
        match self {
            WireValue::Text(_) => "text",
            WireValue::Bytes(_) => "bytes",
        }
    }
}

/// Maps digests and signatures to and from the representation a client
/// generation expects.
///
/// Selected once per client from its API version. A codec never accepts the
/// other representation: a client returning the wrong shape means the codec
/// and client disagree about the protocol, and signing fails loudly rather
/// than producing a garbage signature.
pub trait DigestCodec: Send + Sync + fmt::Debug {
    fn encode(&self, digest: &[u8]) -> WireValue;

    fn decode(&self, value: WireValue) -> Result<Vec<u8>, KeyVaultError>;

    /// Codec name (e.g. "base64url").
    fn name(&self) -> &str;
}

/// Legacy clients (API 7.0 / 7.1) take unpadded base64url text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64UrlCodec;

/// Current clients (API 7.2+) take and return raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawBytesCodec;

impl DigestCodec for Base64UrlCodec {
    fn encode(&self, digest: &[u8]) -> WireValue {
        WireValue::Text(BASE64URL.encode(digest))
    }

    fn decode(&self, value: WireValue) -> Result<Vec<u8>, KeyVaultError> {
        match value {
            WireValue::Text(text) => BASE64URL.decode(text.trim()).map_err(|e| {
                KeyVaultError::Codec(format!("signature is not valid base64url: {e}"))
            }),
            other => Err(mismatch(self.name(), &other)),
        }
    }

    fn name(&self) -> &str {
        "base64url"
    }
}

impl DigestCodec for RawBytesCodec {
    fn encode(&self, digest: &[u8]) -> WireValue {
        WireValue::Bytes(digest.to_vec())
    }

    fn decode(&self, value: WireValue) -> Result<Vec<u8>, KeyVaultError> {
        match value {
            WireValue::Bytes(bytes) => Ok(bytes),
            other => Err(mismatch(self.name(), &other)),
        }
    }

    fn name(&self) -> &str {
        "raw"
    }
}

fn mismatch(codec: &str, value: &WireValue) -> KeyVaultError {
    KeyVaultError::Codec(format!(
        "{codec} codec received a {} value from the client",
        value.kind()
    ))
}
