//! JSON bodies exchanged with the Key Vault REST API and the token endpoints.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::{Deserialize, Serialize};

/// base64url as used by JWK and Key Vault: unpadded on output, padding tolerated on input.
pub const BASE64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Public half of a key as returned by `GET /keys/{name}/{version}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonWebKey {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    pub kty: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_ops: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeyBundle {
    pub key: JsonWebKey,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeySignParameters {
    pub alg: String,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeyOperationResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl ErrorDetail {
    /// Renders a service error body, falling back to the raw text when it is not JSON.
    pub fn describe(body: &str) -> String {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody { error }) if !error.code.is_empty() => {
                format!("{}: {}", error.code, error.message)
            }
            _ => body.trim().to_string(),
        }
    }
}

/// OAuth2 token response from Azure AD or the instance metadata service.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}
