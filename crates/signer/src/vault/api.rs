use std::fmt;
use std::str::FromStr;

use crate::signing::{Base64UrlCodec, DigestCodec, RawBytesCodec};

static BASE64URL_CODEC: Base64UrlCodec = Base64UrlCodec;
static RAW_BYTES_CODEC: RawBytesCodec = RawBytesCodec;

/// Key Vault REST API version sent as the `api-version` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiVersion {
    V7_0,
    V7_1,
    V7_2,
    V7_3,
    #[default]
    V7_4,
}

/// How digests and signatures are handed across the client boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Base64UrlText,
    RawBytes,
}

impl ApiVersion {
    pub const ALL: [ApiVersion; 5] = [
        ApiVersion::V7_0,
        ApiVersion::V7_1,
        ApiVersion::V7_2,
        ApiVersion::V7_3,
        ApiVersion::V7_4,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V7_0 => "7.0",
            ApiVersion::V7_1 => "7.1",
            ApiVersion::V7_2 => "7.2",
            ApiVersion::V7_3 => "7.3",
            ApiVersion::V7_4 => "7.4",
        }
    }

    pub fn wire_format(&self) -> WireFormat {
        match self {
            ApiVersion::V7_0 | ApiVersion::V7_1 => WireFormat::Base64UrlText,
            _ => WireFormat::RawBytes,
        }
    }

    pub fn codec(&self) -> &'static dyn DigestCodec {
        match self.wire_format() {
            WireFormat::Base64UrlText => &BASE64URL_CODEC,
            WireFormat::RawBytes => &RAW_BYTES_CODEC,
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApiVersion::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = ApiVersion::ALL.iter().map(|v| v.as_str()).collect();
                format!("unsupported API version {s:?} (expected one of {})", known.join(", "))
            })
    }
}
