use std::fmt;

use url::Url;

use crate::error::KeyVaultError;

/// Length of a Key Vault object version identifier.
pub const VERSION_LENGTH: usize = 32;

const KEYS_COLLECTION: &str = "keys";

/// A single key in a vault, as addressed by a key URI.
///
/// Examples of accepted URIs:
///
/// ```text
/// https://vaultname.vault.azure.net/keys/keyName
/// https://vaultname.vault.azure.net/keys/keyName/1371ade5d34f4d77bc193267adface2f
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyReference {
    base_uri: String,
    name: String,
    version: String,
}

impl KeyReference {
    pub fn parse(uri: &str) -> Result<Self, KeyVaultError> {
        let mut parsed = Url::parse(uri).map_err(|e| KeyVaultError::InvalidUri {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.scheme() != "https" {
            return Err(KeyVaultError::UnsupportedScheme {
                uri: uri.to_string(),
                scheme: parsed.scheme().to_string(),
            });
        }

        // Validate the path as written. `Url` resolves dot segments and
        // backslashes, which would turn `/secrets/../keys/n` into a key path.
        let raw = raw_path(uri.trim());
        if raw.contains('\\') {
            return Err(KeyVaultError::MalformedKeyPath {
                path: raw.to_string(),
            });
        }

        // The leading slash always yields an empty first segment.
        let segments: Vec<&str> = raw.split('/').collect();
        if !(3..=4).contains(&segments.len()) {
            return Err(KeyVaultError::MalformedKeyPath {
                path: raw.to_string(),
            });
        }
        if segments[1] != KEYS_COLLECTION {
            return Err(KeyVaultError::WrongObjectType {
                found: segments[1].to_string(),
            });
        }
        if segments[2].is_empty() || is_dot_segment(segments[2]) {
            return Err(KeyVaultError::MalformedKeyPath {
                path: raw.to_string(),
            });
        }
        if let Some(version) = segments.get(3) {
            if version.len() != VERSION_LENGTH {
                return Err(KeyVaultError::InvalidVersionFormat {
                    version: version.to_string(),
                    len: version.len(),
                });
            }
        }

        // Only percent-encoding may differ from here on; take the
        // normalized form of each segment.
        let normalized: Vec<&str> = parsed.path().split('/').collect();
        if normalized.len() != segments.len() {
            return Err(KeyVaultError::MalformedKeyPath {
                path: raw.to_string(),
            });
        }
        let name = normalized[2].to_string();
        let version = normalized.get(3).map(|v| v.to_string()).unwrap_or_default();

        parsed.set_path("/");
        parsed.set_query(None);
        parsed.set_fragment(None);

        Ok(Self {
            base_uri: parsed.to_string(),
            name,
            version,
        })
    }

    /// Vault root, e.g. `https://foo.vault.azure.net/`.
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Empty when the latest version is requested.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_versioned(&self) -> bool {
        !self.version.is_empty()
    }
}

/// Path of `uri` exactly as written: after the authority, before any
/// query or fragment.
fn raw_path(uri: &str) -> &str {
    let rest = uri.split_once("://").map_or(uri, |(_, rest)| rest);
    let start = rest
        .find(|c| matches!(c, '/' | '\\' | '?' | '#'))
        .unwrap_or(rest.len());
    let path = &rest[start..];
    let end = path.find(|c| matches!(c, '?' | '#')).unwrap_or(path.len());
    &path[..end]
}

/// `.` or `..`, including the percent-encoded spellings `Url` also resolves.
fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}

impl fmt::Display for KeyReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}", self.base_uri, KEYS_COLLECTION, self.name)?;
        if self.is_versioned() {
            write!(f, "/{}", self.version)?;
        }
        Ok(())
    }
}
