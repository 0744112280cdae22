use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::time::timeout;

/// Raw SHA-256 digest length.
pub const DIGEST_LENGTH: usize = 32;
/// Length of the hex digest `pkg` writes on stdin.
pub const DIGEST_HEX_LENGTH: usize = DIGEST_LENGTH * 2;

// Room for the digest, a line ending and some padding; anything longer is rejected.
const MAX_INPUT: u64 = DIGEST_HEX_LENGTH as u64 + 16;

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("Timed out after {0:?} waiting for the digest on stdin")]
    Timeout(Duration),
    #[error("Unable to read digest: {0}")]
    Io(#[from] std::io::Error),
    #[error(
        "Digest has invalid length {len} (should be {expected}): {digest:?}",
        expected = DIGEST_HEX_LENGTH
    )]
    InvalidLength { len: usize, digest: String },
    #[error("Digest is not hex: {0:?}")]
    NotHex(String),
}

/// Reads the hex digest from `reader`, waiting at most `wait`.
///
/// Reading stops at the first newline or at end of input, so a caller that
/// keeps the pipe open after writing the digest does not stall the read.
pub async fn read_digest<R>(reader: R, wait: Duration) -> Result<String, DigestError>
where
    R: AsyncRead + Unpin,
{
    let mut line = String::new();
    let mut reader = BufReader::new(reader.take(MAX_INPUT));
    timeout(wait, reader.read_line(&mut line))
        .await
        .map_err(|_| DigestError::Timeout(wait))??;

    let digest = line.trim().trim_matches('\0').to_string();
    if digest.len() != DIGEST_HEX_LENGTH {
        return Err(DigestError::InvalidLength {
            len: digest.len(),
            digest,
        });
    }
    if hex::decode(&digest).is_err() {
        return Err(DigestError::NotHex(digest));
    }
    Ok(digest)
}

/// `pkg` verifies the signature over SHA-256 of the hex digest text, not
/// over the artifact digest itself.
pub fn digest_of_digest(hex_digest: &str) -> [u8; DIGEST_LENGTH] {
    Sha256::digest(hex_digest.as_bytes()).into()
}
