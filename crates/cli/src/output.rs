use std::io::{self, Write};

/// Writes the response `pkg` parses from a signing command:
///
/// ```text
/// SIGNATURE
/// <raw signature bytes>
/// CERT
/// <PEM public key>
/// ```
pub fn write_response<W: Write>(
    out: &mut W,
    signature: &[u8],
    public_key_pem: &str,
) -> io::Result<()> {
    out.write_all(b"SIGNATURE\n")?;
    out.write_all(signature)?;
    out.write_all(b"\nCERT\n")?;
    out.write_all(public_key_pem.as_bytes())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_signature_and_cert() {
        let mut out = Vec::new();
        let pem = "-----BEGIN RSA PUBLIC KEY-----\nMAo=\n-----END RSA PUBLIC KEY-----\n";
        write_response(&mut out, &[0x00, 0x0a, 0xff], pem).unwrap();

        let mut expected = b"SIGNATURE\n".to_vec();
        expected.extend_from_slice(&[0x00, 0x0a, 0xff]);
        expected.extend_from_slice(b"\nCERT\n");
        expected.extend_from_slice(pem.as_bytes());
        assert_eq!(out, expected);
    }

    #[test]
    fn signature_bytes_are_written_verbatim() {
        let mut out = Vec::new();
        let signature: Vec<u8> = (0..=255).collect();
        write_response(&mut out, &signature, "").unwrap();
        assert_eq!(&out[10..10 + 256], signature.as_slice());
    }
}
