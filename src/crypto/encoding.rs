//! Base58check encoding with Decred's BLAKE-256 checksums.

use super::hash::{Checksum, CHECKSUM_LEN};
use super::CryptoError;

/// Appends the `rule` checksum to `payload` and base58-encodes the result.
pub fn encode_check(payload: &[u8], rule: Checksum) -> String {
    let mut buf = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    buf.extend_from_slice(payload);
    buf.extend_from_slice(&rule.compute(payload));
    bs58::encode(buf).into_string()
}

/// Decodes a base58check string and returns the payload without its checksum.
pub fn decode_check(encoded: &str, rule: Checksum) -> Result<Vec<u8>, CryptoError> {
    let mut buf = bs58::decode(encoded).into_vec()?;
    if buf.len() < CHECKSUM_LEN {
        return Err(CryptoError::InvalidLength {
            expected: CHECKSUM_LEN,
            actual: buf.len(),
        });
    }

    let split = buf.len() - CHECKSUM_LEN;
    if rule.compute(&buf[..split]) != buf[split..] {
        return Err(CryptoError::ChecksumMismatch);
    }
    buf.truncate(split);
    Ok(buf)
}
