//! Decred hash functions.

/// Length of the base58check checksum in bytes.
pub const CHECKSUM_LEN: usize = 4;

/// BLAKE-256 (14 rounds), the hash Decred uses in place of SHA-256.
pub fn blake256(data: &[u8]) -> [u8; 32] {
    use blake_hash::Digest;

    let digest = blake_hash::Blake256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// RIPEMD160(BLAKE256(data)), the 20-byte digest committed to by P2PKH addresses.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    use ripemd::{Digest, Ripemd160};

    let digest = Ripemd160::digest(blake256(data));
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest);
    out
}

/// Checksum rule of a base58check payload.
///
/// Addresses commit to a double BLAKE-256, private keys in wallet import
/// format to a single one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checksum {
    /// First four bytes of BLAKE256(BLAKE256(payload)).
    DoubleBlake256,
    /// First four bytes of BLAKE256(payload).
    Blake256,
}

impl Checksum {
    pub fn compute(self, data: &[u8]) -> [u8; CHECKSUM_LEN] {
        let hash = match self {
            Checksum::DoubleBlake256 => blake256(&blake256(data)),
            Checksum::Blake256 => blake256(data),
        };
        let mut out = [0u8; CHECKSUM_LEN];
        out.copy_from_slice(&hash[..CHECKSUM_LEN]);
        out
    }
}
