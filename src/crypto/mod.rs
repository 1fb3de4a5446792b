//! Cryptographic operations for Decred key and address generation.
//!
//! This module provides:
//! - Fallible secp256k1 key generation from any CSPRNG
//! - Decred hashing (BLAKE-256, RIPEMD160(BLAKE-256))
//! - Base58check P2PKH addresses and WIF private keys

mod address;
mod encoding;
mod hash;
mod keypair;
mod wif;

pub use address::Address;
pub use encoding::{decode_check, encode_check};
pub use hash::{blake256, hash160, Checksum};
pub use keypair::Keypair;
pub use wif::Wif;

/// Errors raised while generating, encoding or decoding keys and addresses.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("random source failed: {0}")]
    Rng(#[from] rand::Error),

    #[error("invalid secret key: {0}")]
    InvalidSecretKey(secp256k1::Error),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(secp256k1::Error),

    #[error("base58 decoding failed: {0}")]
    Base58(#[from] bs58::decode::Error),

    #[error("invalid payload length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("encoded for another network (version bytes {0:02x?})")]
    WrongNetwork([u8; 2]),

    #[error("unsupported key type {0}")]
    UnsupportedKeyType(u8),

    #[error("re-derived key material does not match the reported address")]
    InconsistentKey,
}
