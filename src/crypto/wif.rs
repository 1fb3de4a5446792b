//! Wallet import format for Decred private keys.
//!
//! Layout before base58check: network id (2) | key type (1) | scalar (32).
//! Unlike addresses, the checksum is a single BLAKE-256 of that payload.

use std::fmt;

use secp256k1::SecretKey;

use super::encoding::{decode_check, encode_check};
use super::hash::Checksum;
use super::CryptoError;
use crate::network::NetworkParams;

/// Key type byte of secp256k1 keys.
pub const EC_TYPE_SECP256K1: u8 = 0;

const PAYLOAD_LEN: usize = 2 + 1 + 32;

/// A private key bound to the network it is exported for.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Wif {
    net_id: [u8; 2],
    secret_key: SecretKey,
}

impl Wif {
    pub fn new(secret_key: SecretKey, network: &NetworkParams) -> Self {
        Self {
            net_id: network.private_key_id,
            secret_key,
        }
    }

    /// Parses a WIF string, checking checksum, network and key type.
    pub fn decode(encoded: &str, network: &NetworkParams) -> Result<Self, CryptoError> {
        let payload = decode_check(encoded, Checksum::Blake256)?;
        if payload.len() != PAYLOAD_LEN {
            return Err(CryptoError::InvalidLength {
                expected: PAYLOAD_LEN,
                actual: payload.len(),
            });
        }

        let net_id = [payload[0], payload[1]];
        if net_id != network.private_key_id {
            return Err(CryptoError::WrongNetwork(net_id));
        }
        if payload[2] != EC_TYPE_SECP256K1 {
            return Err(CryptoError::UnsupportedKeyType(payload[2]));
        }

        let secret_key = SecretKey::from_slice(&payload[3..]).map_err(CryptoError::InvalidSecretKey)?;
        Ok(Self { net_id, secret_key })
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    pub fn encode(&self) -> String {
        let mut payload = [0u8; PAYLOAD_LEN];
        payload[..2].copy_from_slice(&self.net_id);
        payload[2] = EC_TYPE_SECP256K1;
        payload[3..].copy_from_slice(&self.secret_key.secret_bytes());
        encode_check(&payload, Checksum::Blake256)
    }
}

// Never print the scalar through Debug.
impl fmt::Debug for Wif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wif")
            .field("net_id", &hex::encode(self.net_id))
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Wif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}
