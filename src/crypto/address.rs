//! Decred pay-to-pubkey-hash addresses.

use std::fmt;

use secp256k1::PublicKey;

use super::encoding::{decode_check, encode_check};
use super::hash::{hash160, Checksum};
use super::CryptoError;
use crate::network::NetworkParams;

/// Payload length: 2 version bytes + 20 byte hash.
const PAYLOAD_LEN: usize = 22;

/// A secp256k1 P2PKH address (network version bytes + HASH160 of the pubkey).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    net_id: [u8; 2],
    hash: [u8; 20],
}

impl Address {
    /// Creates an address from an already computed pubkey hash.
    #[inline]
    pub const fn from_pubkey_hash(hash: [u8; 20], network: &NetworkParams) -> Self {
        Self {
            net_id: network.pubkey_hash_addr_id,
            hash,
        }
    }

    /// Derives the address of a public key.
    #[inline]
    pub fn from_public_key(public_key: &PublicKey, network: &NetworkParams) -> Self {
        Self::from_pubkey_hash(hash160(&public_key.serialize()), network)
    }

    /// Derives the address of a serialized public key.
    ///
    /// The bytes must parse as a valid curve point; the compressed encoding
    /// is what gets hashed regardless of the input form.
    pub fn from_public_key_bytes(
        public_key: &[u8],
        network: &NetworkParams,
    ) -> Result<Self, CryptoError> {
        let public_key = PublicKey::from_slice(public_key).map_err(CryptoError::InvalidPublicKey)?;
        Ok(Self::from_public_key(&public_key, network))
    }

    /// Parses an encoded address, checking checksum and network.
    pub fn decode(encoded: &str, network: &NetworkParams) -> Result<Self, CryptoError> {
        let payload = decode_check(encoded, Checksum::DoubleBlake256)?;
        if payload.len() != PAYLOAD_LEN {
            return Err(CryptoError::InvalidLength {
                expected: PAYLOAD_LEN,
                actual: payload.len(),
            });
        }

        let net_id = [payload[0], payload[1]];
        if net_id != network.pubkey_hash_addr_id {
            return Err(CryptoError::WrongNetwork(net_id));
        }

        let mut hash = [0u8; 20];
        hash.copy_from_slice(&payload[2..]);
        Ok(Self { net_id, hash })
    }

    /// Returns the 20-byte pubkey hash.
    #[inline]
    pub const fn hash(&self) -> &[u8; 20] {
        &self.hash
    }

    /// Returns the base58check string form.
    pub fn encode(&self) -> String {
        let mut payload = [0u8; PAYLOAD_LEN];
        payload[..2].copy_from_slice(&self.net_id);
        payload[2..].copy_from_slice(&self.hash);
        encode_check(&payload, Checksum::DoubleBlake256)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.encode())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}
