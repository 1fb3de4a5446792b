//! Decred network parameters.
//!
//! Only the values the vanity search needs are carried: the version bytes of
//! pay-to-pubkey-hash addresses and WIF private keys, plus the two-character
//! prefix every encoded P2PKH address starts with on that network.

use std::fmt;

/// Address and key encoding parameters of one Decred network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkParams {
    /// Human-readable network name
    pub name: &'static str,
    /// Version bytes of secp256k1 pay-to-pubkey-hash addresses
    pub pubkey_hash_addr_id: [u8; 2],
    /// Version bytes of WIF-encoded private keys
    pub private_key_id: [u8; 2],
    /// Leading characters shared by every encoded P2PKH address
    pub address_prefix: &'static str,
}

impl NetworkParams {
    pub const MAINNET: NetworkParams = NetworkParams {
        name: "mainnet",
        pubkey_hash_addr_id: [0x07, 0x3f],
        private_key_id: [0x22, 0xde],
        address_prefix: "Ds",
    };

    pub const TESTNET: NetworkParams = NetworkParams {
        name: "testnet",
        pubkey_hash_addr_id: [0x0f, 0x21],
        private_key_id: [0x23, 0x0e],
        address_prefix: "Ts",
    };

    pub const SIMNET: NetworkParams = NetworkParams {
        name: "simnet",
        pubkey_hash_addr_id: [0x0e, 0x91],
        private_key_id: [0x23, 0x07],
        address_prefix: "Ss",
    };
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self::MAINNET
    }
}

impl fmt::Display for NetworkParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
