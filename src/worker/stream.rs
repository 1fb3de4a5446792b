//! Lazy candidate generation.

use rand::{CryptoRng, RngCore};
use secp256k1::{Secp256k1, SignOnly};

use crate::crypto::{Address, Keypair};
use crate::error::SearchError;
use crate::network::NetworkParams;

/// One generated keypair together with its address.
#[derive(Debug, Clone)]
pub struct Candidate {
    index: u64,
    keypair: Keypair,
    address: Address,
    encoded: String,
}

impl Candidate {
    pub fn new(index: u64, keypair: Keypair, address: Address) -> Self {
        Self {
            index,
            keypair,
            encoded: address.encode(),
            address,
        }
    }

    /// Position of this candidate in the stream that produced it.
    #[inline]
    pub fn index(&self) -> u64 {
        self.index
    }

    #[inline]
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    #[inline]
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The base58check address the patterns are tested against.
    #[inline]
    pub fn encoded(&self) -> &str {
        &self.encoded
    }
}

/// An effectively infinite sequence of independent candidates.
///
/// Each keypair is a fresh draw from the random source; nothing links one
/// candidate to the next. The stream can only be replayed by reseeding the
/// source, never by position.
pub struct KeyStream<R> {
    rng: R,
    secp: Secp256k1<SignOnly>,
    network: NetworkParams,
    next_index: u64,
}

impl<R: RngCore + CryptoRng> KeyStream<R> {
    pub fn new(rng: R, network: NetworkParams) -> Self {
        Self {
            rng,
            secp: Secp256k1::signing_only(),
            network,
            next_index: 0,
        }
    }
}

impl<R: RngCore + CryptoRng> Iterator for KeyStream<R> {
    type Item = Result<Candidate, SearchError>;

    fn next(&mut self) -> Option<Self::Item> {
        let keypair = match Keypair::generate(&self.secp, &mut self.rng) {
            Ok(keypair) => keypair,
            Err(e) => return Some(Err(SearchError::KeyGeneration(e))),
        };
        let address = Address::from_public_key(keypair.public_key(), &self.network);

        let index = self.next_index;
        self.next_index += 1;
        Some(Ok(Candidate::new(index, keypair, address)))
    }
}
