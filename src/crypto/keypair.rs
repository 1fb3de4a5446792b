//! secp256k1 keypair generation.

use rand::{CryptoRng, RngCore};
use secp256k1::{PublicKey, Secp256k1, SecretKey, Signing};

use super::CryptoError;

/// A secp256k1 secret scalar and its public point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keypair {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl Keypair {
    /// Draws a fresh keypair from `rng`.
    ///
    /// A failing random source aborts with [`CryptoError::Rng`] instead of
    /// retrying. Draws that fall outside the curve order are discarded and
    /// redrawn, as `Secp256k1::generate_keypair` does.
    pub fn generate<C, R>(secp: &Secp256k1<C>, rng: &mut R) -> Result<Self, CryptoError>
    where
        C: Signing,
        R: RngCore + CryptoRng + ?Sized,
    {
        let mut bytes = [0u8; 32];
        loop {
            rng.try_fill_bytes(&mut bytes)?;
            if let Ok(secret_key) = SecretKey::from_slice(&bytes) {
                let public_key = PublicKey::from_secret_key(secp, &secret_key);
                return Ok(Self {
                    secret_key,
                    public_key,
                });
            }
        }
    }

    /// Rebuilds a keypair from raw secret bytes.
    pub fn from_secret_bytes<C: Signing>(
        secp: &Secp256k1<C>,
        secret_bytes: [u8; 32],
    ) -> Result<Self, CryptoError> {
        let secret_key =
            SecretKey::from_slice(&secret_bytes).map_err(CryptoError::InvalidSecretKey)?;
        Ok(Self::from_secret_key(secp, secret_key))
    }

    pub fn from_secret_key<C: Signing>(secp: &Secp256k1<C>, secret_key: SecretKey) -> Self {
        Self {
            secret_key,
            public_key: PublicKey::from_secret_key(secp, &secret_key),
        }
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Returns the 33-byte SEC1 compressed public key.
    #[inline]
    pub fn public_key_compressed(&self) -> [u8; 33] {
        self.public_key.serialize()
    }

    /// Returns the raw private scalar as lowercase hex.
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Returns the compressed public key as lowercase hex.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key_compressed())
    }
}
