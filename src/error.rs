//! Errors that stop a search.

use std::fmt;

use crate::config::ConfigError;
use crate::crypto::CryptoError;

/// Which of the two pattern slots a fragment was supplied for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternSlot {
    Primary,
    Secondary,
}

impl fmt::Display for PatternSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternSlot::Primary => write!(f, "primary"),
            PatternSlot::Secondary => write!(f, "secondary"),
        }
    }
}

/// Every error a search can hit is fatal and user-visible.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("invalid {slot} pattern: {source}")]
    PatternCompile {
        slot: PatternSlot,
        #[source]
        source: regex::Error,
    },

    #[error("key generation failed: {0}")]
    KeyGeneration(#[source] CryptoError),

    #[error("address derivation failed: {0}")]
    AddressDerivation(#[source] CryptoError),
}

impl SearchError {
    /// Process exit code the CLI reports for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            SearchError::Configuration(_) => 1,
            SearchError::PatternCompile { .. } => 2,
            SearchError::KeyGeneration(_) | SearchError::AddressDerivation(_) => 3,
        }
    }
}
