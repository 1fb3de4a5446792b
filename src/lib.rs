//! # dcr_vanity
//!
//! Decred vanity address generator.
//!
//! ## Architecture
//!
//! - `crypto`: Key generation, address derivation and WIF encoding
//! - `matcher`: Primary/secondary pattern compilation and match policy
//! - `worker`: Key stream, search loop and parallel worker pool
//! - `search`: The `VanitySearch` entry point
//! - `report`: Operator-visible output
//! - `network`: Mainnet, testnet and simnet parameters
//! - `config`: Runtime configuration

pub mod config;
pub mod crypto;
pub mod error;
pub mod matcher;
pub mod network;
pub mod report;
pub mod search;
pub mod worker;

pub use config::{Config, ConfigError};
pub use crypto::{Address, CryptoError, Keypair, Wif};
pub use error::{PatternSlot, SearchError};
pub use matcher::{Evaluation, Matcher, PatternSet};
pub use network::NetworkParams;
pub use report::{ConsoleReporter, HitKind, Reporter};
pub use search::VanitySearch;
pub use worker::{Budget, PoolSummary, SearchOutcome, SearchResult, WorkerPool};
