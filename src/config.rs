//! Runtime configuration for the vanity address search.

use std::time::Duration;

use clap::Parser;

use crate::network::NetworkParams;
use crate::worker::Budget;

/// Long flags that may be written Go-style with a single dash.
const LONG_FLAGS: &[&str] = &[
    "testnet",
    "simnet",
    "verify",
    "pattern1",
    "pattern2",
    "exclusive",
    "workers",
    "max-iterations",
    "timeout",
    "help",
    "version",
];

/// Decred Vanity Address Generator
///
/// Generate a Decred private and public key, with address matching pattern(s).
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Generate a testnet key instead of mainnet
    #[arg(long)]
    pub testnet: bool,

    /// Generate a simnet key instead of mainnet
    #[arg(long)]
    pub simnet: bool,

    /// Verify a seed by generating the first address (reserved)
    #[arg(long)]
    pub verify: bool,

    /// Primary pattern. The search exits when this matches.
    #[arg(long, default_value = "")]
    pub pattern1: String,

    /// Secondary pattern. Matches are reported but the search goes on.
    #[arg(long, default_value = "")]
    pub pattern2: String,

    /// Test both patterns independently instead of only testing the primary
    /// pattern on addresses that matched the secondary one
    #[arg(long)]
    pub exclusive: bool,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Give up after this many keys (default: no limit)
    #[arg(long)]
    pub max_iterations: Option<u64>,

    /// Give up after this many seconds (default: no limit)
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl Config {
    /// Parses the process arguments, accepting single-dash long flags.
    ///
    /// Help and version requests come back as errors too; check
    /// `clap::Error::use_stderr` to tell them apart from usage mistakes.
    pub fn from_env() -> Result<Self, clap::Error> {
        Self::try_parse_from(normalize_args(std::env::args()))
    }

    /// Validates the configuration and resolves the selected network.
    pub fn validate(&self) -> Result<NetworkParams, ConfigError> {
        if self.workers == Some(0) {
            return Err(ConfigError::InvalidWorkers);
        }
        match (self.testnet, self.simnet) {
            (true, true) => Err(ConfigError::ConflictingNetworks),
            (true, false) => Ok(NetworkParams::TESTNET),
            (false, true) => Ok(NetworkParams::SIMNET),
            (false, false) => Ok(NetworkParams::MAINNET),
        }
    }

    /// Returns the number of workers, defaulting to CPU count
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }

    /// Inclusive mode is the default; `--exclusive` turns it off.
    pub fn inclusive(&self) -> bool {
        !self.exclusive
    }

    pub fn budget(&self) -> Budget {
        Budget {
            max_iterations: self.max_iterations,
            timeout: self.timeout.map(Duration::from_secs),
        }
    }
}

/// Rewrites `-pattern1=x` style arguments to `--pattern1=x`.
///
/// The first argument is the program name and is left untouched, as is
/// everything after a bare `--`.
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 || passthrough {
                return arg;
            }
            if arg == "--" {
                passthrough = true;
                return arg;
            }
            match arg.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') && is_long_flag(rest) => format!("-{}", arg),
                _ => arg,
            }
        })
        .collect()
}

fn is_long_flag(arg: &str) -> bool {
    let name = arg.split_once('=').map_or(arg, |(name, _)| name);
    LONG_FLAGS.contains(&name)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("only specify one network")]
    ConflictingNetworks,

    #[error("inclusive mode needs a secondary pattern; no addresses would be checked")]
    SecondaryRequired,

    #[error("no pattern given; nothing would ever be reported")]
    NoPatterns,

    #[error("worker count must be at least 1")]
    InvalidWorkers,

    #[error(transparent)]
    Usage(#[from] clap::Error),
}
