//! Operator-visible search output.
//!
//! Workers share one reporter. Each event is written under a single lock so
//! output from different workers never interleaves mid-line.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::crypto::Wif;
use crate::network::NetworkParams;
use crate::worker::Candidate;

/// Why a candidate is being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    /// Matched the secondary pattern; the search goes on
    Secondary,
    /// Matched the primary pattern; the search ends
    Primary,
}

/// Sink for liveness and match events.
pub trait Reporter: Send + Sync {
    /// Called with the running key count every heartbeat interval.
    fn heartbeat(&self, iterations: u64);

    /// Called for every reported candidate.
    fn hit(&self, kind: HitKind, candidate: &Candidate);
}

/// Writes events as human-readable lines.
pub struct ConsoleReporter<W: Write + Send = io::Stdout> {
    network: NetworkParams,
    out: Mutex<W>,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout(network: NetworkParams) -> Self {
        Self::new(network, io::stdout())
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(network: NetworkParams, out: W) -> Self {
        Self {
            network,
            out: Mutex::new(out),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_block(&self, block: &str) {
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // Output is best effort; a closed stdout must not kill the search.
        let _ = out.write_all(block.as_bytes());
        let _ = out.flush();
    }
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn heartbeat(&self, iterations: u64) {
        self.write_block(&format!("\r{}", iterations));
    }

    fn hit(&self, kind: HitKind, candidate: &Candidate) {
        let keypair = candidate.keypair();
        let wif = Wif::new(*keypair.secret_key(), &self.network);
        let heading = match kind {
            HitKind::Secondary => "secondary match",
            HitKind::Primary => "primary match",
        };

        self.write_block(&format!(
            "\r{} ({})\n{}\n{}\n{}\n{}\n",
            candidate.index(),
            heading,
            candidate.encoded(),
            keypair.public_key_hex(),
            keypair.private_key_hex(),
            wif,
        ));
    }
}
