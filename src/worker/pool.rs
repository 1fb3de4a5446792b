//! Worker pool management.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};
use rand::rngs::OsRng;
use secp256k1::Secp256k1;
use tracing::{debug, warn};

use crate::crypto::{Address, CryptoError, Keypair, Wif};
use crate::error::SearchError;
use crate::matcher::PatternSet;
use crate::network::NetworkParams;
use crate::report::Reporter;

use super::cpu::{Budget, CpuWorker, SearchOutcome, WorkerStats};
use super::Candidate;

/// The keypair that satisfied the primary pattern.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Index of the winning candidate in its worker's stream
    pub index: u64,
    pub keypair: Keypair,
    pub address: Address,
    /// Network the address and key are encoded for
    pub network: NetworkParams,
    /// The ID of the worker that found this result
    pub worker_id: usize,
}

impl SearchResult {
    pub fn new(candidate: Candidate, network: NetworkParams, worker_id: usize) -> Self {
        Self {
            index: candidate.index(),
            keypair: *candidate.keypair(),
            address: *candidate.address(),
            network,
            worker_id,
        }
    }

    /// The private key in wallet import format.
    pub fn private_key_wif(&self) -> String {
        Wif::new(*self.keypair.secret_key(), &self.network).encode()
    }

    /// The encoded P2PKH address.
    pub fn address_encoded(&self) -> String {
        self.address.encode()
    }

    pub fn public_key_hex(&self) -> String {
        self.keypair.public_key_hex()
    }

    /// Re-derives the address from the exported key and checks it matches.
    pub fn verify(&self) -> Result<(), SearchError> {
        let wif = Wif::decode(&self.private_key_wif(), &self.network)
            .map_err(SearchError::KeyGeneration)?;
        let secp = Secp256k1::signing_only();
        let keypair = Keypair::from_secret_key(&secp, *wif.secret_key());

        let address =
            Address::from_public_key_bytes(&keypair.public_key_compressed(), &self.network)
                .map_err(SearchError::AddressDerivation)?;
        if address != self.address || keypair != self.keypair {
            return Err(SearchError::AddressDerivation(CryptoError::InconsistentKey));
        }
        Ok(())
    }
}

/// Final message of one worker.
struct WorkerReport {
    worker_id: usize,
    outcome: Result<SearchOutcome, SearchError>,
}

/// Races several workers for the first primary match.
pub struct WorkerPool {
    /// Number of workers
    num_workers: usize,
    /// Worker thread handles (Option to allow taking during join)
    handles: Option<Vec<JoinHandle<()>>>,
    /// Channel receiver for worker outcomes
    report_rx: Receiver<WorkerReport>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
    /// Shared statistics
    stats: Arc<WorkerStats>,
    /// Start time
    start_time: Instant,
}

impl WorkerPool {
    /// Spawns `num_workers` workers, each drawing keys from its own `OsRng`.
    pub fn new(
        num_workers: usize,
        patterns: PatternSet,
        network: NetworkParams,
        reporter: Arc<dyn Reporter>,
        budget: Budget,
        stop_flag: Arc<AtomicBool>,
    ) -> Self {
        let num_workers = num_workers.max(1);
        let (report_tx, report_rx) = bounded(num_workers);
        let stats = Arc::new(WorkerStats::new());
        let start_time = Instant::now();

        let handles: Vec<JoinHandle<()>> = (0..num_workers)
            .map(|id| {
                let worker = CpuWorker::new(
                    id,
                    patterns.clone(),
                    network,
                    reporter.clone(),
                    stop_flag.clone(),
                    stats.clone(),
                    budget,
                    start_time,
                );
                Self::spawn_worker(worker, report_tx.clone())
            })
            .collect();

        debug!(workers = num_workers, network = %network, "worker pool started");

        Self {
            num_workers,
            handles: Some(handles),
            report_rx,
            stop_flag,
            stats,
            start_time,
        }
    }

    fn spawn_worker(worker: CpuWorker, report_tx: Sender<WorkerReport>) -> JoinHandle<()> {
        thread::Builder::new()
            .name(format!("dcr-vanity-worker-{}", worker.id()))
            .spawn(move || {
                let outcome = worker.run(OsRng);
                // The pool may already be gone; nothing left to tell then.
                let _ = report_tx.send(WorkerReport {
                    worker_id: worker.id(),
                    outcome,
                });
            })
            .expect("Failed to spawn worker thread")
    }

    /// Blocks until every worker has finished and returns the combined outcome.
    ///
    /// The first worker to report a match wins and the rest are told to stop.
    /// A failing worker also stops the rest; its error is returned unless a
    /// match was reported first.
    pub fn wait(&mut self) -> Result<SearchOutcome, SearchError> {
        let mut found = None;
        let mut failure = None;
        let mut exhausted = false;

        for _ in 0..self.num_workers {
            let Ok(report) = self.report_rx.recv() else {
                warn!("a worker exited without reporting");
                break;
            };

            match report.outcome {
                Ok(SearchOutcome::Found(result)) => {
                    self.stop();
                    if found.is_none() && failure.is_none() {
                        found = Some(result);
                    }
                }
                Ok(SearchOutcome::BudgetExhausted { .. }) => exhausted = true,
                Ok(SearchOutcome::Cancelled { .. }) => {}
                Err(e) => {
                    warn!(worker = report.worker_id, error = %e, "worker failed");
                    self.stop();
                    if found.is_none() && failure.is_none() {
                        failure = Some(e);
                    }
                }
            }
        }

        self.join_workers();

        let iterations = self.total_keys();
        match (found, failure) {
            (Some(result), _) => Ok(SearchOutcome::Found(result)),
            (None, Some(e)) => Err(e),
            (None, None) if exhausted => Ok(SearchOutcome::BudgetExhausted { iterations }),
            (None, None) => Ok(SearchOutcome::Cancelled { iterations }),
        }
    }

    /// Signals all workers to stop.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    fn join_workers(&mut self) {
        if let Some(handles) = self.handles.take() {
            for handle in handles {
                let _ = handle.join();
            }
        }
    }

    /// Returns the total keys generated across all workers.
    pub fn total_keys(&self) -> u64 {
        self.stats.total_keys()
    }

    /// Snapshot of the pool's counters for the final report.
    pub fn summary(&self) -> PoolSummary {
        PoolSummary {
            workers: self.num_workers,
            keys: self.stats.total_keys(),
            matches: self.stats.total_matches(),
            elapsed: self.start_time.elapsed(),
        }
    }
}

/// Counters of a pool at one point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolSummary {
    pub workers: usize,
    /// Keys generated across all workers
    pub keys: u64,
    /// Secondary and primary hits reported
    pub matches: u64,
    pub elapsed: Duration,
}

impl PoolSummary {
    /// Keys per second over the whole run; zero before any time has passed.
    pub fn rate(&self) -> f64 {
        match self.elapsed.as_secs_f64() {
            secs if secs > 0.0 => self.keys as f64 / secs,
            _ => 0.0,
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop();
        self.join_workers();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::testing::RecordingReporter;
    use crate::report::HitKind;

    const MAIN: NetworkParams = NetworkParams::MAINNET;

    struct Harness {
        pool: WorkerPool,
        reporter: Arc<RecordingReporter>,
        stop_flag: Arc<AtomicBool>,
    }

    fn harness(patterns: PatternSet, workers: usize, budget: Budget) -> Harness {
        let reporter = Arc::new(RecordingReporter::default());
        let stop_flag = Arc::new(AtomicBool::new(false));
        let pool = WorkerPool::new(
            workers,
            patterns,
            MAIN,
            reporter.clone(),
            budget,
            stop_flag.clone(),
        );
        Harness {
            pool,
            reporter,
            stop_flag,
        }
    }

    #[test]
    fn test_first_match_wins_and_stops_others() {
        let patterns = PatternSet::compile(".", "", false, &MAIN).unwrap();
        let mut h = harness(patterns, 4, Budget::unlimited());

        let result = match h.pool.wait().unwrap() {
            SearchOutcome::Found(result) => result,
            other => panic!("expected a match, got {:?}", other),
        };

        assert!(h.stop_flag.load(Ordering::Relaxed));
        assert!(result.worker_id < 4);
        assert!(result.address_encoded().starts_with("Ds"));
        assert!(h
            .reporter
            .hits()
            .iter()
            .any(|&(kind, _)| kind == HitKind::Primary));
    }

    #[test]
    fn test_budget_spans_all_workers() {
        let patterns = PatternSet::compile("!", "", false, &MAIN).unwrap();
        let budget = Budget {
            max_iterations: Some(200),
            timeout: None,
        };
        let mut h = harness(patterns, 3, budget);

        let outcome = h.pool.wait().unwrap();
        let SearchOutcome::BudgetExhausted { iterations } = outcome else {
            panic!("expected budget exhaustion");
        };
        assert_eq!(iterations, 200);

        let summary = h.pool.summary();
        assert_eq!(summary.keys, 200);
        assert_eq!(summary.workers, 3);
        assert_eq!(summary.matches, 0);
    }

    #[test]
    fn test_external_stop_cancels() {
        let patterns = PatternSet::compile("", ".", false, &MAIN).unwrap();
        let mut h = harness(patterns, 2, Budget::unlimited());

        let stop_flag = h.stop_flag.clone();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            stop_flag.store(true, Ordering::Relaxed);
        });

        let outcome = h.pool.wait().unwrap();
        stopper.join().unwrap();
        assert!(matches!(outcome, SearchOutcome::Cancelled { .. }));
    }

    #[test]
    fn test_result_formatting_round_trips() {
        let patterns = PatternSet::compile(".", "", false, &NetworkParams::TESTNET).unwrap();
        let reporter = Arc::new(RecordingReporter::default());
        let mut pool = WorkerPool::new(
            1,
            patterns,
            NetworkParams::TESTNET,
            reporter,
            Budget::unlimited(),
            Arc::new(AtomicBool::new(false)),
        );

        let SearchOutcome::Found(result) = pool.wait().unwrap() else {
            panic!("expected a match");
        };
        result.verify().unwrap();

        let wif = Wif::decode(&result.private_key_wif(), &NetworkParams::TESTNET).unwrap();
        assert_eq!(wif.secret_key(), result.keypair.secret_key());
        let address = Address::decode(&result.address_encoded(), &NetworkParams::TESTNET).unwrap();
        assert_eq!(address, result.address);
        assert_eq!(result.public_key_hex().len(), 66);
    }

    #[test]
    fn test_summary_rate() {
        let summary = PoolSummary {
            workers: 2,
            keys: 3_000,
            matches: 1,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(summary.rate(), 1_500.0);
        assert_eq!(
            PoolSummary {
                elapsed: Duration::ZERO,
                ..summary
            }
            .rate(),
            0.0
        );
    }

    #[test]
    fn test_tampered_result_fails_verification() {
        let secp = Secp256k1::signing_only();
        let keypair = Keypair::from_secret_bytes(&secp, [8u8; 32]).unwrap();
        let other = Keypair::from_secret_bytes(&secp, [9u8; 32]).unwrap();
        let address = Address::from_public_key(other.public_key(), &MAIN);
        let result = SearchResult::new(Candidate::new(0, keypair, address), MAIN, 0);

        assert!(matches!(
            result.verify(),
            Err(SearchError::AddressDerivation(CryptoError::InconsistentKey))
        ));
    }
}
