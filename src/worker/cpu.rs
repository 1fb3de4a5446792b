//! CPU-based worker for vanity address search.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::{CryptoRng, RngCore};
use tracing::debug;

use crate::error::SearchError;
use crate::matcher::PatternSet;
use crate::network::NetworkParams;
use crate::report::{HitKind, Reporter};

use super::{Candidate, KeyStream, SearchResult};

/// Keys between two liveness reports.
pub const HEARTBEAT_INTERVAL: u64 = 10_000;

/// Statistics shared by all workers of a search.
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Total keys generated
    pub keys_generated: AtomicU64,
    /// Reported matches (secondary and primary)
    pub matches_found: AtomicU64,
}

impl WorkerStats {
    /// Creates new worker stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the next key slot and returns its 1-based ordinal.
    ///
    /// Returns `None` once `limit` slots have been claimed, so concurrent
    /// workers never generate more than `limit` keys between them.
    #[inline]
    pub fn reserve_key(&self, limit: Option<u64>) -> Option<u64> {
        self.keys_generated
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |taken| match limit {
                Some(max) if taken >= max => None,
                _ => Some(taken + 1),
            })
            .ok()
            .map(|taken| taken + 1)
    }

    /// Gives back a slot whose key was never produced.
    #[inline]
    fn release_key(&self) {
        self.keys_generated.fetch_sub(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_match(&self) {
        self.matches_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the total keys generated.
    pub fn total_keys(&self) -> u64 {
        self.keys_generated.load(Ordering::Relaxed)
    }

    /// Returns the total matches found.
    pub fn total_matches(&self) -> u64 {
        self.matches_found.load(Ordering::Relaxed)
    }
}

/// Limits on how long a search may run. `None` means no limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Budget {
    /// Maximum keys generated across all workers
    pub max_iterations: Option<u64>,
    /// Maximum wall-clock time
    pub timeout: Option<Duration>,
}

impl Budget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn is_unlimited(&self) -> bool {
        self.max_iterations.is_none() && self.timeout.is_none()
    }

    #[inline]
    pub fn is_expired(&self, elapsed: Duration) -> bool {
        self.timeout.is_some_and(|limit| elapsed >= limit)
    }
}

/// How a search that did not fail came to an end.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// The primary pattern matched
    Found(SearchResult),
    /// The stop flag was raised before a match
    Cancelled { iterations: u64 },
    /// The iteration or time budget ran out before a match
    BudgetExhausted { iterations: u64 },
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }
}

/// A worker that generates candidates and applies the match policy.
pub struct CpuWorker {
    /// Worker ID
    id: usize,
    /// The patterns to match against
    patterns: PatternSet,
    /// Network the candidates are encoded for
    network: NetworkParams,
    /// Shared output sink
    reporter: Arc<dyn Reporter>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
    /// Shared statistics
    stats: Arc<WorkerStats>,
    budget: Budget,
    started: Instant,
}

impl CpuWorker {
    /// Creates a new CPU worker.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        patterns: PatternSet,
        network: NetworkParams,
        reporter: Arc<dyn Reporter>,
        stop_flag: Arc<AtomicBool>,
        stats: Arc<WorkerStats>,
        budget: Budget,
        started: Instant,
    ) -> Self {
        Self {
            id,
            patterns,
            network,
            reporter,
            stop_flag,
            stats,
            budget,
            started,
        }
    }

    /// Searches keys drawn from `rng`.
    pub fn run<R: RngCore + CryptoRng>(&self, rng: R) -> Result<SearchOutcome, SearchError> {
        self.run_stream(KeyStream::new(rng, self.network))
    }

    /// Runs the worker loop over `stream`.
    ///
    /// Tests candidates until:
    /// - The primary pattern matches under the active mode
    /// - The stop flag is set (checked before every candidate)
    /// - The budget is spent, or the stream ends
    /// - Generation fails, which aborts without retrying
    pub fn run_stream<I>(&self, stream: I) -> Result<SearchOutcome, SearchError>
    where
        I: IntoIterator<Item = Result<Candidate, SearchError>>,
    {
        let mut stream = stream.into_iter();
        debug!(worker = self.id, "worker started");

        loop {
            if self.stop_flag.load(Ordering::Relaxed) {
                debug!(worker = self.id, "worker cancelled");
                return Ok(SearchOutcome::Cancelled {
                    iterations: self.stats.total_keys(),
                });
            }

            if self.budget.is_expired(self.started.elapsed()) {
                return Ok(self.exhausted());
            }
            let Some(count) = self.stats.reserve_key(self.budget.max_iterations) else {
                return Ok(self.exhausted());
            };

            let candidate = match stream.next() {
                Some(Ok(candidate)) => candidate,
                Some(Err(e)) => {
                    self.stats.release_key();
                    return Err(e);
                }
                None => {
                    self.stats.release_key();
                    return Ok(self.exhausted());
                }
            };

            if count % HEARTBEAT_INTERVAL == 0 {
                self.reporter.heartbeat(count);
            }

            let evaluation = self.patterns.evaluate(candidate.encoded());
            if evaluation.secondary_hit {
                self.stats.record_match();
                self.reporter.hit(HitKind::Secondary, &candidate);
            }

            if evaluation.terminal {
                self.stats.record_match();
                self.reporter.hit(HitKind::Primary, &candidate);

                let result = SearchResult::new(candidate, self.network, self.id);
                result.verify()?;
                debug!(worker = self.id, index = result.index, "primary match");
                return Ok(SearchOutcome::Found(result));
            }
        }
    }

    fn exhausted(&self) -> SearchOutcome {
        SearchOutcome::BudgetExhausted {
            iterations: self.stats.total_keys(),
        }
    }

    /// Returns the worker ID.
    pub fn id(&self) -> usize {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Address, Keypair};
    use crate::report::testing::RecordingReporter;
    use secp256k1::Secp256k1;

    const MAIN: NetworkParams = NetworkParams::MAINNET;

    /// Random source that always reports failure.
    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, _dest: &mut [u8]) {}
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "entropy exhausted",
            )))
        }
    }

    impl CryptoRng for BrokenRng {}

    fn candidate(index: u64, secret_byte: u8) -> Candidate {
        let secp = Secp256k1::signing_only();
        let keypair = Keypair::from_secret_bytes(&secp, [secret_byte; 32]).unwrap();
        let address = Address::from_public_key(keypair.public_key(), &MAIN);
        Candidate::new(index, keypair, address)
    }

    /// Three fixed candidates with distinct addresses.
    fn fixed_stream() -> Vec<Candidate> {
        (0..3).map(|i| candidate(i, i as u8 + 1)).collect()
    }

    /// A fragment matching exactly this candidate's address.
    fn exact(candidate: &Candidate) -> String {
        format!("{}$", regex::escape(&candidate.encoded()[2..]))
    }

    fn worker(
        patterns: PatternSet,
        reporter: Arc<RecordingReporter>,
        budget: Budget,
    ) -> (CpuWorker, Arc<AtomicBool>) {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let worker = CpuWorker::new(
            0,
            patterns,
            MAIN,
            reporter,
            stop_flag.clone(),
            Arc::new(WorkerStats::new()),
            budget,
            Instant::now(),
        );
        (worker, stop_flag)
    }

    fn ok_stream(candidates: Vec<Candidate>) -> impl Iterator<Item = Result<Candidate, SearchError>> {
        candidates.into_iter().map(Ok)
    }

    #[test]
    fn test_inclusive_ignores_primary_without_secondary() {
        let c = fixed_stream();
        let patterns = PatternSet::compile(&exact(&c[1]), &exact(&c[0]), true, &MAIN).unwrap();
        let reporter = Arc::new(RecordingReporter::default());
        let (worker, _) = worker(patterns, reporter.clone(), Budget::unlimited());

        let outcome = worker.run_stream(ok_stream(c)).unwrap();

        assert!(matches!(
            outcome,
            SearchOutcome::BudgetExhausted { iterations: 3 }
        ));
        assert_eq!(reporter.hits(), [(HitKind::Secondary, 0)]);
    }

    #[test]
    fn test_inclusive_terminates_on_joint_match() {
        let c = fixed_stream();
        let patterns = PatternSet::compile(&exact(&c[2]), ".", true, &MAIN).unwrap();
        let reporter = Arc::new(RecordingReporter::default());
        let (worker, _) = worker(patterns, reporter.clone(), Budget::unlimited());

        let outcome = worker.run_stream(ok_stream(c.clone())).unwrap();

        let result = match outcome {
            SearchOutcome::Found(result) => result,
            other => panic!("expected a match, got {:?}", other),
        };
        assert_eq!(result.index, 2);
        assert_eq!(result.address, *c[2].address());
        assert_eq!(
            reporter.hits(),
            [
                (HitKind::Secondary, 0),
                (HitKind::Secondary, 1),
                (HitKind::Secondary, 2),
                (HitKind::Primary, 2),
            ]
        );
    }

    #[test]
    fn test_exclusive_primary_alone_terminates() {
        let c = fixed_stream();
        let patterns = PatternSet::compile(&exact(&c[1]), &exact(&c[0]), false, &MAIN).unwrap();
        let reporter = Arc::new(RecordingReporter::default());
        let (worker, _) = worker(patterns, reporter.clone(), Budget::unlimited());

        let outcome = worker.run_stream(ok_stream(c.clone())).unwrap();

        let result = match outcome {
            SearchOutcome::Found(result) => result,
            other => panic!("expected a match, got {:?}", other),
        };
        assert_eq!(result.index, 1);
        assert_eq!(result.keypair, *c[1].keypair());
        assert_eq!(
            reporter.hits(),
            [(HitKind::Secondary, 0), (HitKind::Primary, 1)]
        );
    }

    #[test]
    fn test_heartbeat_every_ten_thousand() {
        let c = candidate(0, 9);
        // Base58 never produces '!', so nothing matches.
        let patterns = PatternSet::compile("!", "", false, &MAIN).unwrap();
        let reporter = Arc::new(RecordingReporter::default());
        let budget = Budget {
            max_iterations: Some(25_000),
            timeout: None,
        };
        let (worker, _) = worker(patterns, reporter.clone(), budget);

        let stream = std::iter::repeat_with(|| Ok(c.clone()));
        let outcome = worker.run_stream(stream).unwrap();

        assert!(matches!(
            outcome,
            SearchOutcome::BudgetExhausted { iterations: 25_000 }
        ));
        assert_eq!(reporter.heartbeats(), [10_000, 20_000]);
        assert!(reporter.hits().is_empty());
    }

    #[test]
    fn test_cancellation_within_one_iteration() {
        let c = candidate(0, 4);
        // Secondary only: the search can never end by itself.
        let patterns = PatternSet::compile("", ".", false, &MAIN).unwrap();
        let reporter = Arc::new(RecordingReporter::default());
        let (worker, stop_flag) = worker(patterns, reporter.clone(), Budget::unlimited());

        let signal = stop_flag.clone();
        let stream = (0..).map(move |i| {
            if i == 4 {
                signal.store(true, Ordering::Relaxed);
            }
            Ok(Candidate::new(i, *c.keypair(), *c.address()))
        });
        let outcome = worker.run_stream(stream).unwrap();

        assert!(matches!(
            outcome,
            SearchOutcome::Cancelled { iterations: 5 }
        ));
        assert_eq!(reporter.hits().len(), 5);
    }

    #[test]
    fn test_stop_before_start_generates_nothing() {
        let patterns = PatternSet::compile("a", "", false, &MAIN).unwrap();
        let reporter = Arc::new(RecordingReporter::default());
        let (worker, stop_flag) = worker(patterns, reporter.clone(), Budget::unlimited());
        stop_flag.store(true, Ordering::Relaxed);

        let outcome = worker.run(BrokenRng).unwrap();
        assert!(matches!(
            outcome,
            SearchOutcome::Cancelled { iterations: 0 }
        ));
    }

    #[test]
    fn test_rng_failure_aborts() {
        let patterns = PatternSet::compile("a", "", false, &MAIN).unwrap();
        let reporter = Arc::new(RecordingReporter::default());
        let (worker, _) = worker(patterns, reporter.clone(), Budget::unlimited());

        let err = worker.run(BrokenRng).unwrap_err();
        assert!(matches!(err, SearchError::KeyGeneration(_)));
        assert!(reporter.events().is_empty());
    }

    #[test]
    fn test_zero_timeout_exhausts_immediately() {
        let patterns = PatternSet::compile("a", "", false, &MAIN).unwrap();
        let reporter = Arc::new(RecordingReporter::default());
        let budget = Budget {
            max_iterations: None,
            timeout: Some(Duration::ZERO),
        };
        let (worker, _) = worker(patterns, reporter, budget);

        let outcome = worker.run(BrokenRng).unwrap();
        assert!(matches!(
            outcome,
            SearchOutcome::BudgetExhausted { iterations: 0 }
        ));
    }

    #[test]
    fn test_budget_timeout() {
        let budget = Budget {
            max_iterations: Some(10),
            timeout: Some(Duration::from_secs(5)),
        };
        assert!(!budget.is_expired(Duration::from_secs(1)));
        assert!(budget.is_expired(Duration::from_secs(5)));
        assert!(!Budget::unlimited().is_expired(Duration::MAX));
    }

    #[test]
    fn test_reserve_key_stops_at_limit() {
        let stats = WorkerStats::new();
        assert_eq!(stats.reserve_key(Some(2)), Some(1));
        assert_eq!(stats.reserve_key(Some(2)), Some(2));
        assert_eq!(stats.reserve_key(Some(2)), None);
        assert_eq!(stats.total_keys(), 2);
        assert_eq!(stats.reserve_key(None), Some(3));
    }

    #[test]
    fn test_concurrent_reservations_never_overshoot() {
        let stats = Arc::new(WorkerStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = stats.clone();
                std::thread::spawn(move || {
                    let mut claimed = 0u64;
                    while stats.reserve_key(Some(1_000)).is_some() {
                        claimed += 1;
                    }
                    claimed
                })
            })
            .collect();

        let claimed: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(claimed, 1_000);
        assert_eq!(stats.total_keys(), 1_000);
    }

    #[test]
    fn test_failed_draw_is_not_counted() {
        let patterns = PatternSet::compile("a", "", false, &MAIN).unwrap();
        let stats = Arc::new(WorkerStats::new());
        let worker = CpuWorker::new(
            0,
            patterns,
            MAIN,
            Arc::new(RecordingReporter::default()),
            Arc::new(AtomicBool::new(false)),
            stats.clone(),
            Budget::unlimited(),
            Instant::now(),
        );

        assert!(worker.run(BrokenRng).is_err());
        assert_eq!(stats.total_keys(), 0);
    }
}
