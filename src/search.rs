//! The vanity search entry point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::{CryptoRng, RngCore};
use tracing::info;

use crate::error::SearchError;
use crate::matcher::PatternSet;
use crate::network::NetworkParams;
use crate::report::{ConsoleReporter, Reporter};
use crate::worker::{Budget, CpuWorker, SearchOutcome, WorkerPool, WorkerStats};

/// A compiled search, ready to run.
///
/// ```no_run
/// use dcr_vanity::{NetworkParams, SearchOutcome, VanitySearch};
///
/// let search = VanitySearch::compile("Zz", "Z", true, NetworkParams::MAINNET)?
///     .with_workers(4);
/// if let SearchOutcome::Found(result) = search.run()? {
///     println!("{} {}", result.address_encoded(), result.private_key_wif());
/// }
/// # Ok::<(), dcr_vanity::SearchError>(())
/// ```
pub struct VanitySearch {
    patterns: PatternSet,
    network: NetworkParams,
    budget: Budget,
    workers: usize,
    reporter: Arc<dyn Reporter>,
    stop_flag: Arc<AtomicBool>,
}

impl VanitySearch {
    /// Compiles the pattern pair for `network`.
    ///
    /// Fails before any key is generated if a pattern is malformed or the
    /// combination could never report anything. See [`PatternSet::compile`].
    pub fn compile(
        primary: &str,
        secondary: &str,
        inclusive: bool,
        network: NetworkParams,
    ) -> Result<Self, SearchError> {
        let patterns = PatternSet::compile(primary, secondary, inclusive, &network)?;
        Ok(Self {
            patterns,
            network,
            budget: Budget::unlimited(),
            workers: 1,
            reporter: Arc::new(ConsoleReporter::stdout(network)),
            stop_flag: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn network(&self) -> &NetworkParams {
        &self.network
    }

    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Returns the flag that cancels the search when raised.
    pub fn stop_flag_clone(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Starts the workers without waiting for them.
    ///
    /// Every call starts a fresh, independent search; a stop raised by an
    /// earlier run is cleared.
    pub fn spawn(&self) -> WorkerPool {
        self.stop_flag.store(false, Ordering::Relaxed);
        info!(
            network = %self.network,
            workers = self.workers,
            inclusive = self.patterns.is_inclusive(),
            "starting search"
        );
        WorkerPool::new(
            self.workers,
            self.patterns.clone(),
            self.network,
            self.reporter.clone(),
            self.budget,
            self.stop_flag.clone(),
        )
    }

    /// Runs the search to completion on the configured number of workers.
    pub fn run(&self) -> Result<SearchOutcome, SearchError> {
        self.spawn().wait()
    }

    /// Runs the search on the calling thread with the given random source.
    ///
    /// A seeded source replays the same candidates, which makes the outcome
    /// reproducible. Use only for testing: production keys need `OsRng`.
    pub fn run_with_rng<R: RngCore + CryptoRng>(
        &self,
        rng: R,
    ) -> Result<SearchOutcome, SearchError> {
        self.stop_flag.store(false, Ordering::Relaxed);
        let worker = CpuWorker::new(
            0,
            self.patterns.clone(),
            self.network,
            self.reporter.clone(),
            self.stop_flag.clone(),
            Arc::new(WorkerStats::new()),
            self.budget,
            Instant::now(),
        );
        worker.run(rng)
    }
}
