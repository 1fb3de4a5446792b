//! Decred Vanity Address Generator CLI
//!
//! Usage:
//!   dcrvanity -pattern2 Zz -pattern1 Zzz     # stop at DsZzz..., report DsZz...
//!   dcrvanity -exclusive -pattern1 Zz        # stop at DsZz...
//!   dcrvanity -testnet -pattern2 abc         # report Tsabc... until Ctrl+C

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dcr_vanity::{
    Config, ConfigError, PoolSummary, SearchError, SearchOutcome, SearchResult, VanitySearch,
};

fn main() {
    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            let _ = e.print();
            // -h and --version print through the same path but are not errors.
            if !e.use_stderr() {
                process::exit(0);
            }
            process::exit(SearchError::from(ConfigError::from(e)).exit_code());
        }
    };

    // Validate configuration
    let network = match config.validate() {
        Ok(network) => network,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(SearchError::from(e).exit_code());
        }
    };
    if config.verify {
        debug!("-verify is reserved and has no effect");
    }

    let search = match VanitySearch::compile(
        &config.pattern1,
        &config.pattern2,
        config.inclusive(),
        network,
    ) {
        Ok(search) => search
            .with_workers(config.worker_count())
            .with_budget(config.budget()),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    };

    // Print startup info
    let patterns = search.patterns();
    println!("Decred Vanity Address Generator");
    println!("===============================");
    println!("Network:   {}", search.network());
    println!(
        "Secondary: {}",
        patterns.secondary().map_or("<none>", |m| m.as_str())
    );
    println!(
        "Primary:   {}",
        patterns.primary().map_or("<none>", |m| m.as_str())
    );
    println!(
        "Mode:      {}",
        if patterns.is_inclusive() {
            "inclusive (primary tested only after a secondary match)"
        } else {
            "exclusive (patterns tested independently)"
        }
    );
    println!("Workers:   {}", search.workers());
    let budget = search.budget();
    if !budget.is_unlimited() {
        println!(
            "Budget:    {} keys, {} seconds",
            budget.max_iterations.map_or("unlimited".to_string(), |n| n.to_string()),
            budget.timeout.map_or("unlimited".to_string(), |t| t.as_secs().to_string())
        );
    }
    if patterns.is_unbounded() {
        println!("No primary pattern: the program will never quit on its own.");
    }
    println!();

    ctrlc_handler(search.stop_flag_clone());

    println!("Searching... (Press Ctrl+C to stop)\n");

    let mut pool = search.spawn();
    let outcome = pool.wait();

    match outcome {
        Ok(SearchOutcome::Found(result)) => print_result(&result),
        Ok(SearchOutcome::Cancelled { iterations }) => {
            println!("\nStopped by user after {} keys.", iterations)
        }
        Ok(SearchOutcome::BudgetExhausted { iterations }) => {
            println!("\nNo match found within budget ({} keys).", iterations)
        }
        Err(e) => {
            eprintln!("\nError generating key pair: {}", e);
            process::exit(e.exit_code());
        }
    }

    print_statistics(&pool.summary());
}

/// Initialize tracing with compact format and environment-based filtering
fn init_tracing() {
    let fmt_layer = fmt::layer().compact().with_writer(std::io::stderr);
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

fn print_result(result: &SearchResult) {
    println!("\n=== Match found ===");
    println!("Address:     {}", result.address_encoded());
    println!("Public Key:  {}", result.public_key_hex());
    println!("Private Key: {}", result.private_key_wif());
    println!("Worker:      {}", result.worker_id);
    println!("Index:       {}", result.index);
    println!();
}

fn print_statistics(summary: &PoolSummary) {
    println!("\n--- Final Statistics ---");
    println!("Workers:              {}", summary.workers);
    println!("Total keys generated: {}", format_number(summary.keys));
    println!("Total matches found:  {}", summary.matches);
    println!("Time elapsed:         {:.2}s", summary.elapsed.as_secs_f64());
    println!("Average speed:        {}/s", format_number(summary.rate() as u64));
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn ctrlc_handler(stop_flag: Arc<AtomicBool>) {
    if let Err(e) = ctrlc::set_handler(move || {
        stop_flag.store(true, Ordering::Relaxed);
    }) {
        warn!(error = %e, "could not install Ctrl-C handler");
    }
}
