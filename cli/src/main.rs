//! forksim CLI
//!
//! Simulates miners racing to extend competing chains and prints the chain
//! each miner ends up on.
//!
//! ```bash
//! forksim                 # 2016 blocks, seed 0
//! forksim 10000 7         # 10000 blocks, seed 7
//! forksim 500 1 --config net.json --stats
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use forksim_core::{Simulation, SimulationConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "forksim")]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of blocks to simulate [default: 2016]. Read like C `atoi`:
    /// anything that is not a number counts as 0
    #[arg(allow_hyphen_values = true)]
    block_count: Option<String>,

    /// Seed for the block process [default: 0], read like BLOCK_COUNT
    #[arg(allow_hyphen_values = true)]
    rng_seed: Option<String>,

    /// JSON simulation config (miner weights, links, mean block interval)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print propagation and reorg statistics to stderr
    #[arg(long)]
    stats: bool,
}

/// Leading whitespace, an optional sign, then as many digits as there are.
fn atoi(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let n = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(i64::from(d - b'0')));
    if negative {
        -n
    } else {
        n
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    let block_count = args.block_count.as_deref().map_or(config.block_count as i64, atoi);
    let seed = args.rng_seed.as_deref().map_or(config.seed as i64, atoi);
    config = config
        .with_block_count(block_count.max(0) as u64)
        .with_seed(seed as u64);

    println!("Simulating {block_count} blocks, rng seed: {seed}");

    let mut simulation = Simulation::new(config).context("building simulation")?;
    let report = simulation.run().context("running simulation")?;
    print!("{report}");

    info!(stale = report.stale_blocks(), "done");
    if args.stats {
        eprintln!("{}", report.propagation);
        eprintln!(
            "best len: {} stale blocks: {} reorgs: {} converged: {}",
            report.best_len(),
            report.stale_blocks(),
            report.total_reorgs(),
            report.converged()
        );
    }
    Ok(())
}
