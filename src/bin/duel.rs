//! Duel CLI: run many two-seat negotiations on a virtual clock and report
//! how often both seats converge on the same pair.
//!
//! Usage:
//!   cargo run --release --bin duel -- --duels 1000 --seed 7
//!   cargo run --release --bin duel -- --duels 200 --p2 idle --max-latency-ms 1500 --duplicate-rate 0.2

use std::path::PathBuf;

use clap::Parser;

use kaspaclash_select::engine::config::{load_config, load_default_config};
use kaspaclash_select::engine::duel::{run_duel, run_duels, DuelOptions, SeatBehavior};

#[derive(Parser)]
#[command(name = "duel", about = "Simulate two-seat ban/pick negotiations")]
struct Cli {
    /// Number of negotiations to run
    #[arg(long, default_value = "100")]
    duels: usize,

    /// Base seed; duel i uses seed + i
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Path to selection.toml (default: auto-discover)
    #[arg(long, env = "KASPACLASH_SELECTION_CONFIG")]
    config: Option<PathBuf>,

    /// Player 1 behaviour: "active" or "idle"
    #[arg(long, default_value = "active")]
    p1: String,

    /// Player 2 behaviour: "active" or "idle"
    #[arg(long, default_value = "active")]
    p2: String,

    #[arg(long, default_value = "20")]
    min_latency_ms: u64,

    #[arg(long, default_value = "250")]
    max_latency_ms: u64,

    /// Probability a message is delivered twice
    #[arg(long, default_value = "0.0")]
    duplicate_rate: f64,

    /// Probability a message is echoed back to its sender
    #[arg(long, default_value = "0.0")]
    echo_rate: f64,

    /// Print the full outcome of a single duel (the base seed) and exit
    #[arg(long)]
    trace: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => match load_config(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => load_default_config(),
    };

    let (Some(player1), Some(player2)) = (SeatBehavior::parse(&cli.p1), SeatBehavior::parse(&cli.p2)) else {
        eprintln!("Seat behaviour must be \"active\" or \"idle\"");
        std::process::exit(2);
    };

    let options = DuelOptions {
        player1,
        player2,
        min_latency_ms: cli.min_latency_ms,
        max_latency_ms: cli.max_latency_ms.max(cli.min_latency_ms),
        duplicate_rate: cli.duplicate_rate.clamp(0.0, 1.0),
        echo_rate: cli.echo_rate.clamp(0.0, 1.0),
        ..DuelOptions::default()
    };

    if cli.trace {
        match run_duel(&config, cli.seed, &options) {
            Ok(outcome) => println!("{:#?}", outcome),
            Err(e) => {
                eprintln!("Duel failed: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    eprintln!(
        "Duel: {} negotiations, seed={}, p1={}, p2={}, latency={}..{}ms",
        cli.duels, cli.seed, cli.p1, cli.p2, options.min_latency_ms, options.max_latency_ms
    );
    let t0 = std::time::Instant::now();
    let stats = run_duels(&config, cli.seed, cli.duels, &options);
    println!("{}", stats.summary());
    eprintln!("  wall time: {:.2}s", t0.elapsed().as_secs_f64());

    if stats.converged != stats.duels {
        std::process::exit(1);
    }
}
