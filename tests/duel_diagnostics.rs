//! Two-seat negotiation diagnostics on the virtual clock.
//!
//! The long runs are NOT run in CI. Use them locally after touching the
//! controller or the phase table.
//!
//! Run with:
//!     cargo test --release --test duel_diagnostics -- --ignored --nocapture

use kaspaclash_select::engine::config::SelectionConfig;
use kaspaclash_select::engine::duel::{run_duel, run_duels, DuelOptions, SeatBehavior};

#[test]
fn test_small_batch_converges() {
    let stats = run_duels(&SelectionConfig::default(), 1_000, 40, &DuelOptions::default());
    assert_eq!(stats.converged, stats.duels, "{}", stats.summary());
    assert_eq!(stats.auto_selections, 0);
}

#[test]
fn test_mirrored_pairs_agree() {
    let outcome = run_duel(&SelectionConfig::default(), 314, &DuelOptions::default()).unwrap();
    let [p1, p2] = outcome.both_ready.clone();
    let (p1_local, p1_remote) = p1.unwrap();
    let (p2_local, p2_remote) = p2.unwrap();
    assert_eq!(p1_local, p2_remote);
    assert_eq!(p1_remote, p2_local);
    assert_eq!(outcome.banned[0], outcome.banned[1]);
}

/// Noisy transport: slow, duplicating and echoing. Every negotiation must still converge.
#[test]
#[ignore]
fn noisy_transport() {
    let options = DuelOptions {
        min_latency_ms: 50,
        max_latency_ms: 1_500,
        duplicate_rate: 0.25,
        echo_rate: 0.25,
        ..DuelOptions::default()
    };
    let stats = run_duels(&SelectionConfig::default(), 0, 2_000, &options);
    println!("\n{}", stats.summary());
    assert!(stats.failed_seeds.is_empty(), "failed seeds: {:?}", stats.failed_seeds);
}

/// One idle seat. The deadlines alone must carry it through both phases.
#[test]
#[ignore]
fn idle_opponent() {
    for (p1, p2) in [
        (SeatBehavior::Active, SeatBehavior::Idle),
        (SeatBehavior::Idle, SeatBehavior::Active),
        (SeatBehavior::Idle, SeatBehavior::Idle),
    ] {
        let options = DuelOptions {
            player1: p1,
            player2: p2,
            ..DuelOptions::default()
        };
        let stats = run_duels(&SelectionConfig::default(), 10_000, 500, &options);
        println!("\n{:?} vs {:?}\n{}", p1, p2, stats.summary());
        assert_eq!(stats.converged, stats.duels);
        let idle_seats = [p1, p2].iter().filter(|s| **s == SeatBehavior::Idle).count();
        assert_eq!(stats.auto_selections, stats.duels * idle_seats * 2);
    }
}
