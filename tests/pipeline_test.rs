//! Integration tests for the snapshot pipeline and its runner

use chrono::NaiveDate;
use folio::config::{Config, RiskConfig, SimulatorConfig};
use folio::services::{recompute, SnapshotStore};
use folio::AppState;
use std::time::Duration;

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn state(simulate: bool, tick_interval_ms: u64) -> AppState {
    let config = Config {
        simulator: SimulatorConfig {
            enabled: simulate,
            tick_interval_ms,
            seed: Some(17),
            ..SimulatorConfig::default()
        },
        risk: RiskConfig {
            returns_seed: Some(17),
            ..RiskConfig::default()
        },
        ..Config::default()
    };
    AppState::from_demo(config, as_of())
}

#[test]
fn test_initial_snapshot_from_demo() {
    let state = state(false, 1000);
    let snapshot = state.store.latest();

    assert_eq!(snapshot.sequence, 0);
    assert_eq!(snapshot.summary.position_count, 9);
    assert_eq!(snapshot.summary.futures_count, 3);
    assert!((snapshot.summary.total_margin_used - 53_790.0).abs() < 1e-6);
    assert!(snapshot.risk.is_some());
    assert!(snapshot.positions.iter().all(|p| p.historical_returns().is_some()));
}

#[test]
fn test_recompute_without_price_changes_is_stable() {
    let state = state(false, 1000);
    let first = state.store.latest();
    let prices = state.price_book.to_map();

    let second = recompute(
        &first,
        &prices,
        first.cash_balances.clone(),
        first.contracts.clone(),
        &state.engine,
        as_of(),
        Some(first.summary.last_updated),
    );

    assert_eq!(second.sequence, first.sequence + 1);
    assert_eq!(second.positions, first.positions);
    assert_eq!(second.summary, first.summary);
    assert_eq!(second.risk, first.risk);
}

#[test]
fn test_store_publish_is_visible_to_readers() {
    let state = state(false, 1000);
    let store = SnapshotStore::new((*state.store.latest()).clone());
    let reader = store.clone();

    let mut next = (*store.latest()).clone();
    next.sequence = 42;
    store.publish(next);

    assert_eq!(reader.latest().sequence, 42);
}

#[tokio::test]
async fn test_runner_publishes_until_stopped() {
    let state = state(true, 10);
    let mut rx = state.store.subscribe();

    assert!(state.runner.start());
    assert!(state.runner.is_running());
    // Starting twice does not spawn a second task
    assert!(!state.runner.start());

    tokio::time::timeout(Duration::from_secs(5), rx.changed())
        .await
        .expect("runner did not publish")
        .unwrap();
    assert!(state.store.latest().sequence >= 1);

    state.runner.stop().await;
    assert!(!state.runner.is_running());

    let stopped_at = state.store.latest().sequence;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(state.store.latest().sequence, stopped_at);
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let state = state(false, 10);

    // Stopping a runner that never started is a no-op
    state.runner.stop().await;

    state.runner.start();
    state.runner.stop().await;
    state.runner.stop().await;
    assert!(!state.runner.is_running());
}

#[tokio::test]
async fn test_runner_can_restart() {
    let state = state(false, 10);

    assert!(state.runner.start());
    state.runner.stop().await;
    assert!(state.runner.start());
    assert!(state.runner.is_running());
    state.runner.stop().await;
}

#[test]
fn test_simulated_ticks_keep_cash_consistent() {
    let state = state(true, 1000);

    for _ in 0..5 {
        state.runner.tick();
    }
    let snapshot = state.store.latest();

    assert_eq!(snapshot.sequence, 5);
    for cash in &snapshot.cash_balances {
        assert!((cash.usd_equivalent - cash.amount * cash.exchange_rate).abs() < 1e-9);
    }
    let usd = snapshot.cash_balances.iter().find(|c| c.currency == "USD").unwrap();
    assert_eq!(usd.exchange_rate, 1.0);
}

#[test]
fn test_runner_stop_blocking() {
    let state = state(false, 10);

    tokio_test::block_on(async {
        state.runner.stop().await;
    });
    assert!(!state.runner.is_running());
}
