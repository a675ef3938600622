//! Snapshot Store & Pipeline Runner
//!
//! The pipeline values the book (valuation, then aggregation, then risk) and
//! publishes the result as an immutable [`PortfolioSnapshot`]. Readers always
//! see a complete snapshot; a single runner task is the only writer.

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::SimulatorConfig;
use crate::error::EngineError;
use crate::services::aggregator::summarize;
use crate::services::futures::{mark_contract_positions, refresh_contracts};
use crate::services::price_book::PriceBook;
use crate::services::risk::RiskEngine;
use crate::services::simulator::PriceSimulator;
use crate::services::valuation::{mark_to_market, PriceSource};
use crate::types::{
    CashBalance, ContractPosition, FuturesContract, PortfolioSnapshot, Position, ValuationResponse,
};

// =============================================================================
// Snapshot Store
// =============================================================================

/// Latest published snapshot plus change notifications.
pub struct SnapshotStore {
    tx: watch::Sender<Arc<PortfolioSnapshot>>,
}

impl SnapshotStore {
    pub fn new(initial: PortfolioSnapshot) -> Arc<Self> {
        let (tx, _) = watch::channel(Arc::new(initial));
        Arc::new(Self { tx })
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> Arc<PortfolioSnapshot> {
        self.tx.borrow().clone()
    }

    /// Receiver that is notified on every publish.
    pub fn subscribe(&self) -> watch::Receiver<Arc<PortfolioSnapshot>> {
        self.tx.subscribe()
    }

    /// Swap in a new snapshot. Called by the pipeline runner only.
    pub fn publish(&self, snapshot: PortfolioSnapshot) -> Arc<PortfolioSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.tx.send_replace(snapshot.clone());
        snapshot
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Summarize and risk-assess an already marked book.
///
/// Missing return series are backfilled and kept in the snapshot, so later
/// ticks reuse them. A failed risk pass leaves `risk` empty and records why.
pub fn build_snapshot(
    sequence: u64,
    mut positions: Vec<Position>,
    cash_balances: Vec<CashBalance>,
    contracts: Vec<FuturesContract>,
    contract_positions: Vec<ContractPosition>,
    engine: &RiskEngine,
    previous_timestamp: Option<DateTime<Utc>>,
) -> PortfolioSnapshot {
    let summary = summarize(&positions, &cash_balances, previous_timestamp);

    let (risk, risk_error) = match engine.risk_metrics(&mut positions) {
        Ok(metrics) => (Some(metrics), None),
        Err(e) => {
            warn!("Risk pass failed for snapshot {}: {}", sequence, e);
            (None, Some(e.to_string()))
        }
    };

    PortfolioSnapshot {
        sequence,
        positions,
        cash_balances,
        contracts,
        contract_positions,
        summary,
        risk,
        risk_error,
        published_at: Utc::now(),
    }
}

/// First snapshot of a book: mark everything at `prices` and publish as
/// sequence 0.
pub fn initial_snapshot<P: PriceSource + ?Sized>(
    positions: &[Position],
    cash_balances: Vec<CashBalance>,
    contracts: Vec<FuturesContract>,
    contract_positions: &[ContractPosition],
    prices: &P,
    engine: &RiskEngine,
) -> PortfolioSnapshot {
    build_snapshot(
        0,
        mark_to_market(positions, prices),
        cash_balances,
        refresh_contracts(&contracts, prices),
        mark_contract_positions(contract_positions, prices),
        engine,
        None,
    )
}

/// Revalue the previous snapshot's book against `prices` with the given cash
/// and contract reference data. Holding periods are measured to `as_of`. The
/// result carries the next sequence number.
pub fn recompute<P: PriceSource + ?Sized>(
    previous: &PortfolioSnapshot,
    prices: &P,
    cash_balances: Vec<CashBalance>,
    contracts: Vec<FuturesContract>,
    engine: &RiskEngine,
    as_of: NaiveDate,
    previous_timestamp: Option<DateTime<Utc>>,
) -> PortfolioSnapshot {
    let mut positions = mark_to_market(&previous.positions, prices);
    for position in &mut positions {
        position.common_mut().refresh_holding_period(as_of);
    }

    build_snapshot(
        previous.sequence + 1,
        positions,
        cash_balances,
        contracts,
        mark_contract_positions(&previous.contract_positions, prices),
        engine,
        previous_timestamp,
    )
}

/// Value a caller-supplied book in one pass. Unlike the pipeline, a failed
/// risk pass fails the whole call.
pub fn value_book<P: PriceSource + ?Sized>(
    positions: &[Position],
    cash_balances: &[CashBalance],
    prices: &P,
    engine: &RiskEngine,
    previous_timestamp: Option<DateTime<Utc>>,
) -> Result<ValuationResponse, EngineError> {
    let mut positions = mark_to_market(positions, prices);
    let risk = engine.risk_metrics(&mut positions)?;
    let summary = summarize(&positions, cash_balances, previous_timestamp);

    Ok(ValuationResponse {
        positions,
        summary,
        risk,
    })
}

// =============================================================================
// Runner
// =============================================================================

/// Periodic task that ticks the simulator and republishes the book.
pub struct PipelineRunner {
    store: Arc<SnapshotStore>,
    price_book: Arc<PriceBook>,
    engine: Arc<RiskEngine>,
    simulator: Mutex<PriceSimulator>,
    simulate: bool,
    tick_interval: Duration,
    /// Held for a whole read-compute-publish pass
    writer: Mutex<()>,
    /// Shutdown signal sender
    shutdown_tx: broadcast::Sender<()>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PipelineRunner {
    pub fn new(
        store: Arc<SnapshotStore>,
        price_book: Arc<PriceBook>,
        engine: Arc<RiskEngine>,
        config: SimulatorConfig,
    ) -> Arc<Self> {
        let (shutdown_tx, _) = broadcast::channel(1);

        Arc::new(Self {
            store,
            price_book,
            engine,
            simulate: config.enabled,
            tick_interval: config.tick_interval(),
            simulator: Mutex::new(PriceSimulator::new(config)),
            writer: Mutex::new(()),
            shutdown_tx,
            handle: Mutex::new(None),
        })
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Spawn the periodic task. Returns false if it is already running.
    pub fn start(self: &Arc<Self>) -> bool {
        let mut handle = self.handle.lock().unwrap_or_else(|e| e.into_inner());
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            return false;
        }

        let runner = Arc::clone(self);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let period = self.tick_interval;

        *handle = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; the current snapshot stands until the next one
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        runner.tick();
                    }
                    _ = shutdown_rx.recv() => {
                        info!("Pipeline runner received shutdown signal");
                        break;
                    }
                }
            }
        }));

        info!(
            "Pipeline runner started (interval {:?}, simulation {})",
            period,
            if self.simulate { "on" } else { "off" }
        );
        true
    }

    /// Run one pipeline pass and publish the result.
    ///
    /// Passes are serialized, and every stage of a pass reads the same
    /// point-in-time copy of the price book.
    pub fn tick(&self) -> Arc<PortfolioSnapshot> {
        let _writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        let previous = self.store.latest();

        let mut simulator = self.simulator.lock().unwrap_or_else(|e| e.into_inner());
        if self.simulate {
            simulator.tick_prices(&self.price_book);
        }
        let prices = self.price_book.to_map();

        let (cash_balances, contracts) = if self.simulate {
            (
                simulator.tick_cash(&previous.cash_balances),
                simulator.tick_contracts(&previous.contracts, &prices),
            )
        } else {
            (
                previous.cash_balances.clone(),
                refresh_contracts(&previous.contracts, &prices),
            )
        };
        drop(simulator);

        let next = recompute(
            &previous,
            &prices,
            cash_balances,
            contracts,
            &self.engine,
            Utc::now().date_naive(),
            None,
        );
        debug!(
            "Published snapshot {} (total value {:.2})",
            next.sequence, next.summary.total_value
        );
        self.store.publish(next)
    }

    /// Signal shutdown and wait for the task to finish. No-op when stopped.
    pub async fn stop(&self) {
        let handle = self.handle.lock().unwrap_or_else(|e| e.into_inner()).take();
        let Some(handle) = handle else {
            return;
        };

        let _ = self.shutdown_tx.send(());
        if let Err(e) = handle.await {
            error!("Pipeline task ended abnormally: {}", e);
        }
        info!("Pipeline runner stopped");
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}
