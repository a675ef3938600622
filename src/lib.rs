//! Folio - portfolio valuation and risk analytics server

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod types;

use std::sync::Arc;

use config::Config;
use services::{PipelineRunner, PriceBook, RiskEngine, SnapshotStore};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<SnapshotStore>,
    pub price_book: Arc<PriceBook>,
    pub engine: Arc<RiskEngine>,
    pub runner: Arc<PipelineRunner>,
}

impl AppState {
    /// Seed state from the demo book: quotes into the price book, a first
    /// snapshot into the store, and a runner that is not yet started.
    pub fn from_demo(config: Config, as_of: chrono::NaiveDate) -> Self {
        let book = services::demo_book(as_of);
        let price_book = PriceBook::with_prices(book.quotes.iter().copied());
        let engine = Arc::new(RiskEngine::new(config.risk.clone()));

        let initial = services::initial_snapshot(
            &book.positions,
            book.cash_balances,
            book.contracts,
            &book.contract_positions,
            &*price_book,
            &engine,
        );
        let store = SnapshotStore::new(initial);
        let runner = PipelineRunner::new(
            store.clone(),
            price_book.clone(),
            engine.clone(),
            config.simulator.clone(),
        );

        Self {
            config: Arc::new(config),
            store,
            price_book,
            engine,
            runner,
        }
    }
}

// Re-export commonly used types
pub use error::{AppError, EngineError};
pub use types::*;
