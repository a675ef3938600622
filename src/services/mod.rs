pub mod aggregator;
pub mod demo;
pub mod futures;
pub mod price_book;
pub mod risk;
pub mod simulator;
pub mod snapshot;
pub mod valuation;

pub use aggregator::summarize;
pub use demo::{demo_book, DemoBook};
pub use futures::{
    check_margin, find_contract, futures_pnl, leverage, margin_requirement,
    mark_contract_positions, refresh_contracts,
};
pub use price_book::PriceBook;
pub use risk::{BetaProvider, ReturnGenerator, RiskEngine, StaticBetaTable, UniformReturnGenerator};
pub use simulator::PriceSimulator;
pub use snapshot::{
    build_snapshot, initial_snapshot, recompute, value_book, PipelineRunner, SnapshotStore,
};
pub use valuation::{gain_loss_percent, mark_to_market, resolve_price, PriceSource};
