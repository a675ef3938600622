//! Price Update Simulator
//!
//! Produces synthetic next-tick prices, FX rates and contract activity for
//! demos and tests. Each tick moves a value by a uniform random fraction
//! bounded by the configured volatility.

use crate::config::SimulatorConfig;
use crate::services::futures::refresh_contracts;
use crate::services::price_book::PriceBook;
use crate::services::valuation::PriceSource;
use crate::types::{CashBalance, FuturesContract};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Lowest fraction of the previous price a tick can move to.
const PRICE_FLOOR_FRACTION: f64 = 0.01;

/// Synthetic market data generator.
pub struct PriceSimulator {
    config: SimulatorConfig,
    rng: StdRng,
}

impl PriceSimulator {
    pub fn new(config: SimulatorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { config, rng }
    }

    fn shock(&mut self, bound: f64) -> f64 {
        if bound <= 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-bound..=bound)
    }

    /// Next-tick price: `price * (1 + U(-v, v))`, never below 1% of `price`.
    pub fn next_price(&mut self, price: f64) -> f64 {
        let moved = price * (1.0 + self.shock(self.config.price_volatility));
        moved.max(price * PRICE_FLOOR_FRACTION)
    }

    /// Next-tick FX rate. The reporting currency stays at 1.0.
    pub fn next_fx_rate(&mut self, cash: &CashBalance) -> f64 {
        if cash.is_base() {
            return 1.0;
        }
        let moved = cash.exchange_rate * (1.0 + self.shock(self.config.fx_volatility));
        moved.max(cash.exchange_rate * PRICE_FLOOR_FRACTION)
    }

    /// Move every quote in the book. Returns the number of symbols moved.
    pub fn tick_prices(&mut self, book: &PriceBook) -> usize {
        let mut moved = 0;
        for symbol in book.symbols() {
            if let Some(price) = book.get_price(&symbol) {
                let next = self.next_price(price);
                if book.update_price(&symbol, next) {
                    moved += 1;
                }
            }
        }
        debug!("Simulated {} price updates", moved);
        moved
    }

    /// New cash balances at next-tick FX rates, USD equivalents recomputed.
    pub fn tick_cash(&mut self, balances: &[CashBalance]) -> Vec<CashBalance> {
        balances
            .iter()
            .map(|cash| {
                let rate = self.next_fx_rate(cash);
                cash.with_rate(rate)
            })
            .collect()
    }

    /// Roll contracts onto the quoted prices and add simulated trading activity.
    pub fn tick_contracts<P: PriceSource + ?Sized>(
        &mut self,
        contracts: &[FuturesContract],
        prices: &P,
    ) -> Vec<FuturesContract> {
        refresh_contracts(contracts, prices)
            .into_iter()
            .map(|mut contract| {
                contract.volume += self.rng.gen_range(0..500);
                let oi_change: i64 = self.rng.gen_range(-50..=50);
                contract.open_interest = contract.open_interest.saturating_add_signed(oi_change);
                contract
            })
            .collect()
    }
}
