//! Valuation Engine
//!
//! Marks positions to market against a price source. Equity-like positions
//! are valued at `quantity * price`; futures on the contract-size model.
//! A symbol with no usable quote keeps its stored current price.

use crate::types::{Position, Valued};
use std::collections::HashMap;
use tracing::debug;

/// Lookup from symbol to latest price.
pub trait PriceSource {
    fn price(&self, symbol: &str) -> Option<f64>;
}

impl PriceSource for HashMap<String, f64> {
    fn price(&self, symbol: &str) -> Option<f64> {
        self.get(symbol).copied().or_else(|| {
            self.iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(symbol))
                .map(|(_, price)| *price)
        })
    }
}

/// Gain/loss as a percentage of buy value; `None` when buy value is zero.
pub fn gain_loss_percent(gain_loss: f64, buy_value: f64) -> Option<f64> {
    if buy_value == 0.0 {
        None
    } else {
        Some(gain_loss / buy_value * 100.0)
    }
}

/// Price to mark `position` at: the quoted price when usable, else the stored one.
pub fn resolve_price<P: PriceSource + ?Sized>(position: &Position, prices: &P) -> f64 {
    let stored = position.common().current_price;
    match prices.price(position.symbol()) {
        Some(price) if price.is_finite() && price > 0.0 => price,
        Some(price) => {
            debug!("Ignoring unusable price {} for {}", price, position.symbol());
            stored
        }
        None => stored,
    }
}

fn revalue_holding<T: Valued + Clone>(holding: &T, price: f64) -> T {
    let mut next = holding.clone();
    let value = holding.value_at(price);
    let gain_loss = holding.gain_loss_at(price);

    let common = next.common_mut();
    common.current_price = price;
    common.current_value = value;
    common.gain_loss = gain_loss;
    common.gain_loss_percent = gain_loss_percent(gain_loss, common.buy_value);
    next
}

impl Position {
    /// A copy of this position marked at `price`.
    pub fn revalue(&self, price: f64) -> Position {
        match self {
            Position::Equity(p) => Position::Equity(revalue_holding(p, price)),
            Position::Futures(p) => Position::Futures(revalue_holding(p, price)),
        }
    }
}

/// Mark every position to market. Inputs are not modified.
pub fn mark_to_market<P: PriceSource + ?Sized>(positions: &[Position], prices: &P) -> Vec<Position> {
    positions
        .iter()
        .map(|position| position.revalue(resolve_price(position, prices)))
        .collect()
}
