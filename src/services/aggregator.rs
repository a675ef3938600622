//! Portfolio Aggregator
//!
//! Rolls position-level values and cash balances into a [`PortfolioSummary`].
//! Every division is guarded; this never fails.

use crate::types::{CashBalance, PortfolioSummary, Position};
use chrono::{DateTime, Utc};

/// Summarize positions and cash. `previous` is reused as `last_updated` when
/// given, so re-rendering an unchanged book does not move the timestamp.
pub fn summarize(
    positions: &[Position],
    cash_balances: &[CashBalance],
    previous: Option<DateTime<Utc>>,
) -> PortfolioSummary {
    let (futures, securities): (Vec<&Position>, Vec<&Position>) =
        positions.iter().partition(|p| p.is_futures());

    let securities_value: f64 = securities.iter().map(|p| p.current_value()).sum();
    let futures_value: f64 = futures.iter().map(|p| p.current_value()).sum();
    let cash_value: f64 = cash_balances.iter().map(|c| c.usd_equivalent).sum();
    let total_value = securities_value + futures_value + cash_value;

    let total_gain_loss: f64 = positions.iter().map(|p| p.gain_loss()).sum();

    // Measured against value before gains rather than cost basis
    let capital_base = total_value - total_gain_loss;
    let total_gain_loss_percent = if total_value > 0.0 && capital_base != 0.0 {
        total_gain_loss / capital_base * 100.0
    } else {
        0.0
    };

    let total_margin_used: f64 = futures.iter().map(|p| p.margin_used()).sum();
    let available_margin = cash_value - total_margin_used;
    let margin_utilization_percent = if cash_value > 0.0 {
        total_margin_used / cash_value * 100.0
    } else {
        0.0
    };

    PortfolioSummary {
        total_value,
        total_gain_loss,
        total_gain_loss_percent,
        cash_value,
        securities_value,
        futures_value,
        total_margin_used,
        available_margin,
        margin_utilization_percent,
        unrealized_pnl: total_gain_loss,
        position_count: positions.len(),
        futures_count: futures.len(),
        last_updated: previous.unwrap_or_else(Utc::now),
    }
}
