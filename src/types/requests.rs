//! Request / Response Types
//!
//! JSON shapes exchanged over the HTTP boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::cash::CashBalance;
use super::position::Position;
use super::summary::{PortfolioSummary, RiskMetrics};

/// Stateless valuation request: value the given book against the given prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationRequest {
    /// Symbol -> latest price; missing symbols keep their stored price
    #[serde(default)]
    pub prices: HashMap<String, f64>,
    pub positions: Vec<Position>,
    #[serde(default)]
    pub cash_balances: Vec<CashBalance>,
    /// Reused as `lastUpdated` so re-renders do not churn the timestamp
    #[serde(default)]
    pub previous_timestamp: Option<DateTime<Utc>>,
}

/// Result of a stateless valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationResponse {
    pub positions: Vec<Position>,
    pub summary: PortfolioSummary,
    pub risk: RiskMetrics,
}

/// Pre-trade margin check for a futures contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginCheckRequest {
    pub symbol: String,
    pub quantity: f64,
    /// Defaults to the contract's current price
    #[serde(default)]
    pub price: Option<f64>,
}

/// Outcome of a margin check. Reports only; never rejects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginCheck {
    pub symbol: String,
    pub quantity: f64,
    pub price: f64,
    pub notional: f64,
    pub required_margin: f64,
    pub available_margin: f64,
    pub sufficient: bool,
    /// Notional / required margin
    pub leverage: f64,
}

/// A single price quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub symbol: String,
    pub price: f64,
}
