//! Summary Types
//!
//! Aggregated totals, risk statistics and the published portfolio snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cash::CashBalance;
use super::contract::{ContractPosition, FuturesContract};
use super::position::Position;

/// Aggregated portfolio totals, recomputed on every valuation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    /// Securities + futures + cash
    pub total_value: f64,
    pub total_gain_loss: f64,
    pub total_gain_loss_percent: f64,
    /// Sum of USD equivalents across cash balances
    pub cash_value: f64,
    /// Current value of non-futures positions
    pub securities_value: f64,
    /// Current value of futures positions
    pub futures_value: f64,
    pub total_margin_used: f64,
    /// Cash minus margin used; negative when over-margined
    pub available_margin: f64,
    pub margin_utilization_percent: f64,
    /// Same as `total_gain_loss`
    pub unrealized_pnl: f64,
    pub position_count: usize,
    pub futures_count: usize,
    pub last_updated: DateTime<Utc>,
}

/// Portfolio risk statistics, recomputed on every risk pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetrics {
    /// Value-weighted beta
    pub beta: f64,
    pub sharpe_ratio: f64,
    /// Annualized volatility of portfolio returns
    pub volatility: f64,
    /// Worst peak-to-trough decline; zero or negative
    pub max_drawdown: f64,
    /// Futures margin as a fraction of total value
    pub margin_utilization: f64,
    pub leverage_ratio: f64,
    /// Futures value as a fraction of total value
    pub futures_exposure: f64,
    /// Fixed placeholder, not derived from positions
    pub delta: f64,
}

/// Immutable view of the book published by the pipeline on every tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    /// Increments by one on every publish
    pub sequence: u64,
    pub positions: Vec<Position>,
    pub cash_balances: Vec<CashBalance>,
    pub contracts: Vec<FuturesContract>,
    pub contract_positions: Vec<ContractPosition>,
    pub summary: PortfolioSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskMetrics>,
    /// Why `risk` is missing, when it is
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_error: Option<String>,
    pub published_at: DateTime<Utc>,
}
