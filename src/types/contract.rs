//! Futures Contract Types
//!
//! Reference data for listed futures contracts and the standalone positions
//! held against them. Contract positions are valued on the tick model
//! (tick value / tick size), which is separate from the contract-size model
//! used by [`super::FuturesPosition`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::position::PositionDirection;

/// Listed futures contract reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuturesContract {
    pub symbol: String,
    pub name: String,
    /// Units of the underlying per contract
    pub contract_size: f64,
    /// Minimum price increment
    pub tick_size: f64,
    /// Currency value of one tick
    pub tick_value: f64,
    /// Initial margin as a fraction of notional
    pub margin_requirement: f64,
    pub expiration_date: NaiveDate,
    /// Price as of the previous tick
    pub last_price: f64,
    pub current_price: f64,
    #[serde(default)]
    pub volume: u64,
    #[serde(default)]
    pub open_interest: u64,
}

impl FuturesContract {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        contract_size: f64,
        tick_size: f64,
        tick_value: f64,
        margin_requirement: f64,
        expiration_date: NaiveDate,
        price: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            contract_size,
            tick_size,
            tick_value,
            margin_requirement,
            expiration_date,
            last_price: price,
            current_price: price,
            volume: 0,
            open_interest: 0,
        }
    }

    /// Notional value of one contract at `price`.
    pub fn notional(&self, price: f64) -> f64 {
        self.contract_size * price
    }

    /// Price change since the previous tick.
    pub fn change(&self) -> f64 {
        self.current_price - self.last_price
    }
}

/// A standalone exposure held against a futures contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractPosition {
    pub id: String,
    /// Symbol of the contract held
    pub symbol: String,
    pub direction: PositionDirection,
    /// Number of contracts
    pub quantity: f64,
    pub entry_price: f64,
    pub current_price: f64,
    pub contract_size: f64,
    pub tick_size: f64,
    pub tick_value: f64,
    /// Margin posted for this exposure
    pub margin_used: f64,
    /// Tick-based unrealized P&L at `current_price`
    pub unrealized_pnl: f64,
    /// Notional / margin used
    pub leverage: f64,
    pub opened_at: DateTime<Utc>,
}

impl ContractPosition {
    /// Open a position against `contract` at `entry_price`.
    pub fn open(
        contract: &FuturesContract,
        direction: PositionDirection,
        quantity: f64,
        entry_price: f64,
        margin_used: f64,
    ) -> Self {
        let notional = quantity * contract.notional(entry_price);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: contract.symbol.clone(),
            direction,
            quantity,
            entry_price,
            current_price: entry_price,
            contract_size: contract.contract_size,
            tick_size: contract.tick_size,
            tick_value: contract.tick_value,
            margin_used,
            unrealized_pnl: 0.0,
            leverage: if margin_used > 0.0 { notional / margin_used } else { 0.0 },
            opened_at: Utc::now(),
        }
    }

    /// Notional value at the current price.
    pub fn notional_value(&self) -> f64 {
        self.quantity * self.contract_size * self.current_price
    }
}
