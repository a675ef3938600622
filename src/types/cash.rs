//! Cash Types
//!
//! Multi-currency cash balances with their USD equivalents.

use serde::{Deserialize, Serialize};

/// Reporting currency for all aggregated values.
pub const BASE_CURRENCY: &str = "USD";

/// A cash balance held in a single currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashBalance {
    /// ISO currency code (e.g., "JPY")
    pub currency: String,
    /// Amount in `currency`
    pub amount: f64,
    /// USD per unit of `currency`
    pub exchange_rate: f64,
    /// Always `amount * exchange_rate`
    pub usd_equivalent: f64,
}

impl CashBalance {
    pub fn new(currency: impl Into<String>, amount: f64, exchange_rate: f64) -> Self {
        Self {
            currency: currency.into(),
            amount,
            exchange_rate,
            usd_equivalent: amount * exchange_rate,
        }
    }

    /// Copy of this balance at a new exchange rate.
    pub fn with_rate(&self, exchange_rate: f64) -> Self {
        Self::new(self.currency.clone(), self.amount, exchange_rate)
    }

    /// Whether this balance is held in the reporting currency.
    pub fn is_base(&self) -> bool {
        self.currency.eq_ignore_ascii_case(BASE_CURRENCY)
    }
}
