//! Position Types
//!
//! Held positions in the book. A position is either an equity-like security
//! (stock, bond, ETF, mutual fund, option) or a futures position valued on the
//! contract-size model. Both variants share [`PositionCommon`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::contract::FuturesContract;

// =============================================================================
// Enums
// =============================================================================

/// Security type for equity-like positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityType {
    Stock,
    Bond,
    Etf,
    MutualFund,
    /// Options are valued like any other equity-like holding.
    Option,
}

impl std::fmt::Display for SecurityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecurityType::Stock => write!(f, "STOCK"),
            SecurityType::Bond => write!(f, "BOND"),
            SecurityType::Etf => write!(f, "ETF"),
            SecurityType::MutualFund => write!(f, "MUTUAL_FUND"),
            SecurityType::Option => write!(f, "OPTION"),
        }
    }
}

/// Direction of a futures exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionDirection {
    Long,
    Short,
}

impl PositionDirection {
    /// +1 for long, -1 for short.
    pub fn sign(&self) -> f64 {
        match self {
            PositionDirection::Long => 1.0,
            PositionDirection::Short => -1.0,
        }
    }
}

impl std::fmt::Display for PositionDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionDirection::Long => write!(f, "LONG"),
            PositionDirection::Short => write!(f, "SHORT"),
        }
    }
}

// =============================================================================
// Shared Fields
// =============================================================================

/// Fields shared by every position variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionCommon {
    /// Unique position ID
    pub id: String,
    /// Display name (e.g., "Apple Inc.")
    pub name: String,
    /// Ticker or contract symbol
    pub symbol: String,
    /// Units held (contracts for futures; direction carries the sign)
    pub quantity: f64,
    /// Buy / entry price per unit
    pub buy_price: f64,
    /// Cost of the position at entry
    pub buy_value: f64,
    /// Last marked price
    pub current_price: f64,
    /// Value at the last marked price
    pub current_value: f64,
    /// Unrealized gain or loss
    pub gain_loss: f64,
    /// Gain or loss as a percentage of buy value; `None` when buy value is zero
    #[serde(default)]
    pub gain_loss_percent: Option<f64>,
    /// Date the position was acquired
    pub acquisition_date: NaiveDate,
    /// Days held as of the last refresh
    #[serde(default)]
    pub holding_period_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Daily returns, most recent last. Backfilled by the risk engine when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical_returns: Option<Vec<f64>>,
}

impl PositionCommon {
    fn new(
        symbol: String,
        name: String,
        quantity: f64,
        buy_price: f64,
        buy_value: f64,
        acquisition_date: NaiveDate,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            symbol,
            quantity,
            buy_price,
            buy_value,
            current_price: buy_price,
            current_value: buy_value,
            gain_loss: 0.0,
            gain_loss_percent: if buy_value != 0.0 { Some(0.0) } else { None },
            acquisition_date,
            holding_period_days: 0,
            sector: None,
            country: None,
            historical_returns: None,
        }
    }

    /// Recompute the holding period relative to `as_of`.
    pub fn refresh_holding_period(&mut self, as_of: NaiveDate) {
        let days = (as_of - self.acquisition_date).num_days().max(0);
        self.holding_period_days = u32::try_from(days).unwrap_or(u32::MAX);
    }
}

// =============================================================================
// Valuation Interface
// =============================================================================

/// Valuation behaviour shared by the position variants.
pub trait Valued {
    fn common(&self) -> &PositionCommon;
    fn common_mut(&mut self) -> &mut PositionCommon;
    /// Market value of the holding at `price`.
    fn value_at(&self, price: f64) -> f64;
    /// Unrealized gain or loss at `price`.
    fn gain_loss_at(&self, price: f64) -> f64;
}

// =============================================================================
// Variants
// =============================================================================

/// Equity-like holding: no margin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityPosition {
    #[serde(flatten)]
    pub common: PositionCommon,
    pub security_type: SecurityType,
}

impl EquityPosition {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        security_type: SecurityType,
        quantity: f64,
        buy_price: f64,
        acquisition_date: NaiveDate,
    ) -> Self {
        Self {
            common: PositionCommon::new(
                symbol.into(),
                name.into(),
                quantity,
                buy_price,
                quantity * buy_price,
                acquisition_date,
            ),
            security_type,
        }
    }
}

impl Valued for EquityPosition {
    fn common(&self) -> &PositionCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut PositionCommon {
        &mut self.common
    }

    fn value_at(&self, price: f64) -> f64 {
        self.common.quantity * price
    }

    fn gain_loss_at(&self, price: f64) -> f64 {
        self.value_at(price) - self.common.buy_value
    }
}

/// Futures holding valued on the contract-size model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuturesPosition {
    #[serde(flatten)]
    pub common: PositionCommon,
    /// Units of the underlying per contract
    pub contract_size: f64,
    /// Initial margin as a fraction of notional
    pub margin_requirement: f64,
    /// Margin posted for this position
    pub margin_used: f64,
    pub direction: PositionDirection,
    pub expiration_date: NaiveDate,
    pub tick_size: f64,
    pub tick_value: f64,
}

impl FuturesPosition {
    /// Open a futures position against a contract.
    pub fn from_contract(
        contract: &FuturesContract,
        name: impl Into<String>,
        direction: PositionDirection,
        quantity: f64,
        buy_price: f64,
        margin_used: f64,
        acquisition_date: NaiveDate,
    ) -> Self {
        Self {
            common: PositionCommon::new(
                contract.symbol.clone(),
                name.into(),
                quantity,
                buy_price,
                quantity * buy_price * contract.contract_size,
                acquisition_date,
            ),
            contract_size: contract.contract_size,
            margin_requirement: contract.margin_requirement,
            margin_used,
            direction,
            expiration_date: contract.expiration_date,
            tick_size: contract.tick_size,
            tick_value: contract.tick_value,
        }
    }

    /// Notional value of one contract at `price`.
    pub fn notional(&self, price: f64) -> f64 {
        self.contract_size * price
    }
}

impl Valued for FuturesPosition {
    fn common(&self) -> &PositionCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut PositionCommon {
        &mut self.common
    }

    fn value_at(&self, price: f64) -> f64 {
        self.common.quantity * self.notional(price)
    }

    fn gain_loss_at(&self, price: f64) -> f64 {
        let per_unit = match self.direction {
            PositionDirection::Long => price - self.common.buy_price,
            PositionDirection::Short => self.common.buy_price - price,
        };
        per_unit * self.common.quantity * self.contract_size
    }
}

// =============================================================================
// Position
// =============================================================================

/// A held position, tagged by `kind` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Position {
    Equity(EquityPosition),
    Futures(FuturesPosition),
}

impl Position {
    pub fn common(&self) -> &PositionCommon {
        match self {
            Position::Equity(p) => &p.common,
            Position::Futures(p) => &p.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut PositionCommon {
        match self {
            Position::Equity(p) => &mut p.common,
            Position::Futures(p) => &mut p.common,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.common().symbol
    }

    pub fn current_value(&self) -> f64 {
        self.common().current_value
    }

    pub fn gain_loss(&self) -> f64 {
        self.common().gain_loss
    }

    pub fn is_futures(&self) -> bool {
        matches!(self, Position::Futures(_))
    }

    /// Margin posted; zero for equity-like positions.
    pub fn margin_used(&self) -> f64 {
        match self {
            Position::Equity(_) => 0.0,
            Position::Futures(p) => p.margin_used,
        }
    }

    pub fn historical_returns(&self) -> Option<&[f64]> {
        self.common().historical_returns.as_deref()
    }
}

impl From<EquityPosition> for Position {
    fn from(position: EquityPosition) -> Self {
        Position::Equity(position)
    }
}

impl From<FuturesPosition> for Position {
    fn from(position: FuturesPosition) -> Self {
        Position::Futures(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn es_contract() -> FuturesContract {
        FuturesContract::new("ES", "E-mini S&P 500", 50.0, 0.25, 12.5, 0.06, date(2026, 12, 18), 4200.0)
    }

    #[test]
    fn test_equity_position_new() {
        let p = EquityPosition::new("AAPL", "Apple Inc.", SecurityType::Stock, 10.0, 150.0, date(2025, 1, 2));

        assert_eq!(p.common.buy_value, 1500.0);
        assert_eq!(p.common.current_value, 1500.0);
        assert_eq!(p.common.gain_loss_percent, Some(0.0));
        assert!(!p.common.id.is_empty());
    }

    #[test]
    fn test_zero_cost_position_has_no_percent() {
        let p = EquityPosition::new("GIFT", "Gifted", SecurityType::Stock, 10.0, 0.0, date(2025, 1, 2));
        assert_eq!(p.common.gain_loss_percent, None);
    }

    #[test]
    fn test_futures_value_uses_contract_size() {
        let p = FuturesPosition::from_contract(
            &es_contract(),
            "ES Dec",
            PositionDirection::Long,
            2.0,
            4200.0,
            25_200.0,
            date(2026, 9, 1),
        );

        assert_eq!(p.common.buy_value, 420_000.0);
        assert_eq!(p.value_at(4250.0), 425_000.0);
        assert_eq!(p.gain_loss_at(4250.0), 5000.0);
    }

    #[test]
    fn test_short_futures_gain_loss_sign() {
        let p = FuturesPosition::from_contract(
            &es_contract(),
            "ES Dec",
            PositionDirection::Short,
            2.0,
            4200.0,
            25_200.0,
            date(2026, 9, 1),
        );

        assert_eq!(p.gain_loss_at(4250.0), -5000.0);
        assert_eq!(p.gain_loss_at(4200.0), 0.0);
    }

    #[test]
    fn test_refresh_holding_period() {
        let mut p = EquityPosition::new("MSFT", "Microsoft", SecurityType::Stock, 1.0, 300.0, date(2026, 1, 1));
        p.common.refresh_holding_period(date(2026, 1, 31));
        assert_eq!(p.common.holding_period_days, 30);

        // Acquisition after the reference date clamps to zero
        p.common.refresh_holding_period(date(2025, 12, 1));
        assert_eq!(p.common.holding_period_days, 0);
    }

    #[test]
    fn test_position_margin_used() {
        let equity: Position =
            EquityPosition::new("SPY", "SPDR S&P 500", SecurityType::Etf, 1.0, 400.0, date(2025, 1, 2)).into();
        let futures: Position = FuturesPosition::from_contract(
            &es_contract(),
            "ES Dec",
            PositionDirection::Long,
            1.0,
            4200.0,
            12_600.0,
            date(2026, 9, 1),
        )
        .into();

        assert_eq!(equity.margin_used(), 0.0);
        assert_eq!(futures.margin_used(), 12_600.0);
        assert!(futures.is_futures());
        assert!(!equity.is_futures());
    }
}
