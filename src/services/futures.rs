//! Futures Engine
//!
//! Pure functions for futures P&L, margin and leverage.
//!
//! `ContractPosition`s use the tick model:
//! `(price - entry) * quantity * tick_value / tick_size`.
//! Futures held as `Position::Futures` are valued on the contract-size model
//! in the valuation engine instead; the two are not interchangeable.

use crate::error::EngineError;
use crate::services::valuation::PriceSource;
use crate::types::{ContractPosition, FuturesContract, MarginCheck, PositionDirection};

/// Tick-based unrealized P&L of a contract position at `current_price`.
pub fn futures_pnl(position: &ContractPosition, current_price: f64) -> f64 {
    if position.tick_size <= 0.0 {
        return 0.0;
    }

    let ticks = (current_price - position.entry_price) / position.tick_size;
    let pnl = ticks * position.quantity * position.tick_value;
    match position.direction {
        PositionDirection::Long => pnl,
        PositionDirection::Short => -pnl,
    }
}

/// Initial margin to hold `quantity` contracts at `price`.
pub fn margin_requirement(contract: &FuturesContract, quantity: f64, price: f64) -> f64 {
    contract.contract_size * price * quantity * contract.margin_requirement
}

/// Contract value per unit of margin; zero when no margin is posted.
pub fn leverage(contract_value: f64, margin_used: f64) -> f64 {
    if margin_used > 0.0 {
        contract_value / margin_used
    } else {
        0.0
    }
}

/// Find a contract by symbol (case-insensitive).
pub fn find_contract<'a>(
    contracts: &'a [FuturesContract],
    symbol: &str,
) -> Result<&'a FuturesContract, EngineError> {
    contracts
        .iter()
        .find(|c| c.symbol.eq_ignore_ascii_case(symbol))
        .ok_or_else(|| EngineError::UnknownContract(symbol.to_string()))
}

/// Revalue contract positions against a price source. Missing quotes keep the
/// stored current price.
pub fn mark_contract_positions<P: PriceSource + ?Sized>(
    positions: &[ContractPosition],
    prices: &P,
) -> Vec<ContractPosition> {
    positions
        .iter()
        .map(|position| {
            let price = prices
                .price(&position.symbol)
                .filter(|p| p.is_finite() && *p > 0.0)
                .unwrap_or(position.current_price);

            let mut next = position.clone();
            next.current_price = price;
            next.unrealized_pnl = futures_pnl(position, price);
            next.leverage = leverage(next.notional_value(), next.margin_used);
            next
        })
        .collect()
}

/// Roll contract reference data forward: the current price becomes the last
/// price and the quoted price (if any) becomes current.
pub fn refresh_contracts<P: PriceSource + ?Sized>(
    contracts: &[FuturesContract],
    prices: &P,
) -> Vec<FuturesContract> {
    contracts
        .iter()
        .map(|contract| {
            let mut next = contract.clone();
            next.last_price = contract.current_price;
            if let Some(price) = prices.price(&contract.symbol).filter(|p| p.is_finite() && *p > 0.0) {
                next.current_price = price;
            }
            next
        })
        .collect()
}

/// Report whether `available_margin` covers opening `quantity` contracts.
///
/// This never rejects the trade; enforcing the result is up to the caller.
pub fn check_margin(
    contract: &FuturesContract,
    quantity: f64,
    price: f64,
    available_margin: f64,
) -> MarginCheck {
    let required_margin = margin_requirement(contract, quantity, price);
    let notional = contract.notional(price) * quantity;

    MarginCheck {
        symbol: contract.symbol.clone(),
        quantity,
        price,
        notional,
        required_margin,
        available_margin,
        sufficient: available_margin >= required_margin,
        leverage: leverage(notional, required_margin),
    }
}
