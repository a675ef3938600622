//! Risk Engine
//!
//! Computes portfolio risk statistics from positions and their daily return
//! series:
//! - value-weighted beta from an injectable beta table
//! - annualized volatility, Sharpe ratio and max drawdown of the
//!   value-weighted portfolio return series
//! - futures margin utilization, leverage ratio and exposure
//!
//! Positions without a return series are backfilled with a synthetic random
//! walk sized to their holding period. This stands in for real history.

use crate::config::RiskConfig;
use crate::error::EngineError;
use crate::types::{Position, RiskMetrics};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

// =============================================================================
// Reference Data
// =============================================================================

/// Source of per-symbol betas.
pub trait BetaProvider: Send + Sync {
    fn beta(&self, symbol: &str) -> Option<f64>;
}

/// In-memory beta table.
#[derive(Debug, Clone)]
pub struct StaticBetaTable {
    betas: HashMap<String, f64>,
}

impl StaticBetaTable {
    pub fn empty() -> Self {
        Self {
            betas: HashMap::new(),
        }
    }

    pub fn with_beta(mut self, symbol: &str, beta: f64) -> Self {
        self.betas.insert(symbol.to_uppercase(), beta);
        self
    }
}

impl Default for StaticBetaTable {
    fn default() -> Self {
        [
            ("AAPL", 1.25),
            ("MSFT", 0.90),
            ("GOOGL", 1.05),
            ("AMZN", 1.15),
            ("NVDA", 1.70),
            ("TSLA", 2.00),
            ("JPM", 1.10),
            ("SPY", 1.00),
            ("QQQ", 1.10),
            ("TLT", 0.30),
            ("VFIAX", 1.00),
            ("ES", 1.00),
            ("NQ", 1.20),
            ("CL", 0.60),
            ("GC", 0.10),
        ]
        .into_iter()
        .fold(Self::empty(), |table, (symbol, beta)| table.with_beta(symbol, beta))
    }
}

impl BetaProvider for StaticBetaTable {
    fn beta(&self, symbol: &str) -> Option<f64> {
        self.betas.get(&symbol.to_uppercase()).copied()
    }
}

// =============================================================================
// Return Series Generation
// =============================================================================

/// Generator for synthetic daily return series.
pub trait ReturnGenerator: Send {
    /// `days` daily returns with the given annualized mean and standard deviation.
    fn generate(&mut self, days: usize, annual_mean: f64, annual_std_dev: f64) -> Vec<f64>;
}

/// Bounded random walk: `r = mean/days + std_dev * U(-1, 1) / sqrt(days)`.
pub struct UniformReturnGenerator {
    rng: StdRng,
}

impl UniformReturnGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl ReturnGenerator for UniformReturnGenerator {
    fn generate(&mut self, days: usize, annual_mean: f64, annual_std_dev: f64) -> Vec<f64> {
        if days == 0 {
            return Vec::new();
        }

        let n = days as f64;
        let drift = annual_mean / n;
        let scale = annual_std_dev / n.sqrt();
        (0..days)
            .map(|_| drift + scale * self.rng.gen_range(-1.0..=1.0))
            .collect()
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Sum of position current values.
pub fn total_position_value(positions: &[Position]) -> f64 {
    positions.iter().map(|p| p.current_value()).sum()
}

/// Value-weighted portfolio return series over the most recent
/// `min(max_window, shortest series)` days. Positions without a series, and
/// indices a series does not cover, contribute nothing.
pub fn portfolio_returns(positions: &[Position], total_value: f64, max_window: usize) -> Vec<f64> {
    let shortest = positions
        .iter()
        .filter_map(|p| p.historical_returns())
        .map(|r| r.len())
        .min()
        .unwrap_or(0);
    let window = shortest.min(max_window);

    let mut combined = vec![0.0; window];
    for position in positions {
        let Some(series) = position.historical_returns() else {
            continue;
        };
        let weight = position.current_value() / total_value;
        let tail = &series[series.len().saturating_sub(window)..];
        for (slot, r) in combined.iter_mut().zip(tail.iter()) {
            *slot += weight * r;
        }
    }
    combined
}

/// Mean and variance, both divided by the fixed `window` rather than the
/// series length.
pub fn windowed_moments(returns: &[f64], window: usize) -> (f64, f64) {
    if returns.is_empty() || window == 0 {
        return (0.0, 0.0);
    }

    let n = window as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    (mean, variance)
}

/// Worst peak-to-trough decline of compounded returns starting from 1.0.
/// Zero or negative.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut value = 1.0;
    let mut peak = 1.0;
    let mut worst: f64 = 0.0;

    for r in returns {
        value *= 1.0 + r;
        if value > peak {
            peak = value;
        }
        worst = worst.min((value - peak) / peak);
    }
    worst
}

// =============================================================================
// Engine
// =============================================================================

/// Portfolio risk engine.
pub struct RiskEngine {
    config: RiskConfig,
    betas: Arc<dyn BetaProvider>,
    generator: Mutex<Box<dyn ReturnGenerator>>,
}

impl RiskEngine {
    /// Engine with the default beta table and a uniform return generator.
    pub fn new(config: RiskConfig) -> Self {
        let generator = UniformReturnGenerator::new(config.returns_seed);
        Self::with_providers(config, Arc::new(StaticBetaTable::default()), Box::new(generator))
    }

    pub fn with_providers(
        config: RiskConfig,
        betas: Arc<dyn BetaProvider>,
        generator: Box<dyn ReturnGenerator>,
    ) -> Self {
        Self {
            config,
            betas,
            generator: Mutex::new(generator),
        }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Fill in return series for positions that have none. Returns how many
    /// were generated.
    pub fn backfill_returns(&self, positions: &mut [Position]) -> usize {
        let mut generator = self.generator.lock().unwrap_or_else(|e| e.into_inner());
        let mut filled = 0;

        for position in positions.iter_mut() {
            let common = position.common_mut();
            if common.historical_returns.is_some() {
                continue;
            }
            let days = (common.holding_period_days as usize).max(1);
            common.historical_returns = Some(generator.generate(
                days,
                self.config.simulated_annual_return,
                self.config.simulated_annual_volatility,
            ));
            filled += 1;
        }

        if filled > 0 {
            debug!("Backfilled return series for {} positions", filled);
        }
        filled
    }

    /// Compute risk metrics without touching the positions.
    pub fn compute(&self, positions: &[Position]) -> Result<RiskMetrics, EngineError> {
        let total_value = self.ensure_capital(positions)?;

        let window = self.config.volatility_window_days;
        let returns = portfolio_returns(positions, total_value, window);
        let (mean_return, variance) = windowed_moments(&returns, window);
        let volatility = (variance * window as f64).sqrt();

        let annual_return = mean_return * self.config.trading_days;
        let sharpe_ratio = if volatility > 0.0 {
            (annual_return - self.config.risk_free_rate) / volatility
        } else {
            0.0
        };

        let beta: f64 = positions
            .iter()
            .map(|p| {
                let weight = p.current_value() / total_value;
                weight * self.betas.beta(p.symbol()).unwrap_or(1.0)
            })
            .sum();

        let futures_margin: f64 = positions.iter().map(|p| p.margin_used()).sum();
        let futures_value: f64 = positions
            .iter()
            .filter(|p| p.is_futures())
            .map(|p| p.current_value())
            .sum();
        let unmargined = total_value - futures_margin;

        Ok(RiskMetrics {
            beta,
            sharpe_ratio,
            volatility,
            max_drawdown: max_drawdown(&returns),
            margin_utilization: futures_margin / total_value,
            leverage_ratio: if unmargined > 0.0 { total_value / unmargined } else { 0.0 },
            futures_exposure: futures_value / total_value,
            delta: self.config.delta_placeholder,
        })
    }

    /// Check capital, backfill missing return series, then compute.
    pub fn risk_metrics(&self, positions: &mut [Position]) -> Result<RiskMetrics, EngineError> {
        self.ensure_capital(positions)?;
        self.backfill_returns(positions);
        self.compute(positions)
    }

    fn ensure_capital(&self, positions: &[Position]) -> Result<f64, EngineError> {
        let total_value = total_position_value(positions);
        if !total_value.is_finite() || total_value <= 0.0 {
            return Err(EngineError::DegeneratePortfolio { total_value });
        }
        Ok(total_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EquityPosition, FuturesContract, FuturesPosition, PositionDirection, SecurityType};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn equity(symbol: &str, value: f64, returns: Option<Vec<f64>>) -> Position {
        let mut p = EquityPosition::new(symbol, symbol, SecurityType::Stock, 1.0, value, date(2025, 1, 2));
        p.common.historical_returns = returns;
        p.common.holding_period_days = 30;
        p.into()
    }

    fn es(margin_used: f64) -> Position {
        let contract = FuturesContract::new("ES", "E-mini S&P 500", 50.0, 0.25, 12.5, 0.06, date(2026, 12, 18), 4200.0);
        let mut p = FuturesPosition::from_contract(
            &contract,
            "ES Dec",
            PositionDirection::Long,
            1.0,
            4200.0,
            margin_used,
            date(2026, 9, 1),
        );
        p.common.historical_returns = Some(vec![0.0; 10]);
        p.into()
    }

    /// Always returns the same daily value.
    struct FixedReturns(f64);

    impl ReturnGenerator for FixedReturns {
        fn generate(&mut self, days: usize, _: f64, _: f64) -> Vec<f64> {
            vec![self.0; days]
        }
    }

    fn engine() -> RiskEngine {
        RiskEngine::with_providers(
            RiskConfig::default(),
            Arc::new(StaticBetaTable::default()),
            Box::new(FixedReturns(0.001)),
        )
    }

    // =========================================================================
    // Degenerate Portfolios
    // =========================================================================

    #[test]
    fn test_empty_portfolio_is_degenerate() {
        let err = engine().compute(&[]).unwrap_err();
        assert_eq!(err, EngineError::DegeneratePortfolio { total_value: 0.0 });
    }

    #[test]
    fn test_zero_value_portfolio_is_degenerate() {
        let positions = vec![equity("AAPL", 0.0, Some(vec![0.01]))];
        assert!(matches!(
            engine().compute(&positions),
            Err(EngineError::DegeneratePortfolio { .. })
        ));
    }

    #[test]
    fn test_degenerate_check_runs_before_backfill() {
        let mut positions = vec![equity("AAPL", 0.0, None)];
        assert!(engine().risk_metrics(&mut positions).is_err());
        assert!(positions[0].historical_returns().is_none());
    }

    // =========================================================================
    // Backfill
    // =========================================================================

    #[test]
    fn test_backfill_uses_holding_period() {
        let mut positions = vec![equity("AAPL", 100.0, None), equity("MSFT", 100.0, Some(vec![0.02]))];
        let filled = engine().backfill_returns(&mut positions);

        assert_eq!(filled, 1);
        assert_eq!(positions[0].historical_returns().unwrap().len(), 30);
        assert_eq!(positions[1].historical_returns().unwrap(), &[0.02]);
    }

    #[test]
    fn test_backfill_zero_holding_period_gets_one_day() {
        let mut position = equity("AAPL", 100.0, None);
        position.common_mut().holding_period_days = 0;
        let mut positions = vec![position];

        engine().backfill_returns(&mut positions);
        assert_eq!(positions[0].historical_returns().unwrap().len(), 1);
    }

    #[test]
    fn test_uniform_generator_bounds() {
        let mut generator = UniformReturnGenerator::new(Some(42));
        let days = 250;
        let returns = generator.generate(days, 0.08, 0.20);

        let drift = 0.08 / days as f64;
        let scale = 0.20 / (days as f64).sqrt();
        assert_eq!(returns.len(), days);
        assert!(returns.iter().all(|r| (r - drift).abs() <= scale + 1e-12));
    }

    #[test]
    fn test_uniform_generator_seeded_is_reproducible() {
        let a = UniformReturnGenerator::new(Some(7)).generate(20, 0.08, 0.20);
        let b = UniformReturnGenerator::new(Some(7)).generate(20, 0.08, 0.20);
        assert_eq!(a, b);
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    #[test]
    fn test_portfolio_returns_value_weighted() {
        let positions = vec![
            equity("AAPL", 300.0, Some(vec![0.01, 0.02, 0.03])),
            equity("MSFT", 100.0, Some(vec![0.04, -0.04])),
        ];
        let returns = portfolio_returns(&positions, 400.0, 365);

        // Window is the shortest series (2), aligned on the most recent days
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - (0.75 * 0.02 + 0.25 * 0.04)).abs() < 1e-12);
        assert!((returns[1] - (0.75 * 0.03 - 0.25 * 0.04)).abs() < 1e-12);
    }

    #[test]
    fn test_portfolio_returns_capped_window() {
        let positions = vec![equity("AAPL", 100.0, Some(vec![0.01; 400]))];
        assert_eq!(portfolio_returns(&positions, 100.0, 365).len(), 365);
    }

    #[test]
    fn test_windowed_moments_divide_by_window() {
        let (mean, variance) = windowed_moments(&[0.365, 0.365], 365);
        assert!((mean - 0.002).abs() < 1e-12);
        // two points at 0.363 from the mean, divided by 365
        assert!((variance - 2.0 * 0.363_f64.powi(2) / 365.0).abs() < 1e-12);
    }

    #[test]
    fn test_max_drawdown() {
        // 1.0 -> 1.1 -> 0.88 -> 0.968
        let dd = max_drawdown(&[0.10, -0.20, 0.10]);
        assert!((dd - (-0.2)).abs() < 1e-12);
    }

    #[test]
    fn test_max_drawdown_monotonic_rise() {
        assert_eq!(max_drawdown(&[0.01, 0.02, 0.03]), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    // =========================================================================
    // Metrics
    // =========================================================================

    #[test]
    fn test_beta_defaults_for_unknown_symbol() {
        let positions = vec![
            equity("AAPL", 500.0, Some(vec![0.0])),
            equity("XOM", 500.0, Some(vec![0.0])),
        ];
        let metrics = engine().compute(&positions).unwrap();

        // 0.5 * 1.25 + 0.5 * 1.0
        assert!((metrics.beta - 1.125).abs() < 1e-12);
    }

    #[test]
    fn test_flat_returns_have_zero_volatility_and_sharpe() {
        let positions = vec![equity("AAPL", 100.0, Some(vec![0.0; 30]))];
        let metrics = engine().compute(&positions).unwrap();

        assert_eq!(metrics.volatility, 0.0);
        assert_eq!(metrics.sharpe_ratio, 0.0);
        assert_eq!(metrics.max_drawdown, 0.0);
    }

    #[test]
    fn test_sharpe_and_volatility() {
        let returns = vec![0.01, -0.01];
        let positions = vec![equity("AAPL", 100.0, Some(returns.clone()))];
        let metrics = engine().compute(&positions).unwrap();

        let (mean, variance) = windowed_moments(&returns, 365);
        let volatility = (variance * 365.0).sqrt();
        assert!((metrics.volatility - volatility).abs() < 1e-12);
        assert!((metrics.sharpe_ratio - (mean * 252.0 - 0.05) / volatility).abs() < 1e-9);
        assert!((metrics.max_drawdown - (-0.01)).abs() < 1e-12);
    }

    #[test]
    fn test_futures_metrics() {
        // equity 10_000 + futures 210_000 = 220_000
        let positions = vec![equity("AAPL", 10_000.0, Some(vec![0.0; 10])), es(12_600.0)];
        let metrics = engine().compute(&positions).unwrap();

        assert!((metrics.margin_utilization - 12_600.0 / 220_000.0).abs() < 1e-12);
        assert!((metrics.leverage_ratio - 220_000.0 / (220_000.0 - 12_600.0)).abs() < 1e-12);
        assert!((metrics.futures_exposure - 210_000.0 / 220_000.0).abs() < 1e-12);
    }

    #[test]
    fn test_leverage_ratio_guarded_when_fully_margined() {
        let positions = vec![es(210_000.0)];
        let metrics = engine().compute(&positions).unwrap();
        assert_eq!(metrics.leverage_ratio, 0.0);
    }

    #[test]
    fn test_delta_is_placeholder() {
        let positions = vec![equity("AAPL", 100.0, Some(vec![0.01]))];
        assert_eq!(engine().compute(&positions).unwrap().delta, 0.85);
    }

    #[test]
    fn test_risk_metrics_backfills_then_computes() {
        let mut positions = vec![equity("AAPL", 100.0, None)];
        let metrics = engine().risk_metrics(&mut positions).unwrap();

        assert_eq!(positions[0].historical_returns().unwrap().len(), 30);
        // 30 days of 0.1% compounding never draws down
        assert_eq!(metrics.max_drawdown, 0.0);
        assert!(metrics.volatility > 0.0);
    }
}
