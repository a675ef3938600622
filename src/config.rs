use std::env;
use std::time::Duration;

/// Price simulator and pipeline tick configuration.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Interval between recompute passes (ms).
    pub tick_interval_ms: u64,
    /// Whether ticks move prices and FX rates. When false the pipeline only
    /// revalues against whatever the price book holds.
    pub enabled: bool,
    /// Maximum fractional price move per tick (0.01 = ±1%).
    pub price_volatility: f64,
    /// Maximum fractional FX rate move per tick.
    pub fx_volatility: f64,
    /// Seed for reproducible runs.
    pub seed: Option<u64>,
}

impl SimulatorConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 5_000,
            enabled: true,
            price_volatility: 0.01,
            fx_volatility: 0.002,
            seed: None,
        }
    }
}

/// Risk engine constants.
#[derive(Debug, Clone)]
pub struct RiskConfig {
    /// Annual risk-free rate used by the Sharpe ratio.
    pub risk_free_rate: f64,
    /// Trading days used to annualize mean return.
    pub trading_days: f64,
    /// Fixed window (days) for the return mean/variance and volatility scaling.
    pub volatility_window_days: usize,
    /// Annualized mean of backfilled return series.
    pub simulated_annual_return: f64,
    /// Annualized standard deviation of backfilled return series.
    pub simulated_annual_volatility: f64,
    /// Reported portfolio delta (placeholder).
    pub delta_placeholder: f64,
    /// Seed for the return-series generator.
    pub returns_seed: Option<u64>,
    /// Longest holding period (days) accepted from API callers.
    pub max_holding_period_days: u32,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.05,
            trading_days: 252.0,
            volatility_window_days: 365,
            simulated_annual_return: 0.08,
            simulated_annual_volatility: 0.20,
            delta_placeholder: 0.85,
            returns_seed: None,
            max_holding_period_days: 36_500,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Price simulator configuration.
    pub simulator: SimulatorConfig,
    /// Risk engine configuration.
    pub risk: RiskConfig,
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn flag_env(key: &str) -> Option<bool> {
    env::var(key).ok().map(|v| v == "true" || v == "1")
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let simulator_defaults = SimulatorConfig::default();
        let risk_defaults = RiskConfig::default();

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env("PORT").unwrap_or(3001),
            simulator: SimulatorConfig {
                tick_interval_ms: parse_env("TICK_INTERVAL_MS")
                    .unwrap_or(simulator_defaults.tick_interval_ms),
                enabled: flag_env("SIMULATE_PRICES").unwrap_or(simulator_defaults.enabled),
                price_volatility: parse_env("PRICE_VOLATILITY")
                    .unwrap_or(simulator_defaults.price_volatility),
                fx_volatility: parse_env("FX_VOLATILITY")
                    .unwrap_or(simulator_defaults.fx_volatility),
                seed: parse_env("SIMULATOR_SEED"),
            },
            risk: RiskConfig {
                risk_free_rate: parse_env("RISK_FREE_RATE")
                    .unwrap_or(risk_defaults.risk_free_rate),
                trading_days: parse_env("TRADING_DAYS").unwrap_or(risk_defaults.trading_days),
                volatility_window_days: parse_env("VOLATILITY_WINDOW_DAYS")
                    .unwrap_or(risk_defaults.volatility_window_days),
                simulated_annual_return: parse_env("SIMULATED_ANNUAL_RETURN")
                    .unwrap_or(risk_defaults.simulated_annual_return),
                simulated_annual_volatility: parse_env("SIMULATED_ANNUAL_VOLATILITY")
                    .unwrap_or(risk_defaults.simulated_annual_volatility),
                delta_placeholder: parse_env("DELTA_PLACEHOLDER")
                    .unwrap_or(risk_defaults.delta_placeholder),
                returns_seed: parse_env("RETURNS_SEED"),
                max_holding_period_days: parse_env("MAX_HOLDING_PERIOD_DAYS")
                    .unwrap_or(risk_defaults.max_holding_period_days),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            simulator: SimulatorConfig::default(),
            risk: RiskConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // SimulatorConfig Tests
    // =========================================================================

    #[test]
    fn test_simulator_config_defaults() {
        let config = SimulatorConfig::default();

        assert_eq!(config.tick_interval_ms, 5_000);
        assert!(config.enabled);
        assert_eq!(config.price_volatility, 0.01);
        assert_eq!(config.fx_volatility, 0.002);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_tick_interval_never_zero() {
        let config = SimulatorConfig {
            tick_interval_ms: 0,
            ..SimulatorConfig::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(1));
    }

    // =========================================================================
    // RiskConfig Tests
    // =========================================================================

    #[test]
    fn test_risk_config_defaults() {
        let config = RiskConfig::default();

        assert_eq!(config.risk_free_rate, 0.05);
        assert_eq!(config.trading_days, 252.0);
        assert_eq!(config.volatility_window_days, 365);
        assert_eq!(config.simulated_annual_return, 0.08);
        assert_eq!(config.simulated_annual_volatility, 0.20);
        assert_eq!(config.delta_placeholder, 0.85);
        assert_eq!(config.max_holding_period_days, 36_500);
    }

    // =========================================================================
    // Config Tests
    // =========================================================================

    #[test]
    fn test_config_default_values() {
        let config = Config::default();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3001);
        assert_eq!(config.simulator.tick_interval_ms, 5_000);
        assert_eq!(config.risk.risk_free_rate, 0.05);
    }

    #[test]
    fn test_config_clone() {
        let config = Config {
            host: "localhost".to_string(),
            port: 8080,
            simulator: SimulatorConfig {
                seed: Some(7),
                ..SimulatorConfig::default()
            },
            risk: RiskConfig::default(),
        };

        let cloned = config.clone();
        assert_eq!(cloned.host, config.host);
        assert_eq!(cloned.port, config.port);
        assert_eq!(cloned.simulator.seed, Some(7));
    }
}
