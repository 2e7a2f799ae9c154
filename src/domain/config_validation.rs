//! Validated strategy, gate and backtest parameters.
//!
//! Raw config values arrive untyped from the config port; these constructors
//! are the only way to obtain the parameter structs, so downstream code never
//! re-checks ranges.

use std::str::FromStr;

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::EmacrossError;

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> EmacrossError {
    EmacrossError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Crossover strategy parameters, range-checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyParams {
    pub fast_period: usize,
    pub slow_period: usize,
    pub position_size: f64,
}

impl StrategyParams {
    pub fn new(
        fast_period: i64,
        slow_period: i64,
        position_size: f64,
    ) -> Result<Self, EmacrossError> {
        if fast_period < 1 {
            return Err(invalid("strategy", "fast_period", "must be at least 1"));
        }
        if slow_period < 1 {
            return Err(invalid("strategy", "slow_period", "must be at least 1"));
        }
        if fast_period >= slow_period {
            return Err(invalid(
                "strategy",
                "fast_period",
                format!(
                    "fast period ({}) must be shorter than slow period ({})",
                    fast_period, slow_period
                ),
            ));
        }
        if !position_size.is_finite() || position_size <= 0.0 {
            return Err(invalid("strategy", "position_size", "must be positive"));
        }
        Ok(StrategyParams {
            fast_period: fast_period as usize,
            slow_period: slow_period as usize,
            position_size,
        })
    }

    /// Bars required before the slow EMA defines and a cross can be observed.
    pub fn minimum_bars(&self) -> usize {
        self.slow_period + 1
    }
}

/// Which confirmation gate to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateMode {
    Off,
    Auto,
    Rsi,
}

impl FromStr for GateMode {
    type Err = EmacrossError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" => Ok(GateMode::Off),
            "auto" => Ok(GateMode::Auto),
            "rsi" => Ok(GateMode::Rsi),
            other => Err(invalid(
                "gate",
                "mode",
                format!("unknown mode '{}', expected off, auto or rsi", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateParams {
    pub mode: GateMode,
    pub overbought: f64,
    pub oversold: f64,
}

impl GateParams {
    pub fn new(mode: GateMode, overbought: f64, oversold: f64) -> Result<Self, EmacrossError> {
        if !(0.0..=100.0).contains(&overbought) {
            return Err(invalid("gate", "overbought", "must be within 0..=100"));
        }
        if !(0.0..=100.0).contains(&oversold) {
            return Err(invalid("gate", "oversold", "must be within 0..=100"));
        }
        if oversold >= overbought {
            return Err(invalid(
                "gate",
                "oversold",
                format!(
                    "oversold ({}) must be below overbought ({})",
                    oversold, overbought
                ),
            ));
        }
        Ok(GateParams {
            mode,
            overbought,
            oversold,
        })
    }
}

/// Range-check and assemble the backtest parameters.
pub fn validate_backtest_config(
    initial_equity: f64,
    position_size: f64,
    risk_free_rate: f64,
) -> Result<BacktestConfig, EmacrossError> {
    if !initial_equity.is_finite() || initial_equity <= 0.0 {
        return Err(invalid("backtest", "initial_equity", "must be positive"));
    }
    if !position_size.is_finite() || position_size <= 0.0 {
        return Err(invalid("strategy", "position_size", "must be positive"));
    }
    if !risk_free_rate.is_finite() || !(0.0..1.0).contains(&risk_free_rate) {
        return Err(invalid(
            "backtest",
            "risk_free_rate",
            "must be within 0.0..1.0",
        ));
    }
    Ok(BacktestConfig {
        initial_equity,
        position_size,
        risk_free_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_sane_strategy() {
        let params = StrategyParams::new(9, 21, 1.0).unwrap();
        assert_eq!(params.fast_period, 9);
        assert_eq!(params.slow_period, 21);
        assert_eq!(params.minimum_bars(), 22);
    }

    #[test]
    fn rejects_fast_not_shorter_than_slow() {
        assert!(StrategyParams::new(21, 21, 1.0).is_err());
        assert!(StrategyParams::new(30, 21, 1.0).is_err());
    }

    #[test]
    fn rejects_non_positive_periods_and_size() {
        assert!(StrategyParams::new(0, 21, 1.0).is_err());
        assert!(StrategyParams::new(9, 0, 1.0).is_err());
        assert!(StrategyParams::new(9, 21, 0.0).is_err());
        assert!(StrategyParams::new(9, 21, -2.0).is_err());
        assert!(StrategyParams::new(9, 21, f64::NAN).is_err());
    }

    #[test]
    fn gate_mode_parses_case_insensitively() {
        assert_eq!("off".parse::<GateMode>().unwrap(), GateMode::Off);
        assert_eq!("AUTO".parse::<GateMode>().unwrap(), GateMode::Auto);
        assert_eq!(" Rsi ".parse::<GateMode>().unwrap(), GateMode::Rsi);
        assert!("llm".parse::<GateMode>().is_err());
    }

    #[test]
    fn gate_thresholds_must_be_ordered_percentiles() {
        assert!(GateParams::new(GateMode::Rsi, 70.0, 30.0).is_ok());
        assert!(GateParams::new(GateMode::Rsi, 30.0, 70.0).is_err());
        assert!(GateParams::new(GateMode::Rsi, 120.0, 30.0).is_err());
        assert!(GateParams::new(GateMode::Rsi, 70.0, -5.0).is_err());
    }

    #[test]
    fn backtest_config_ranges() {
        assert!(validate_backtest_config(10_000.0, 1.0, 0.0).is_ok());
        assert!(validate_backtest_config(10_000.0, 1.0, 0.05).is_ok());
        assert!(validate_backtest_config(0.0, 1.0, 0.0).is_err());
        assert!(validate_backtest_config(-5.0, 1.0, 0.0).is_err());
        assert!(validate_backtest_config(10_000.0, 0.0, 0.0).is_err());
        assert!(validate_backtest_config(10_000.0, 1.0, 1.0).is_err());
        assert!(validate_backtest_config(10_000.0, 1.0, -0.1).is_err());
    }

    #[test]
    fn error_names_section_and_key() {
        let err = StrategyParams::new(21, 9, 1.0).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("strategy"));
        assert!(text.contains("fast_period"));
    }
}
