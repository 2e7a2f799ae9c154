//! Technical indicator implementations.
//!
//! Indicator series mirror their input bar series one-to-one. Warm-up bars
//! carry `valid = false` and must never be read as numeric zero; use
//! [`IndicatorSeries::simple_at`] to get a defined-or-`None` scalar value.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod obv;
pub mod rsi;

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Rsi(usize),
    Atr(usize),
    Obv,
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Scalar value at index `i`, or `None` while warming up (or when the
    /// series holds a non-scalar value).
    pub fn simple_at(&self, i: usize) -> Option<f64> {
        let point = self.values.get(i)?;
        if !point.valid {
            return None;
        }
        match point.value {
            IndicatorValue::Simple(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Obv => write!(f, "OBV"),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn display_ema() {
        assert_eq!(IndicatorType::Ema(13).to_string(), "EMA(13)");
    }

    #[test]
    fn display_macd() {
        let macd = IndicatorType::Macd {
            fast: 12,
            slow: 26,
            signal: 9,
        };
        assert_eq!(macd.to_string(), "MACD(12,26,9)");
    }

    #[test]
    fn display_bollinger() {
        let boll = IndicatorType::Bollinger {
            period: 20,
            stddev_mult_x100: 200,
        };
        assert_eq!(boll.to_string(), "BOLLINGER(20,2)");
    }

    #[test]
    fn simple_at_hides_warmup() {
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Ema(2),
            values: vec![
                IndicatorPoint {
                    timestamp: ts(),
                    valid: false,
                    value: IndicatorValue::Simple(0.0),
                },
                IndicatorPoint {
                    timestamp: ts(),
                    valid: true,
                    value: IndicatorValue::Simple(42.0),
                },
            ],
        };
        assert_eq!(series.simple_at(0), None);
        assert_eq!(series.simple_at(1), Some(42.0));
        assert_eq!(series.simple_at(2), None);
    }

    #[test]
    fn simple_at_rejects_composite_values() {
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Macd {
                fast: 12,
                slow: 26,
                signal: 9,
            },
            values: vec![IndicatorPoint {
                timestamp: ts(),
                valid: true,
                value: IndicatorValue::Macd {
                    line: 1.0,
                    signal: 0.5,
                    histogram: 0.5,
                },
            }],
        };
        assert_eq!(series.simple_at(0), None);
    }
}
