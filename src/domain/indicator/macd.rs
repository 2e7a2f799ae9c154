//! MACD (Moving Average Convergence Divergence).
//!
//! Line = EMA(fast) - EMA(slow); signal = EMA(signal_period) of the line;
//! histogram = line - signal. Warm-up: (slow - 1) + (signal_period - 1) bars.

use crate::domain::bar::PriceBar;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    bars: &[PriceBar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };

    if bars.is_empty() || fast == 0 || slow == 0 || signal_period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let ema_fast = raw_ema(bars, fast);
    let ema_slow = raw_ema(bars, slow);
    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();

    // Signal line: EMA of the MACD line, seeded once the line itself is
    // defined (after slow-1 bars).
    let line_warmup = slow.saturating_sub(1);
    let mut signal_line = vec![0.0; bars.len()];

    if line_warmup + signal_period <= bars.len() {
        let seed_end = line_warmup + signal_period;
        let mut signal_ema =
            macd_line[line_warmup..seed_end].iter().sum::<f64>() / signal_period as f64;
        signal_line[seed_end - 1] = signal_ema;

        let k = 2.0 / (signal_period as f64 + 1.0);
        for i in seed_end..bars.len() {
            signal_ema = macd_line[i] * k + signal_ema * (1.0 - k);
            signal_line[i] = signal_ema;
        }
    }

    let warmup = line_warmup + signal_period.saturating_sub(1);
    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorPoint {
            timestamp: bar.timestamp,
            valid: i >= warmup,
            value: IndicatorValue::Macd {
                line: macd_line[i],
                signal: signal_line[i],
                histogram: macd_line[i] - signal_line[i],
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

pub fn calculate_macd_default(bars: &[PriceBar]) -> IndicatorSeries {
    calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

/// Raw EMA values with 0.0 in the warm-up slots.
fn raw_ema(bars: &[PriceBar], period: usize) -> Vec<f64> {
    calculate_ema(bars, period)
        .values
        .iter()
        .map(|p| match p.value {
            IndicatorValue::Simple(v) => v,
            _ => 0.0,
        })
        .collect()
}
