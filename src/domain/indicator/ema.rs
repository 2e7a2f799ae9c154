//! Exponential Moving Average.
//!
//! k = 2/(n+1); seeded with the SMA of the first n closes, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k). The first (n-1) bars are warm-up.

use crate::domain::bar::PriceBar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_ema(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.is_empty() {
        return IndicatorSeries {
            indicator_type: IndicatorType::Ema(period),
            values: Vec::new(),
        };
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut values = Vec::with_capacity(bars.len());
    let mut ema = 0.0;
    let mut warmup_sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        let point = if i + 1 < period {
            warmup_sum += bar.close;
            IndicatorPoint {
                timestamp: bar.timestamp,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            }
        } else {
            if i + 1 == period {
                warmup_sum += bar.close;
                ema = warmup_sum / period as f64;
            } else {
                ema = bar.close * k + ema * (1.0 - k);
            }
            IndicatorPoint {
                timestamp: bar.timestamp,
                valid: true,
                value: IndicatorValue::Simple(ema),
            }
        };
        values.push(point);
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}
