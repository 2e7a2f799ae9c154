//! Bollinger Bands: SMA middle band, upper/lower at ±multiplier standard
//! deviations (population stddev). Warm-up: period - 1 bars.
//!
//! The multiplier is carried as an integer ×100 so the parameterization can
//! serve as a hash key.

use crate::domain::bar::PriceBar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_bollinger(
    bars: &[PriceBar],
    period: usize,
    stddev_mult_x100: u32,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Bollinger {
        period,
        stddev_mult_x100,
    };

    if period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let mult = stddev_mult_x100 as f64 / 100.0;
    let warmup = period - 1;
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let valid = i >= warmup;
        let (upper, middle, lower) = if valid {
            let window = &bars[i + 1 - period..=i];
            let middle: f64 = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
            let variance: f64 = window
                .iter()
                .map(|b| {
                    let d = b.close - middle;
                    d * d
                })
                .sum::<f64>()
                / period as f64;
            let offset = mult * variance.sqrt();
            (middle + offset, middle, middle - offset)
        } else {
            (0.0, 0.0, 0.0)
        };

        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid,
            value: IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            },
        });
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}
