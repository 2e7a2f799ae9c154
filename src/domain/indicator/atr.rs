//! ATR (Average True Range), Wilder smoothing.
//!
//! TR[0] = high - low; TR[i] uses the previous close. Seed is the simple
//! average of the first n true ranges, then ATR = (prev*(n-1) + TR)/n.

use crate::domain::bar::PriceBar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_atr(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.is_empty() {
        return IndicatorSeries {
            indicator_type: IndicatorType::Atr(period),
            values: Vec::new(),
        };
    }

    let mut tr = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        if i == 0 {
            tr.push(bar.high - bar.low);
        } else {
            tr.push(bar.true_range(bars[i - 1].close));
        }
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut atr = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        let point = if i + 1 < period {
            IndicatorPoint {
                timestamp: bar.timestamp,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            }
        } else {
            if i + 1 == period {
                atr = tr[..period].iter().sum::<f64>() / period as f64;
            } else {
                atr = (atr * (period - 1) as f64 + tr[i]) / period as f64;
            }
            IndicatorPoint {
                timestamp: bar.timestamp,
                valid: true,
                value: IndicatorValue::Simple(atr),
            }
        };
        values.push(point);
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    }
}
