//! OBV (On-Balance Volume).
//!
//! OBV[0] = volume[0]; rising close adds volume, falling close subtracts,
//! unchanged close carries forward. No warm-up.

use crate::domain::bar::PriceBar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_obv(bars: &[PriceBar]) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let mut obv = 0.0;
    let mut prev_close = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        if i == 0 {
            obv = bar.volume;
        } else if bar.close > prev_close {
            obv += bar.volume;
        } else if bar.close < prev_close {
            obv -= bar.volume;
        }
        prev_close = bar.close;

        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid: true,
            value: IndicatorValue::Simple(obv),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Obv,
        values,
    }
}
