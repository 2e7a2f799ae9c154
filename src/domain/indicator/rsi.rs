//! RSI (Relative Strength Index), Wilder smoothing.
//!
//! First average gain/loss is the simple mean over the first n changes;
//! thereafter avg = (prev_avg * (n-1) + current) / n.
//! RSI = 100 - 100/(1 + avg_gain/avg_loss); 100 when avg_loss == 0.
//! The first n bars are warm-up (n price changes are needed).

use crate::domain::bar::PriceBar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_rsi(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let mut values: Vec<IndicatorPoint> = Vec::with_capacity(bars.len());

    if period == 0 || bars.len() < 2 {
        for bar in bars {
            values.push(invalid_point(bar));
        }
        return IndicatorSeries {
            indicator_type: IndicatorType::Rsi(period),
            values,
        };
    }

    values.push(invalid_point(&bars[0]));

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 1..bars.len() {
        let change = bars[i].close - bars[i - 1].close;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        if i < period {
            // Accumulating toward the first average.
            avg_gain += gain;
            avg_loss += loss;
            values.push(invalid_point(&bars[i]));
            continue;
        }

        if i == period {
            avg_gain = (avg_gain + gain) / period as f64;
            avg_loss = (avg_loss + loss) / period as f64;
        } else {
            avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        }

        let rsi = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        };
        values.push(IndicatorPoint {
            timestamp: bars[i].timestamp,
            valid: true,
            value: IndicatorValue::Simple(rsi),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

fn invalid_point(bar: &PriceBar) -> IndicatorPoint {
    IndicatorPoint {
        timestamp: bar.timestamp,
        valid: false,
        value: IndicatorValue::Simple(0.0),
    }
}
