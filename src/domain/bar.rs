//! Price bar representation and input-series integrity checks.

use chrono::NaiveDateTime;

use crate::domain::error::EmacrossError;

/// One OHLCV bar. Immutable once produced by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Validate the series contract: strictly increasing timestamps, positive
/// prices, a sane high/low envelope, and non-negative volume.
///
/// Providers are expected to hand over clean series; a violation here is a
/// data-integrity fault, never silently repaired.
pub fn validate_series(bars: &[PriceBar]) -> Result<(), EmacrossError> {
    for (i, bar) in bars.iter().enumerate() {
        if bar.open <= 0.0 || bar.high <= 0.0 || bar.low <= 0.0 || bar.close <= 0.0 {
            return Err(EmacrossError::DataIntegrity {
                reason: format!("non-positive price at bar {} ({})", i, bar.timestamp),
            });
        }
        if bar.high < bar.low {
            return Err(EmacrossError::DataIntegrity {
                reason: format!("high below low at bar {} ({})", i, bar.timestamp),
            });
        }
        if bar.volume < 0.0 {
            return Err(EmacrossError::DataIntegrity {
                reason: format!("negative volume at bar {} ({})", i, bar.timestamp),
            });
        }
        if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
            return Err(EmacrossError::DataIntegrity {
                reason: format!(
                    "non-increasing timestamp at bar {}: {} then {}",
                    i,
                    bars[i - 1].timestamp,
                    bar.timestamp
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn bar(timestamp: NaiveDateTime, close: f64) -> PriceBar {
        PriceBar {
            timestamp,
            open: close,
            high: close + 5.0,
            low: close - 5.0,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn true_range_hl_dominates() {
        let b = PriceBar {
            timestamp: ts(15, 10),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: 50_000.0,
        };
        // high-low=20, |high-100|=10, |low-100|=10
        assert!((b.true_range(100.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let b = PriceBar {
            timestamp: ts(15, 10),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: 50_000.0,
        };
        // |110-70|=40 dominates
        assert!((b.true_range(70.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn valid_series_passes() {
        let bars = vec![bar(ts(1, 10), 100.0), bar(ts(1, 11), 101.0), bar(ts(2, 10), 99.0)];
        assert!(validate_series(&bars).is_ok());
    }

    #[test]
    fn empty_series_passes() {
        assert!(validate_series(&[]).is_ok());
    }

    #[test]
    fn duplicate_timestamp_rejected() {
        let bars = vec![bar(ts(1, 10), 100.0), bar(ts(1, 10), 101.0)];
        let err = validate_series(&bars).unwrap_err();
        assert!(matches!(err, EmacrossError::DataIntegrity { .. }));
    }

    #[test]
    fn out_of_order_timestamp_rejected() {
        let bars = vec![bar(ts(2, 10), 100.0), bar(ts(1, 10), 101.0)];
        assert!(validate_series(&bars).is_err());
    }

    #[test]
    fn non_positive_price_rejected() {
        let mut bars = vec![bar(ts(1, 10), 100.0)];
        bars[0].close = 0.0;
        assert!(validate_series(&bars).is_err());
    }

    #[test]
    fn inverted_envelope_rejected() {
        let mut bars = vec![bar(ts(1, 10), 100.0)];
        bars[0].high = 90.0;
        bars[0].low = 110.0;
        assert!(validate_series(&bars).is_err());
    }

    #[test]
    fn negative_volume_rejected() {
        let mut bars = vec![bar(ts(1, 10), 100.0)];
        bars[0].volume = -1.0;
        assert!(validate_series(&bars).is_err());
    }
}
