//! CSV file price data adapter.
//!
//! Expects a header row and columns timestamp,open,high,low,close,volume.
//! Timestamps accept `%Y-%m-%d %H:%M:%S` or a bare date, which maps to
//! midnight. Rows are sorted by timestamp after the read.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fs;
use std::path::PathBuf;

use crate::domain::bar::PriceBar;
use crate::domain::error::EmacrossError;
use crate::ports::data_port::PriceDataPort;

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn data_error(reason: String) -> EmacrossError {
    EmacrossError::Data { reason }
}

fn parse_timestamp(raw: &str, row: usize) -> Result<NaiveDateTime, EmacrossError> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(ts);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|e| data_error(format!("row {}: invalid timestamp '{}': {}", row, raw, e)))
}

fn parse_column(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    row: usize,
) -> Result<f64, EmacrossError> {
    record
        .get(index)
        .ok_or_else(|| data_error(format!("row {}: missing {} column", row, name)))?
        .parse()
        .map_err(|e| data_error(format!("row {}: invalid {} value: {}", row, name, e)))
}

impl PriceDataPort for CsvAdapter {
    fn fetch_bars(&self) -> Result<Vec<PriceBar>, EmacrossError> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            data_error(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (i, result) in rdr.records().enumerate() {
            let row = i + 2; // 1-based, after the header
            let record = result.map_err(|e| data_error(format!("CSV parse error: {}", e)))?;

            let raw_ts = record
                .get(0)
                .ok_or_else(|| data_error(format!("row {}: missing timestamp column", row)))?;

            bars.push(PriceBar {
                timestamp: parse_timestamp(raw_ts, row)?,
                open: parse_column(&record, 1, "open", row)?,
                high: parse_column(&record, 2, "high", row)?,
                low: parse_column(&record, 3, "low", row)?,
                close: parse_column(&record, 4, "close", row)?,
                volume: parse_column(&record, 5, "volume", row)?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }

    fn data_range(&self) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, EmacrossError> {
        let bars = self.fetch_bars()?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp, bars.len())),
            _ => None,
        })
    }
}
