//! Price data access port trait.

use chrono::NaiveDateTime;

use crate::domain::bar::PriceBar;
use crate::domain::error::EmacrossError;

pub trait PriceDataPort {
    /// Fetch the full bar series, oldest first.
    fn fetch_bars(&self) -> Result<Vec<PriceBar>, EmacrossError>;

    /// First timestamp, last timestamp and bar count, or `None` when the
    /// source is empty.
    fn data_range(&self) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, EmacrossError>;
}
