//! OHLCV bar representation.

use chrono::NaiveDate;

/// Floor for the high-low range so a zero-range bar never divides by zero.
pub const RANGE_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// high - low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Where the close sits inside the bar: 1.0 at the high, 0.0 at the low.
    pub fn close_location(&self) -> f64 {
        (self.close - self.low) / self.range().max(RANGE_EPSILON)
    }

    pub(crate) fn prices(&self) -> [f64; 4] {
        [self.open, self.high, self.low, self.close]
    }
}
