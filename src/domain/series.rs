//! Validated per-symbol bar series.
//!
//! A `Series` can only be built from data that passed every check, so the
//! indicator engine never sees a corrupt bar. Bad input is rejected with the
//! index of the first offending bar; nothing is repaired or skipped.

use crate::domain::error::{DataGapError, GapKind};
use crate::domain::ohlcv::Bar;
use std::cmp::Ordering;

/// Serialize only: deserializing would bypass validation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Series {
    symbol: String,
    bars: Vec<Bar>,
}

impl Series {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, DataGapError> {
        validate_bars(&bars)?;
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }
}

fn validate_bars(bars: &[Bar]) -> Result<(), DataGapError> {
    if bars.is_empty() {
        return Err(DataGapError::new(0, GapKind::EmptySeries));
    }

    for (i, bar) in bars.iter().enumerate() {
        validate_bar(i, bar)?;
        if i > 0 {
            match bar.date.cmp(&bars[i - 1].date) {
                Ordering::Greater => {}
                Ordering::Equal => {
                    return Err(DataGapError::new(i, GapKind::DuplicateTimestamp));
                }
                Ordering::Less => {
                    return Err(DataGapError::new(i, GapKind::NonIncreasingTimestamp));
                }
            }
        }
    }
    Ok(())
}

fn validate_bar(index: usize, bar: &Bar) -> Result<(), DataGapError> {
    let prices = bar.prices();
    if prices.iter().any(|p| !p.is_finite()) {
        return Err(DataGapError::new(index, GapKind::NonFinitePrice));
    }
    if prices.iter().any(|&p| p <= 0.0) {
        return Err(DataGapError::new(index, GapKind::NonPositivePrice));
    }
    if !bar.volume.is_finite() {
        return Err(DataGapError::new(index, GapKind::NonFiniteVolume));
    }
    if bar.volume <= 0.0 {
        return Err(DataGapError::new(index, GapKind::NonPositiveVolume));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bar(date: &str, close: f64) -> Bar {
        Bar {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1000.0,
        }
    }

    fn three_bars() -> Vec<Bar> {
        vec![
            make_bar("2024-01-01", 100.0),
            make_bar("2024-01-02", 101.0),
            make_bar("2024-01-03", 102.0),
        ]
    }

    #[test]
    fn accepts_ordered_bars() {
        let series = Series::new("BHP", three_bars()).unwrap();
        assert_eq!(series.symbol(), "BHP");
        assert_eq!(series.len(), 3);
        assert!(!series.is_empty());
        assert_eq!(
            series.last().map(|b| b.date),
            NaiveDate::from_ymd_opt(2024, 1, 3)
        );
    }

    #[test]
    fn rejects_empty() {
        let err = Series::new("BHP", vec![]).unwrap_err();
        assert_eq!(err, DataGapError::new(0, GapKind::EmptySeries));
    }

    #[test]
    fn rejects_duplicate_timestamp() {
        let mut bars = three_bars();
        bars[2].date = bars[1].date;
        let err = Series::new("BHP", bars).unwrap_err();
        assert_eq!(err, DataGapError::new(2, GapKind::DuplicateTimestamp));
    }

    #[test]
    fn rejects_out_of_order() {
        let mut bars = three_bars();
        bars.swap(0, 1);
        let err = Series::new("BHP", bars).unwrap_err();
        assert_eq!(err, DataGapError::new(1, GapKind::NonIncreasingTimestamp));
    }

    #[test]
    fn rejects_nan_close() {
        let mut bars = three_bars();
        bars[1].close = f64::NAN;
        let err = Series::new("BHP", bars).unwrap_err();
        assert_eq!(err, DataGapError::new(1, GapKind::NonFinitePrice));
    }

    #[test]
    fn rejects_infinite_high() {
        let mut bars = three_bars();
        bars[0].high = f64::INFINITY;
        let err = Series::new("BHP", bars).unwrap_err();
        assert_eq!(err, DataGapError::new(0, GapKind::NonFinitePrice));
    }

    #[test]
    fn rejects_zero_open() {
        let mut bars = three_bars();
        bars[2].open = 0.0;
        let err = Series::new("BHP", bars).unwrap_err();
        assert_eq!(err, DataGapError::new(2, GapKind::NonPositivePrice));
    }

    #[test]
    fn rejects_bad_volume() {
        let mut bars = three_bars();
        bars[1].volume = 0.0;
        assert_eq!(
            Series::new("BHP", bars.clone()).unwrap_err(),
            DataGapError::new(1, GapKind::NonPositiveVolume)
        );

        bars[1].volume = f64::NAN;
        assert_eq!(
            Series::new("BHP", bars).unwrap_err(),
            DataGapError::new(1, GapKind::NonFiniteVolume)
        );
    }

    #[test]
    fn first_bad_bar_wins() {
        let mut bars = three_bars();
        bars[0].low = -1.0;
        bars[2].close = f64::NAN;
        let err = Series::new("BHP", bars).unwrap_err();
        assert_eq!(err.index, 0);
    }
}
