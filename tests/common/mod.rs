#![allow(dead_code)]

use chrono::NaiveDate;
pub use sigtrader::domain::ohlcv::Bar;
use sigtrader::domain::error::SigtraderError;
use sigtrader::domain::series::Series;
use sigtrader::domain::signal::{Reason, Signal, SignalKind};
use sigtrader::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<Bar>, SigtraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SigtraderError::Io(std::io::Error::other(reason.clone())));
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn day(i: usize) -> NaiveDate {
    date(2024, 1, 1) + chrono::Duration::days(i as i64)
}

/// Bar closing in the top tenth of its range, opening at `prev_close`.
pub fn strong_bar(i: usize, prev_close: f64, close: f64, volume: f64) -> Bar {
    Bar {
        date: day(i),
        open: prev_close,
        high: close * 1.001,
        low: close * 0.99,
        close,
        volume,
    }
}

/// Bar closing just above its low after opening at `prev_close`.
pub fn weak_bar(i: usize, prev_close: f64, close: f64, volume: f64) -> Bar {
    Bar {
        date: day(i),
        open: prev_close,
        high: prev_close * 1.001,
        low: close * 0.999,
        close,
        volume,
    }
}

pub fn flat_bars(count: usize, price: f64, volume: f64) -> Vec<Bar> {
    (0..count)
        .map(|i| Bar {
            date: day(i),
            open: price,
            high: price + 1.0,
            low: price - 1.0,
            close: price,
            volume,
        })
        .collect()
}

/// Closes rise 1% per bar from 100; volume 1000, doubling from `surge_at` on.
pub fn rising_bars(count: usize, surge_at: usize) -> Vec<Bar> {
    let mut bars = Vec::with_capacity(count);
    let mut prev = 100.0 / 1.01;
    for i in 0..count {
        let close = 100.0 * 1.01_f64.powi(i as i32);
        let volume = if i >= surge_at { 2000.0 } else { 1000.0 };
        bars.push(strong_bar(i, prev, close, volume));
        prev = close;
    }
    bars
}

/// 60 bars of steady 1% gains with the volume doubling at bar 25.
pub fn scenario_a() -> Series {
    Series::new("SCNA", rising_bars(60, 25)).unwrap()
}

/// 40 rising bars, volume doubling at bar 37, then three bars losing 10% in
/// total and closing near their lows.
pub fn scenario_b() -> Series {
    let mut bars = rising_bars(40, 37);
    let step = 0.9_f64.powf(1.0 / 3.0);
    let mut prev = bars[39].close;
    for i in 40..43 {
        let close = prev * step;
        bars.push(weak_bar(i, prev, close, 2000.0));
        prev = close;
    }
    Series::new("SCNB", bars).unwrap()
}

/// Series whose opens are exactly `opens`, one bar per day.
pub fn series_from_opens(symbol: &str, opens: &[f64]) -> Series {
    let bars = opens
        .iter()
        .enumerate()
        .map(|(i, &open)| Bar {
            date: day(i),
            open,
            high: open + 2.0,
            low: open - 2.0,
            close: open + 1.0,
            volume: 1000.0,
        })
        .collect();
    Series::new(symbol, bars).unwrap()
}

pub fn signals_from_kinds(kinds: &[SignalKind]) -> Vec<Signal> {
    kinds
        .iter()
        .enumerate()
        .map(|(i, &kind)| Signal {
            bar_index: i,
            kind,
            reason: Reason::InsufficientHistory,
        })
        .collect()
}

/// Deterministic pseudo-random walk, no external RNG.
pub fn noisy_bars(count: usize, seed: u64) -> Vec<Bar> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 11) as f64) / ((1u64 << 53) as f64)
    };

    let mut bars = Vec::with_capacity(count);
    let mut close = 50.0;
    for i in 0..count {
        let open = close;
        close = (close * (1.0 + (next() - 0.5) * 0.06)).max(1.0);
        let high = open.max(close) * (1.0 + next() * 0.01);
        let low = open.min(close) * (1.0 - next() * 0.01);
        let volume = 500.0 + next() * 2000.0;
        bars.push(Bar {
            date: day(i),
            open,
            high,
            low,
            close,
            volume,
        });
    }
    bars
}
