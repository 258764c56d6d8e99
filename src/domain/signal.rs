//! Signal classification.
//!
//! `classify` is a pure function of one bar's snapshot and the thresholds.
//! It never looks at other bars or at earlier signals, so a signal stream can
//! be recomputed from any point and always comes out the same.

use crate::domain::indicator::{IndicatorSeries, IndicatorSnapshot};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Thresholds {
    pub extension_lower_bound: f64,
    pub extension_upper_bound: f64,
    /// Minimum volume / rolling-mean-volume, at least 1.
    pub volume_threshold: f64,
    /// Minimum close location within the bar's range, in [0, 1].
    pub conviction_threshold: f64,
    /// Noise floor on the velocity spread, at least 0.
    pub velocity_epsilon: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            extension_lower_bound: -0.05,
            extension_upper_bound: 0.15,
            volume_threshold: 1.5,
            conviction_threshold: 0.6,
            velocity_epsilon: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SignalKind {
    Buy,
    Sell,
    Wait,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Buy => write!(f, "BUY"),
            SignalKind::Sell => write!(f, "SELL"),
            SignalKind::Wait => write!(f, "WAIT"),
        }
    }
}

/// Every condition the rule looked at, so a caller can tell exactly which
/// one held a BUY back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalFlags {
    pub trend_accelerating: bool,
    pub not_overextended: bool,
    pub volume_confirmed: bool,
    pub trend_reversing: bool,
    pub weak_conviction: bool,
}

impl SignalFlags {
    pub fn evaluate(snapshot: &IndicatorSnapshot, thresholds: &Thresholds) -> Self {
        let spread = snapshot.velocity_spread();
        SignalFlags {
            trend_accelerating: spread > thresholds.velocity_epsilon,
            not_overextended: thresholds.extension_lower_bound <= snapshot.extension_ratio
                && snapshot.extension_ratio <= thresholds.extension_upper_bound,
            volume_confirmed: snapshot.volume_ratio >= thresholds.volume_threshold
                && snapshot.conviction_score >= thresholds.conviction_threshold,
            trend_reversing: spread < -thresholds.velocity_epsilon,
            weak_conviction: snapshot.conviction_score < 1.0 - thresholds.conviction_threshold,
        }
    }

    pub fn is_buy(&self) -> bool {
        self.trend_accelerating && self.not_overextended && self.volume_confirmed
    }

    pub fn is_sell(&self) -> bool {
        self.trend_reversing && self.weak_conviction
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reason {
    InsufficientHistory,
    Evaluated(SignalFlags),
}

impl Reason {
    pub fn flags(&self) -> Option<&SignalFlags> {
        match self {
            Reason::InsufficientHistory => None,
            Reason::Evaluated(flags) => Some(flags),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Signal {
    pub bar_index: usize,
    pub kind: SignalKind,
    pub reason: Reason,
}

impl Signal {
    pub fn is_insufficient_history(&self) -> bool {
        self.reason == Reason::InsufficientHistory
    }
}

pub fn classify(
    bar_index: usize,
    snapshot: Option<&IndicatorSnapshot>,
    thresholds: &Thresholds,
) -> Signal {
    let Some(snapshot) = snapshot else {
        return Signal {
            bar_index,
            kind: SignalKind::Wait,
            reason: Reason::InsufficientHistory,
        };
    };

    let flags = SignalFlags::evaluate(snapshot, thresholds);
    // SELL first: if both ever hold, staying out beats getting in.
    let kind = if flags.is_sell() {
        SignalKind::Sell
    } else if flags.is_buy() {
        SignalKind::Buy
    } else {
        SignalKind::Wait
    };

    Signal {
        bar_index,
        kind,
        reason: Reason::Evaluated(flags),
    }
}

/// One signal per indicator point, in bar order.
pub fn classify_series(indicators: &IndicatorSeries, thresholds: &Thresholds) -> Vec<Signal> {
    indicators
        .points
        .iter()
        .enumerate()
        .map(|(i, point)| classify(i, point.snapshot.as_ref(), thresholds))
        .collect()
}
