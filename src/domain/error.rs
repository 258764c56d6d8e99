//! Domain error types.

use crate::domain::universe::UniverseError;
use std::fmt;

/// Invalid engine configuration, detected before any bar is processed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid config value [{section}] {key}: {reason}")]
pub struct ConfigError {
    pub section: String,
    pub key: String,
    pub reason: String,
}

impl ConfigError {
    pub fn new(section: &str, key: &str, reason: impl Into<String>) -> Self {
        Self {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// What was wrong with the bar (or signal) at the reported index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapKind {
    EmptySeries,
    NonIncreasingTimestamp,
    DuplicateTimestamp,
    NonFinitePrice,
    NonPositivePrice,
    NonFiniteVolume,
    NonPositiveVolume,
    SignalMisaligned,
}

impl fmt::Display for GapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            GapKind::EmptySeries => "series has no bars",
            GapKind::NonIncreasingTimestamp => "timestamp is earlier than the previous bar",
            GapKind::DuplicateTimestamp => "timestamp duplicates the previous bar",
            GapKind::NonFinitePrice => "price field is not finite",
            GapKind::NonPositivePrice => "price field is not positive",
            GapKind::NonFiniteVolume => "volume is not finite",
            GapKind::NonPositiveVolume => "volume is not positive",
            GapKind::SignalMisaligned => "signal stream does not line up with the bars",
        };
        f.write_str(text)
    }
}

/// Missing, duplicated, out-of-order or corrupt bar data. Fatal for the
/// symbol it was raised on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("bad bar data at index {index}: {kind}")]
pub struct DataGapError {
    pub index: usize,
    pub kind: GapKind,
}

impl DataGapError {
    pub fn new(index: usize, kind: GapKind) -> Self {
        Self { index, kind }
    }
}

/// Top-level error type for sigtrader.
#[derive(Debug, thiserror::Error)]
pub enum SigtraderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("{symbol}: {source}")]
    DataGap {
        symbol: String,
        #[source]
        source: DataGapError,
    },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error("run for {symbol} was cancelled")]
    Cancelled { symbol: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SigtraderError {
    pub fn data_gap(symbol: &str, source: DataGapError) -> Self {
        SigtraderError::DataGap {
            symbol: symbol.to_string(),
            source,
        }
    }
}

impl From<&SigtraderError> for std::process::ExitCode {
    fn from(err: &SigtraderError) -> Self {
        let code: u8 = match err {
            SigtraderError::Io(_) => 1,
            SigtraderError::Config(_)
            | SigtraderError::ConfigParse { .. }
            | SigtraderError::Universe(_) => 2,
            SigtraderError::DataGap { .. } | SigtraderError::NoData { .. } => 5,
            SigtraderError::Cancelled { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
