//! Symbol universe for batch runs.
//!
//! Parses the `[universe] symbols` list and checks that every symbol has
//! enough bars to get past the indicator warm-up.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::domain::error::SigtraderError;
use crate::domain::indicator::IndicatorConfig;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

pub const UNIVERSE_SECTION: &str = "universe";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("no symbols configured")]
    NoSymbols,

    #[error("no symbol has enough data")]
    AllSymbolsFailed,
}

/// Split a comma-separated list into upper-cased symbols, preserving order.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

/// Read `[universe] symbols`. A missing key is `NoSymbols`.
pub fn symbols_from_port(port: &dyn ConfigPort) -> Result<Vec<String>, UniverseError> {
    match port.get_string(UNIVERSE_SECTION, "symbols") {
        Some(raw) => parse_symbols(&raw),
        None => Err(UniverseError::NoSymbols),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    FetchFailed(String),
    NoData,
    /// Fewer bars than it takes to produce the first signal.
    InsufficientBars { bars: usize, minimum: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniverseCheck {
    pub accepted: Vec<String>,
    pub skipped: Vec<SkippedSymbol>,
}

/// Probe each symbol through `data_port` and keep the ones with at least
/// `first_valid_index + 1` bars. Fails only when nothing is left.
pub fn check_universe(
    data_port: &dyn DataPort,
    symbols: &[String],
    indicators: &IndicatorConfig,
) -> Result<UniverseCheck, SigtraderError> {
    let minimum = indicators.first_valid_index() + 1;
    let mut accepted = Vec::new();
    let mut skipped = Vec::new();

    for symbol in symbols {
        let reason = match data_port.fetch_bars(symbol) {
            Err(e) => Some(SkipReason::FetchFailed(e.to_string())),
            Ok(bars) if bars.is_empty() => Some(SkipReason::NoData),
            Ok(bars) if bars.len() < minimum => Some(SkipReason::InsufficientBars {
                bars: bars.len(),
                minimum,
            }),
            Ok(_) => None,
        };

        match reason {
            Some(reason) => {
                warn!(%symbol, ?reason, "skipping symbol");
                skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason,
                });
            }
            None => accepted.push(symbol.clone()),
        }
    }

    if accepted.is_empty() {
        return Err(UniverseError::AllSymbolsFailed.into());
    }

    if !skipped.is_empty() {
        info!(
            accepted = accepted.len(),
            total = symbols.len(),
            "universe reduced"
        );
    }

    Ok(UniverseCheck { accepted, skipped })
}
