//! sigtrader: trend-velocity signal engine and long-only backtester.
//!
//! Hexagonal layout: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod logging;
