//! Core domain types and logic.

pub mod ohlcv;
pub mod series;
pub mod indicator;
pub mod signal;
pub mod position;
pub mod backtest;
pub mod metrics;
pub mod config;
pub mod config_validation;
pub mod pipeline;
pub mod universe;
pub mod error;
