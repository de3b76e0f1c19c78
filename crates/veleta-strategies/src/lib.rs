#![forbid(unsafe_code)]

//! Reference signal generators for the veleta backtesting engine.
//!
//! Currently provides a single strategy: cross-sectional momentum, which
//! ranks assets by trailing return and holds the extremes of the ranking.

pub mod momentum;

pub use momentum::{MomentumConfig, MomentumStrategy, RebalanceFrequency};
