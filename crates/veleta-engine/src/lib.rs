#![forbid(unsafe_code)]

//! Signal-to-position backtesting engine for veleta.
//!
//! This crate turns trading intent into a simulated performance trace:
//! - signal matrices convert into position matrices, optionally limited by
//!   a sticky per-side capacity cap;
//! - positions rebalance into equal-weighted long/short books;
//! - weights combine with lagged asset returns into a cost-adjusted equity
//!   curve, turnover trace, and summary statistics.
//!
//! # Example
//!
//! ```rust,ignore
//! use veleta_engine::{BacktestEngine, EngineConfig};
//!
//! let engine = BacktestEngine::new(EngineConfig::default())?;
//! let result = engine.run(&prices, None, None, Some(&signals))?;
//! println!("sharpe: {:?}", result.stats.map(|s| s.sharpe));
//! ```

pub mod config;
pub mod convert;
pub mod engine;
pub mod result;
pub mod stats;
pub mod weights;

// Re-export main types
pub use config::EngineConfig;
pub use convert::{apply_position_cap, signals_to_positions, to_positions};
pub use engine::{BacktestEngine, run_backtest};
pub use result::BacktestResult;
pub use stats::{PerfStats, compute_performance_stats, max_drawdown};
pub use weights::rebalance_weights;
