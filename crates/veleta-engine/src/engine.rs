//! The return and cost engine.
//!
//! Converts position or weight data into equity curves and statistics.
//! Exposure is lagged by one period: the portfolio return at time `t` uses
//! the weight decided at `t - 1`, never `t`, so nothing ever trades on
//! same-bar information.

use crate::config::EngineConfig;
use crate::convert::{apply_position_cap, signals_to_positions};
use crate::result::BacktestResult;
use crate::stats::compute_performance_stats;
use crate::weights::rebalance_weights;
use veleta_core::{Frame, Result, Series, VeletaError};

/// The backtesting engine.
///
/// A single invocation processes whole matrices in one pass and returns a
/// fully materialized [`BacktestResult`]. The engine owns no shared mutable
/// state, so independent runs are freely parallelizable across threads.
///
/// # Example
///
/// ```no_run
/// use veleta_engine::{BacktestEngine, EngineConfig};
/// # fn prices() -> veleta_core::Frame { unimplemented!() }
/// # fn positions() -> veleta_core::Frame { unimplemented!() }
///
/// let engine = BacktestEngine::new(EngineConfig::default())?;
/// let result = engine.run(&prices(), None, Some(&positions()), None)?;
/// # Ok::<(), veleta_core::VeletaError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct BacktestEngine {
    config: EngineConfig,
}

impl BacktestEngine {
    /// Creates an engine, validating the configuration up front.
    ///
    /// # Errors
    ///
    /// Returns [`VeletaError::InvalidConfig`] for invalid configuration
    /// values, before any data is touched.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs a backtest over `prices` with exactly one of `weights`,
    /// `positions`, or `signals`.
    ///
    /// Explicit weights take precedence and are used as-is (only aligned to
    /// the return index); otherwise positions (or signals converted to
    /// positions) pass through the capacity limiter and the equal-weight
    /// rebalancer. An empty price matrix yields an empty result rather than
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`VeletaError::InvalidInput`] when no input matrix is
    /// supplied or when an input's columns disagree with the price matrix.
    pub fn run(
        &self,
        prices: &Frame,
        weights: Option<&Frame>,
        positions: Option<&Frame>,
        signals: Option<&Frame>,
    ) -> Result<BacktestResult> {
        if prices.is_empty() {
            return Ok(BacktestResult {
                equity_curve: Series::empty(),
                positions: Frame::empty(prices.columns().to_vec()),
                weights: Frame::empty(prices.columns().to_vec()),
                turnover: Series::empty(),
                stats: None,
            });
        }

        // Prices pad through gaps: a bar where an asset reappears earns the
        // full return against the last observed price.
        let returns = prices.ffill().pct_change(1).fill_nan(0.0);

        let mut resolved_positions: Option<Frame> = None;
        let weight_frame = if let Some(given) = weights {
            check_columns(prices, given, "weights")?;
            given.clone()
        } else {
            let raw = if let Some(given) = positions {
                check_columns(prices, given, "positions")?;
                given.clone()
            } else if let Some(given) = signals {
                check_columns(prices, given, "signals")?;
                signals_to_positions(given)?
            } else {
                return Err(VeletaError::InvalidInput(
                    "must provide either weights or positions/signals for backtesting"
                        .to_string(),
                ));
            };

            let mut resolved = raw.fill_nan(0.0);
            if let Some(limit) = self.config.max_active_positions {
                resolved = apply_position_cap(&resolved, limit)?;
            }
            let rebalanced = rebalance_weights(&resolved)?;
            resolved_positions = Some(resolved);
            rebalanced
        };

        // Align decided weights onto the return index: carry the last
        // decision forward through gaps, start flat before the first one.
        let aligned_weights = weight_frame.reindex(returns.index()).ffill().fill_nan(0.0);
        let realized_positions = match resolved_positions {
            Some(resolved) => resolved.reindex(returns.index()).ffill().fill_nan(0.0),
            None => aligned_weights.signum(),
        };

        let lagged = aligned_weights.shift(1).fill_nan(0.0);
        let (n_rows, n_cols) = (returns.n_rows(), returns.n_cols());

        let mut portfolio_returns: Vec<f64> = Vec::with_capacity(n_rows);
        for row in 0..n_rows {
            let mut period_return = 0.0;
            for col in 0..n_cols {
                period_return += lagged.get(row, col) * returns.get(row, col);
            }
            portfolio_returns.push(period_return);
        }

        let mut turnover = vec![0.0; n_rows];
        for row in 1..n_rows {
            turnover[row] = (0..n_cols)
                .map(|col| {
                    (aligned_weights.get(row, col) - aligned_weights.get(row - 1, col)).abs()
                })
                .sum();
        }

        if self.config.transaction_cost > 0.0 {
            for (period_return, period_turnover) in portfolio_returns.iter_mut().zip(&turnover) {
                *period_return -= period_turnover * self.config.transaction_cost;
            }
        }

        let mut equity = Vec::with_capacity(n_rows);
        let mut capital = self.config.initial_capital;
        for period_return in &portfolio_returns {
            capital *= 1.0 + period_return;
            equity.push(capital);
        }

        let stats =
            compute_performance_stats(&portfolio_returns, self.config.annualization_factor);

        Ok(BacktestResult {
            equity_curve: Series::new(returns.index().to_vec(), equity)?,
            positions: realized_positions,
            weights: aligned_weights,
            turnover: Series::new(returns.index().to_vec(), turnover)?,
            stats,
        })
    }
}

/// Runs a backtest with a one-off configuration.
///
/// Convenience wrapper over [`BacktestEngine::new`] + [`BacktestEngine::run`].
///
/// # Errors
///
/// Returns the same errors as the engine methods.
pub fn run_backtest(
    prices: &Frame,
    weights: Option<&Frame>,
    positions: Option<&Frame>,
    signals: Option<&Frame>,
    config: EngineConfig,
) -> Result<BacktestResult> {
    BacktestEngine::new(config)?.run(prices, weights, positions, signals)
}

fn check_columns(prices: &Frame, other: &Frame, name: &str) -> Result<()> {
    if prices.columns() != other.columns() {
        return Err(VeletaError::InvalidInput(format!(
            "{name} columns must match the price matrix columns"
        )));
    }
    Ok(())
}
