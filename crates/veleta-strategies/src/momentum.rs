//! Cross-sectional momentum strategy.
//!
//! Ranks assets against each other by trailing return and goes long the top
//! of the ranking, short the bottom. The signal can be delayed by a number
//! of periods to model decision lag; a delay of zero means positions react
//! to momentum observed on the same bar, which still only earns returns
//! from the following bar onward because the engine lags exposure.

use chrono::Duration;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use veleta_core::{Frame, Result, Series, Timestamp, VeletaError};
use veleta_engine::{BacktestEngine, BacktestResult, EngineConfig};

/// Cadence the price series is aligned to before momentum is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebalanceFrequency {
    /// Re-label onto a one-day grid; dates absent from the input become
    /// missing rows.
    #[default]
    Daily,
    /// Use the input index as-is.
    Native,
}

/// Configuration for the cross-sectional momentum strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumConfig {
    /// Trailing return window in periods.
    pub lookback: usize,
    /// Number of top-ranked assets to hold long.
    pub top_n: usize,
    /// Number of bottom-ranked assets to hold short.
    pub bottom_n: usize,
    /// Periods between observing a signal and acting on it.
    pub signal_delay: usize,
    /// Price alignment cadence.
    pub rebalance_frequency: RebalanceFrequency,
    /// Cost per unit turnover passed to the engine.
    pub transaction_cost: f64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            lookback: 60,
            top_n: 5,
            bottom_n: 0,
            signal_delay: 1,
            rebalance_frequency: RebalanceFrequency::Daily,
            transaction_cost: 0.0,
        }
    }
}

impl MomentumConfig {
    /// Checks the configuration for invalid values.
    ///
    /// # Errors
    ///
    /// Returns [`VeletaError::InvalidConfig`] when the lookback is zero or
    /// the transaction cost is negative or non-finite.
    pub fn validate(&self) -> Result<()> {
        if self.lookback == 0 {
            return Err(VeletaError::InvalidConfig(
                "lookback must be greater than zero".to_string(),
            ));
        }
        if !self.transaction_cost.is_finite() || self.transaction_cost < 0.0 {
            return Err(VeletaError::InvalidConfig(
                "transaction_cost must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

/// Cross-sectional momentum signal generator.
///
/// # Example
///
/// ```rust,ignore
/// use veleta_strategies::{MomentumConfig, MomentumStrategy};
///
/// let strategy = MomentumStrategy::new(MomentumConfig {
///     lookback: 20,
///     top_n: 3,
///     bottom_n: 3,
///     ..Default::default()
/// })?;
/// let positions = strategy.generate_positions(&prices)?;
/// let result = strategy.backtest(&prices, 1.0)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct MomentumStrategy {
    config: MomentumConfig,
}

impl MomentumStrategy {
    /// Creates a strategy, validating the configuration up front.
    ///
    /// # Errors
    ///
    /// Returns [`VeletaError::InvalidConfig`] for invalid configuration
    /// values, before any data is touched.
    pub fn new(config: MomentumConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The strategy configuration.
    #[must_use]
    pub const fn config(&self) -> &MomentumConfig {
        &self.config
    }

    fn align_prices(&self, prices: &Frame) -> Frame {
        match self.config.rebalance_frequency {
            RebalanceFrequency::Native => prices.clone(),
            RebalanceFrequency::Daily => {
                if prices.is_empty() {
                    return prices.clone();
                }
                let first = prices.index()[0];
                let last = prices.index()[prices.n_rows() - 1];
                let mut grid: Vec<Timestamp> = Vec::new();
                let mut current = first;
                while current <= last {
                    grid.push(current);
                    current += Duration::days(1);
                }
                prices.reindex(&grid)
            }
        }
    }

    /// Trailing percentage change over the lookback window, shifted forward
    /// by the signal delay.
    ///
    /// Prices pad through gaps before differencing, so a bar after a missing
    /// observation measures momentum against the last observed price.
    #[must_use]
    pub fn compute_momentum(&self, prices: &Frame) -> Frame {
        let aligned = self.align_prices(prices);
        let momentum = aligned.ffill().pct_change(self.config.lookback);
        if self.config.signal_delay > 0 {
            momentum.shift(self.config.signal_delay)
        } else {
            momentum
        }
    }

    /// Generates a {-1, 0, +1} position matrix from price history.
    ///
    /// Assets are ranked per row by descending momentum, ties broken by
    /// column order so ranks are strict. The `top_n` ranked assets go long,
    /// assets ranked at or below `n_cols - bottom_n + 1` go short, and rows
    /// without a defined momentum stay flat. Rows where no asset has enough
    /// history yet are dropped.
    ///
    /// # Errors
    ///
    /// Propagates frame construction errors; these cannot occur for a
    /// momentum matrix derived from a validly constructed price frame.
    pub fn generate_positions(&self, prices: &Frame) -> Result<Frame> {
        let momentum = self.compute_momentum(prices).drop_all_nan_rows();
        if momentum.is_empty() {
            return Ok(momentum);
        }

        let (n_rows, n_cols) = (momentum.n_rows(), momentum.n_cols());
        let mut values = Array2::zeros((n_rows, n_cols));

        for row in 0..n_rows {
            let mut ranked: Vec<(usize, f64)> = (0..n_cols)
                .filter_map(|col| {
                    let score = momentum.get(row, col);
                    score.is_finite().then_some((col, score))
                })
                .collect();
            // Stable sort keeps earlier columns ahead on ties.
            ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

            for (position, &(col, _)) in ranked.iter().enumerate() {
                let rank = position + 1;
                if self.config.top_n > 0 && rank <= self.config.top_n {
                    values[[row, col]] = 1.0;
                }
                // Short threshold counts undefined columns toward the
                // universe size, so the bottom book shrinks on sparse rows.
                if self.config.bottom_n > 0 && rank + self.config.bottom_n > n_cols {
                    values[[row, col]] = -1.0;
                }
            }
        }

        Frame::new(momentum.index().to_vec(), momentum.columns().to_vec(), values)
    }

    /// Runs the full pipeline: generate positions, rebalance into weights,
    /// and simulate through the backtesting engine.
    ///
    /// An input without enough history for a single momentum observation
    /// yields an empty result rather than an error.
    ///
    /// # Errors
    ///
    /// Propagates engine errors; the strategy configuration itself was
    /// validated at construction.
    pub fn backtest(&self, prices: &Frame, initial_capital: f64) -> Result<BacktestResult> {
        let positions = self.generate_positions(prices)?;
        if positions.is_empty() {
            return Ok(BacktestResult {
                equity_curve: Series::empty(),
                positions: positions.clone(),
                weights: positions,
                turnover: Series::empty(),
                stats: None,
            });
        }

        let engine = BacktestEngine::new(EngineConfig {
            initial_capital,
            transaction_cost: self.config.transaction_cost,
            ..Default::default()
        })?;
        engine.run(prices, None, Some(&positions), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn ts(day_offset: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(i64::from(day_offset))
    }

    fn trending_prices(n_rows: usize) -> Frame {
        // X rises every day, Y stays flat, Z falls every day.
        let rows = (0..n_rows)
            .map(|t| {
                vec![
                    100.0 + t as f64,
                    100.0,
                    100.0 - 0.5 * t as f64,
                ]
            })
            .collect();
        Frame::from_rows(
            (0..n_rows as u32).map(ts).collect(),
            vec!["X".to_string(), "Y".to_string(), "Z".to_string()],
            rows,
        )
        .unwrap()
    }

    fn strategy(config: MomentumConfig) -> MomentumStrategy {
        MomentumStrategy::new(config).unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert!(MomentumConfig::default().validate().is_ok());

        let config = MomentumConfig {
            lookback: 0,
            ..Default::default()
        };
        assert!(matches!(
            MomentumStrategy::new(config),
            Err(VeletaError::InvalidConfig(_))
        ));

        let config = MomentumConfig {
            transaction_cost: -0.1,
            ..Default::default()
        };
        assert!(MomentumStrategy::new(config).is_err());
    }

    #[test]
    fn test_long_top_short_bottom() {
        let strategy = strategy(MomentumConfig {
            lookback: 10,
            top_n: 1,
            bottom_n: 1,
            signal_delay: 0,
            ..Default::default()
        });
        let positions = strategy.generate_positions(&trending_prices(50)).unwrap();

        // The first ten rows have no momentum and are dropped.
        assert_eq!(positions.n_rows(), 40);
        for row in 0..positions.n_rows() {
            assert_relative_eq!(positions.get(row, 0), 1.0);
            assert_relative_eq!(positions.get(row, 1), 0.0);
            assert_relative_eq!(positions.get(row, 2), -1.0);
        }
    }

    #[test]
    fn test_signal_delay_shifts_first_active_row() {
        let without_delay = strategy(MomentumConfig {
            lookback: 10,
            top_n: 1,
            bottom_n: 0,
            signal_delay: 0,
            ..Default::default()
        });
        let with_delay = strategy(MomentumConfig {
            lookback: 10,
            top_n: 1,
            bottom_n: 0,
            signal_delay: 3,
            ..Default::default()
        });

        let prices = trending_prices(30);
        let immediate = without_delay.generate_positions(&prices).unwrap();
        let delayed = with_delay.generate_positions(&prices).unwrap();

        assert_eq!(immediate.index()[0], ts(10));
        assert_eq!(delayed.index()[0], ts(13));
    }

    #[test]
    fn test_ties_break_by_column_order() {
        // Two identical assets: the earlier column takes the single long slot.
        let rows = (0..20).map(|t| vec![100.0 + t as f64; 2]).collect();
        let prices = Frame::from_rows(
            (0..20).map(ts).collect(),
            vec!["first".to_string(), "second".to_string()],
            rows,
        )
        .unwrap();

        let strategy = strategy(MomentumConfig {
            lookback: 5,
            top_n: 1,
            bottom_n: 0,
            signal_delay: 0,
            ..Default::default()
        });
        let positions = strategy.generate_positions(&prices).unwrap();
        for row in 0..positions.n_rows() {
            assert_relative_eq!(positions.get(row, 0), 1.0);
            assert_relative_eq!(positions.get(row, 1), 0.0);
        }
    }

    #[test]
    fn test_undefined_momentum_stays_flat() {
        // One asset starts ten days late; while its momentum is undefined
        // it is never selected, and the short threshold does not reach the
        // bottom of the defined ranking either.
        let rows: Vec<Vec<f64>> = (0..30)
            .map(|t| {
                let late = if t < 10 { f64::NAN } else { 200.0 - t as f64 };
                vec![100.0 + t as f64, 100.0, late]
            })
            .collect();
        let prices = Frame::from_rows(
            (0..30).map(ts).collect(),
            vec!["up".to_string(), "flat".to_string(), "late".to_string()],
            rows,
        )
        .unwrap();

        let strategy = strategy(MomentumConfig {
            lookback: 5,
            top_n: 1,
            bottom_n: 1,
            signal_delay: 0,
            ..Default::default()
        });
        let positions = strategy.generate_positions(&prices).unwrap();

        let late_col = positions.column_position("late").unwrap();
        let first_row_ts = positions.index()[0];
        assert_eq!(first_row_ts, ts(5));
        // Rows 5..14 rank only two of three assets: no rank reaches the
        // short threshold, so nothing is shorted.
        for row in 0..positions.n_rows() {
            let row_ts = positions.index()[row];
            if row_ts < ts(15) {
                assert_relative_eq!(positions.get(row, late_col), 0.0);
                for col in 0..positions.n_cols() {
                    assert!(positions.get(row, col) >= 0.0);
                }
            } else {
                assert_relative_eq!(positions.get(row, late_col), -1.0);
            }
        }
    }

    #[test]
    fn test_native_frequency_keeps_index() {
        // Irregular two-day spacing survives under native alignment.
        let index: Vec<Timestamp> = (0..10).map(|t| ts(2 * t)).collect();
        let rows = (0..10).map(|t| vec![100.0 + t as f64]).collect();
        let prices =
            Frame::from_rows(index.clone(), vec!["a".to_string()], rows).unwrap();

        let strategy = strategy(MomentumConfig {
            lookback: 3,
            top_n: 1,
            bottom_n: 0,
            signal_delay: 0,
            rebalance_frequency: RebalanceFrequency::Native,
            ..Default::default()
        });
        let positions = strategy.generate_positions(&prices).unwrap();
        assert_eq!(positions.index(), &index[3..]);
    }

    #[test]
    fn test_daily_alignment_spans_gaps() {
        // A gap in the calendar becomes missing rows on the daily grid; the
        // last observed price pads through them, so the bar after the gap
        // measures the full move against day 2's print.
        let index = vec![ts(0), ts(1), ts(2), ts(5), ts(6)];
        let rows = vec![
            vec![100.0],
            vec![101.0],
            vec![102.0],
            vec![105.0],
            vec![106.0],
        ];
        let prices = Frame::from_rows(index, vec!["a".to_string()], rows).unwrap();

        let strategy = strategy(MomentumConfig {
            lookback: 1,
            top_n: 1,
            bottom_n: 0,
            signal_delay: 0,
            ..Default::default()
        });
        let momentum = strategy.compute_momentum(&prices);
        assert_eq!(momentum.n_rows(), 7);
        let at = |day: u32| {
            let row = momentum.index().iter().position(|&t| t == ts(day)).unwrap();
            momentum.get(row, 0)
        };
        assert!(at(0).is_nan());
        assert_relative_eq!(at(3), 0.0, epsilon = 1e-12);
        assert_relative_eq!(at(4), 0.0, epsilon = 1e-12);
        assert_relative_eq!(at(5), 105.0 / 102.0 - 1.0, epsilon = 1e-12);
        assert_relative_eq!(at(6), 106.0 / 105.0 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_backtest_pipeline() {
        let strategy = strategy(MomentumConfig {
            lookback: 10,
            top_n: 1,
            bottom_n: 1,
            signal_delay: 0,
            ..Default::default()
        });
        let result = strategy.backtest(&trending_prices(50), 1.0).unwrap();

        // Long the riser, short the faller: equity ends above start.
        assert!(result.equity_curve.last().unwrap() > 1.0);
        let stats = result.stats.unwrap();
        assert!(stats.cumulative_return > 0.0);
        assert!(stats.sharpe > 0.0);
    }

    #[test]
    fn test_backtest_without_history_is_empty() {
        let strategy = strategy(MomentumConfig {
            lookback: 100,
            ..Default::default()
        });
        let result = strategy.backtest(&trending_prices(20), 1.0).unwrap();
        assert!(result.equity_curve.is_empty());
        assert!(result.stats.is_none());
    }
}
