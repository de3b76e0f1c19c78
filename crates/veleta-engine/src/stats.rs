//! Performance statistics.

use serde::{Deserialize, Serialize};

/// Summary performance statistics derived from a post-cost return series.
///
/// `sharpe` is NaN for a flat (zero-variance) return series; that is a
/// defined outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerfStats {
    /// Annualized return, `(1 + cumulative)^(factor / n) - 1`.
    pub ann_return: f64,
    /// Annualized volatility, population std times sqrt(factor).
    pub ann_vol: f64,
    /// Annualized Sharpe ratio; NaN when volatility is zero.
    pub sharpe: f64,
    /// Total compounded return over the whole series.
    pub cumulative_return: f64,
    /// Worst peak-to-trough equity decline, as a non-positive fraction.
    pub max_drawdown: f64,
}

/// Computes performance statistics for a return series.
///
/// Returns `None` for an empty series; every downstream consumer must treat
/// "no data" as a first-class outcome. Volatility uses the population
/// standard deviation (denominator N).
#[must_use]
pub fn compute_performance_stats(returns: &[f64], annualization_factor: u32) -> Option<PerfStats> {
    if returns.is_empty() {
        return None;
    }

    let n = returns.len() as f64;
    let factor = f64::from(annualization_factor);

    let mean = returns.iter().sum::<f64>() / n;
    let vol = (returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n).sqrt();

    let sharpe = if vol == 0.0 {
        f64::NAN
    } else {
        mean / vol * factor.sqrt()
    };

    let cumulative_return = returns.iter().map(|r| 1.0 + r).product::<f64>() - 1.0;
    let ann_return = (1.0 + cumulative_return).powf(factor / n) - 1.0;
    let ann_vol = vol * factor.sqrt();

    Some(PerfStats {
        ann_return,
        ann_vol,
        sharpe,
        cumulative_return,
        max_drawdown: max_drawdown(returns),
    })
}

/// Worst decline of compounded equity from its running peak.
///
/// Returns 0.0 for an empty series.
#[must_use]
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut equity = 1.0;
    let mut peak = f64::MIN;
    let mut worst = 0.0_f64;

    for r in returns {
        equity *= 1.0 + r;
        if equity > peak {
            peak = equity;
        }
        let drawdown = equity / peak - 1.0;
        if drawdown < worst {
            worst = drawdown;
        }
    }

    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_returns_no_stats() {
        assert!(compute_performance_stats(&[], 252).is_none());
    }

    #[test]
    fn test_zero_variance_series() {
        // Flat series: NaN sharpe, zero drawdown, zero cumulative return.
        let stats = compute_performance_stats(&[0.0, 0.0, 0.0], 252).unwrap();
        assert!(stats.sharpe.is_nan());
        assert_relative_eq!(stats.max_drawdown, 0.0);
        assert_relative_eq!(stats.cumulative_return, 0.0);
        assert_relative_eq!(stats.ann_return, 0.0);
        assert_relative_eq!(stats.ann_vol, 0.0);
    }

    #[test]
    fn test_cumulative_and_annualized_return() {
        let returns = vec![0.1, -0.05, 0.02];
        let stats = compute_performance_stats(&returns, 252).unwrap();

        let cumulative = 1.1 * 0.95 * 1.02 - 1.0;
        assert_relative_eq!(stats.cumulative_return, cumulative, epsilon = 1e-12);
        assert_relative_eq!(
            stats.ann_return,
            (1.0 + cumulative).powf(252.0 / 3.0) - 1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_population_std_denominator() {
        let returns = vec![0.01, -0.01];
        let stats = compute_performance_stats(&returns, 252).unwrap();
        // Population std of {0.01, -0.01} is 0.01 (denominator N, not N-1).
        assert_relative_eq!(stats.ann_vol, 0.01 * 252.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_sharpe_sign_follows_mean() {
        let stats = compute_performance_stats(&[0.01, 0.02, 0.015, 0.012], 252).unwrap();
        assert!(stats.sharpe > 0.0);

        let stats = compute_performance_stats(&[-0.01, -0.02, -0.015, -0.012], 252).unwrap();
        assert!(stats.sharpe < 0.0);
    }

    #[test]
    fn test_max_drawdown_single_dip() {
        // Equity: 1.1, 0.88, 0.968 -> trough 0.88 against peak 1.1.
        let dd = max_drawdown(&[0.1, -0.2, 0.1]);
        assert_relative_eq!(dd, 0.88 / 1.1 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_max_drawdown_monotonic_gains() {
        assert_relative_eq!(max_drawdown(&[0.01, 0.02, 0.03]), 0.0);
    }

    #[test]
    fn test_stats_serialize_metric_names() {
        let stats = compute_performance_stats(&[0.01, -0.02], 252).unwrap();
        let json = serde_json::to_value(&stats).unwrap();
        for key in [
            "ann_return",
            "ann_vol",
            "sharpe",
            "cumulative_return",
            "max_drawdown",
        ] {
            assert!(json.get(key).is_some(), "missing metric {key}");
        }
    }
}
