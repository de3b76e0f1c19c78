//! Backtest result bundle.

use crate::stats::PerfStats;
use veleta_core::{Frame, Result, Series};

/// Container holding the artefacts produced by a backtest run.
///
/// Constructed once per engine invocation and never mutated afterwards;
/// ownership transfers fully to the caller. All members share one canonical
/// time index.
#[derive(Debug, Clone)]
pub struct BacktestResult {
    /// Compounded portfolio value over time, scaled by initial capital.
    pub equity_curve: Series,
    /// Realized positions after capacity limiting and alignment.
    pub positions: Frame,
    /// Realized weights the portfolio traded on.
    pub weights: Frame,
    /// Sum of absolute weight changes per period.
    pub turnover: Series,
    /// Summary statistics; `None` when the run produced no returns.
    pub stats: Option<PerfStats>,
}

impl BacktestResult {
    /// Returns a consolidated two-column frame pairing equity and turnover
    /// on the shared index.
    ///
    /// # Errors
    ///
    /// Propagates frame construction errors; these cannot occur for series
    /// produced by the engine.
    pub fn summary_frame(&self) -> Result<Frame> {
        let rows = self
            .equity_curve
            .values()
            .iter()
            .zip(self.turnover.values())
            .map(|(&equity, &turnover)| vec![equity, turnover])
            .collect();
        Frame::from_rows(
            self.equity_curve.index().to_vec(),
            vec!["equity".to_string(), "turnover".to_string()],
            rows,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use veleta_core::Timestamp;

    fn ts(day: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_summary_frame() {
        let index = vec![ts(1), ts(2)];
        let result = BacktestResult {
            equity_curve: Series::new(index.clone(), vec![1.0, 1.1]).unwrap(),
            positions: Frame::empty(vec!["a".to_string()]),
            weights: Frame::empty(vec!["a".to_string()]),
            turnover: Series::new(index, vec![0.0, 0.5]).unwrap(),
            stats: None,
        };

        let summary = result.summary_frame().unwrap();
        assert_eq!(summary.columns(), ["equity", "turnover"]);
        assert_relative_eq!(summary.get(1, 0), 1.1);
        assert_relative_eq!(summary.get(1, 1), 0.5);
    }

    #[test]
    fn test_summary_frame_empty_run() {
        let result = BacktestResult {
            equity_curve: Series::empty(),
            positions: Frame::empty(vec![]),
            weights: Frame::empty(vec![]),
            turnover: Series::empty(),
            stats: None,
        };
        assert!(result.summary_frame().unwrap().is_empty());
    }
}
