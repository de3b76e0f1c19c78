//! Time-indexed scalar series.

use crate::error::{Result, VeletaError};
use crate::frame::Timestamp;
use serde::{Deserialize, Serialize};

/// A time-indexed scalar series, used for equity curves, turnover, and
/// portfolio return traces.
///
/// The index follows the same contract as [`crate::Frame`]: tz-naive
/// timestamps, sorted ascending, unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    index: Vec<Timestamp>,
    values: Vec<f64>,
}

impl Series {
    /// Creates a series from an index and values of equal length.
    ///
    /// Entries are sorted by timestamp ascending.
    ///
    /// # Errors
    ///
    /// Returns [`VeletaError::ShapeMismatch`] when the lengths disagree and
    /// [`VeletaError::DuplicateTimestamp`] when the index repeats an entry.
    pub fn new(index: Vec<Timestamp>, values: Vec<f64>) -> Result<Self> {
        if index.len() != values.len() {
            return Err(VeletaError::ShapeMismatch(format!(
                "{} timestamps for {} values",
                index.len(),
                values.len()
            )));
        }

        let (index, values) = if index.is_sorted() {
            (index, values)
        } else {
            let mut order: Vec<usize> = (0..index.len()).collect();
            order.sort_by_key(|&pos| index[pos]);
            (
                order.iter().map(|&pos| index[pos]).collect(),
                order.iter().map(|&pos| values[pos]).collect(),
            )
        };

        for pair in index.windows(2) {
            if pair[0] == pair[1] {
                return Err(VeletaError::DuplicateTimestamp(pair[0].to_string()));
            }
        }

        Ok(Self { index, values })
    }

    /// Creates an empty series.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            index: Vec::new(),
            values: Vec::new(),
        }
    }

    /// The time index.
    #[must_use]
    pub fn index(&self) -> &[Timestamp] {
        &self.index
    }

    /// The values, aligned with the index.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether the series has no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(timestamp, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Timestamp, f64)> + '_ {
        self.index.iter().copied().zip(self.values.iter().copied())
    }

    /// The final value, if any.
    #[must_use]
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }
}
