//! Time-indexed numeric matrices.
//!
//! [`Frame`] is the canonical representation of every matrix that enters or
//! leaves the backtesting pipeline: rows are timestamps (tz-naive, strictly
//! increasing, unique), columns are asset identifiers (unique, fixed order),
//! and the payload is an `ndarray` matrix of `f64` where `NaN` marks a
//! missing observation.
//!
//! Construction normalizes the input: rows are sorted by time ascending and
//! duplicate timestamps or columns are rejected. All transformation methods
//! return a new `Frame` and never mutate the receiver, so callers can treat
//! frames as immutable snapshots.

use crate::error::{Result, VeletaError};
use crate::series::Series;
use chrono::NaiveDateTime;
use ndarray::Array2;
use std::collections::{HashMap, HashSet};

/// A tz-naive timestamp, the row label of every [`Frame`] and [`Series`].
pub type Timestamp = NaiveDateTime;

/// A time-indexed numeric matrix with named columns.
///
/// # Example
///
/// ```
/// use veleta_core::Frame;
/// use chrono::NaiveDate;
///
/// let index: Vec<_> = (1..=3)
///     .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap())
///     .collect();
/// let frame = Frame::from_rows(
///     index,
///     vec!["AAA".to_string(), "BBB".to_string()],
///     vec![
///         vec![100.0, 50.0],
///         vec![101.0, 49.5],
///         vec![102.0, 49.0],
///     ],
/// ).unwrap();
///
/// assert_eq!(frame.n_rows(), 3);
/// assert_eq!(frame.columns(), ["AAA", "BBB"]);
/// ```
#[derive(Debug, Clone)]
pub struct Frame {
    index: Vec<Timestamp>,
    columns: Vec<String>,
    values: Array2<f64>,
}

impl Frame {
    /// Creates a frame from an index, column labels, and a value matrix.
    ///
    /// Rows are sorted by timestamp ascending. The matrix shape must be
    /// `(index.len(), columns.len())`.
    ///
    /// # Errors
    ///
    /// Returns [`VeletaError::ShapeMismatch`] when the matrix shape disagrees
    /// with the labels, [`VeletaError::DuplicateTimestamp`] when the index
    /// repeats a timestamp, and [`VeletaError::DuplicateColumn`] when two
    /// columns share a name.
    pub fn new(index: Vec<Timestamp>, columns: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if values.nrows() != index.len() || values.ncols() != columns.len() {
            return Err(VeletaError::ShapeMismatch(format!(
                "values are {}x{} but labels imply {}x{}",
                values.nrows(),
                values.ncols(),
                index.len(),
                columns.len()
            )));
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(VeletaError::DuplicateColumn(column.clone()));
            }
        }

        let (index, values) = if index.is_sorted() {
            (index, values)
        } else {
            let mut order: Vec<usize> = (0..index.len()).collect();
            order.sort_by_key(|&row| index[row]);
            let sorted_index: Vec<Timestamp> = order.iter().map(|&row| index[row]).collect();
            let sorted_values =
                Array2::from_shape_fn((index.len(), columns.len()), |(row, col)| {
                    values[[order[row], col]]
                });
            (sorted_index, sorted_values)
        };

        for pair in index.windows(2) {
            if pair[0] == pair[1] {
                return Err(VeletaError::DuplicateTimestamp(pair[0].to_string()));
            }
        }

        Ok(Self {
            index,
            columns,
            values,
        })
    }

    /// Creates a frame from row vectors. Every row must have one entry per
    /// column.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Frame::new`], plus a shape mismatch when
    /// a row length disagrees with the column count.
    pub fn from_rows(
        index: Vec<Timestamp>,
        columns: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if rows.len() != index.len() {
            return Err(VeletaError::ShapeMismatch(format!(
                "{} rows for {} timestamps",
                rows.len(),
                index.len()
            )));
        }
        for row in &rows {
            if row.len() != columns.len() {
                return Err(VeletaError::ShapeMismatch(format!(
                    "row has {} entries for {} columns",
                    row.len(),
                    columns.len()
                )));
            }
        }
        let values = Array2::from_shape_fn((index.len(), columns.len()), |(row, col)| {
            rows[row][col]
        });
        Self::new(index, columns, values)
    }

    /// Creates a frame from boolean rows, mapping `true` to 1.0 and `false`
    /// to 0.0. This is the entry point for boolean signal panels.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Frame::from_rows`].
    pub fn from_bool_rows(
        index: Vec<Timestamp>,
        columns: Vec<String>,
        rows: Vec<Vec<bool>>,
    ) -> Result<Self> {
        let numeric = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|flag| if flag { 1.0 } else { 0.0 })
                    .collect()
            })
            .collect();
        Self::from_rows(index, columns, numeric)
    }

    /// Converts a single-column series into a one-column frame.
    #[must_use]
    pub fn from_series(series: &Series, name: impl Into<String>) -> Self {
        let values = Array2::from_shape_fn((series.len(), 1), |(row, _)| series.values()[row]);
        Self {
            index: series.index().to_vec(),
            columns: vec![name.into()],
            values,
        }
    }

    /// Creates an empty frame (zero rows) with the given columns.
    #[must_use]
    pub fn empty(columns: Vec<String>) -> Self {
        let n_cols = columns.len();
        Self {
            index: Vec::new(),
            columns,
            values: Array2::from_elem((0, n_cols), f64::NAN),
        }
    }

    /// The time index, sorted ascending.
    #[must_use]
    pub fn index(&self) -> &[Timestamp] {
        &self.index
    }

    /// The column labels in their fixed order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The underlying value matrix.
    #[must_use]
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of rows (timestamps).
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    /// Number of columns (assets).
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Returns whether the frame has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The value at `(row, col)`.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[[row, col]]
    }

    /// The position of a column label, if present.
    #[must_use]
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Percentage change over `periods` rows: `value[t] / value[t-periods] - 1`.
    ///
    /// The first `periods` rows are NaN (no prior reference); NaN operands
    /// propagate.
    #[must_use]
    pub fn pct_change(&self, periods: usize) -> Self {
        let mut out = Array2::from_elem(self.values.dim(), f64::NAN);
        for row in periods..self.n_rows() {
            for col in 0..self.n_cols() {
                let prev = self.values[[row - periods, col]];
                let current = self.values[[row, col]];
                out[[row, col]] = current / prev - 1.0;
            }
        }
        self.with_values(out)
    }

    /// Shifts values forward in time by `periods` rows. Vacated leading rows
    /// become NaN.
    #[must_use]
    pub fn shift(&self, periods: usize) -> Self {
        let mut out = Array2::from_elem(self.values.dim(), f64::NAN);
        for row in periods..self.n_rows() {
            for col in 0..self.n_cols() {
                out[[row, col]] = self.values[[row - periods, col]];
            }
        }
        self.with_values(out)
    }

    /// Forward-fills NaN gaps within each column.
    #[must_use]
    pub fn ffill(&self) -> Self {
        let mut out = self.values.clone();
        for col in 0..self.n_cols() {
            let mut last = f64::NAN;
            for row in 0..self.n_rows() {
                if out[[row, col]].is_nan() {
                    out[[row, col]] = last;
                } else {
                    last = out[[row, col]];
                }
            }
        }
        self.with_values(out)
    }

    /// Replaces every NaN with `fill`.
    #[must_use]
    pub fn fill_nan(&self, fill: f64) -> Self {
        let out = self.values.mapv(|value| if value.is_nan() { fill } else { value });
        self.with_values(out)
    }

    /// Element-wise sign: +1 for positive, -1 for negative, 0 for zero,
    /// NaN for NaN.
    #[must_use]
    pub fn signum(&self) -> Self {
        let out = self.values.mapv(|value| {
            if value == 0.0 {
                0.0
            } else {
                value.signum()
            }
        });
        self.with_values(out)
    }

    /// Re-labels the rows onto `new_index`. Rows present in the frame are
    /// copied over; timestamps absent from the frame become NaN rows.
    ///
    /// `new_index` must itself be sorted ascending with unique entries,
    /// which holds for every index produced by this crate.
    #[must_use]
    pub fn reindex(&self, new_index: &[Timestamp]) -> Self {
        let lookup: HashMap<Timestamp, usize> = self
            .index
            .iter()
            .enumerate()
            .map(|(row, &ts)| (ts, row))
            .collect();
        let values = Array2::from_shape_fn((new_index.len(), self.n_cols()), |(row, col)| {
            lookup
                .get(&new_index[row])
                .map_or(f64::NAN, |&source| self.values[[source, col]])
        });
        Self {
            index: new_index.to_vec(),
            columns: self.columns.clone(),
            values,
        }
    }

    /// Drops rows in which every value is NaN.
    #[must_use]
    pub fn drop_all_nan_rows(&self) -> Self {
        let keep: Vec<usize> = (0..self.n_rows())
            .filter(|&row| (0..self.n_cols()).any(|col| !self.values[[row, col]].is_nan()))
            .collect();
        let index = keep.iter().map(|&row| self.index[row]).collect();
        let values = Array2::from_shape_fn((keep.len(), self.n_cols()), |(row, col)| {
            self.values[[keep[row], col]]
        });
        Self {
            index,
            columns: self.columns.clone(),
            values,
        }
    }

    fn with_values(&self, values: Array2<f64>) -> Self {
        Self {
            index: self.index.clone(),
            columns: self.columns.clone(),
            values,
        }
    }
}
