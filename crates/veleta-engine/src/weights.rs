//! Position-to-weight rebalancing.

use ndarray::Array2;
use veleta_core::{Frame, Result};

/// Converts a position matrix into normalized long/short weights.
///
/// Within each row, strictly positive positions share the long book equally
/// (each gets `1 / long_count`) and strictly negative positions share the
/// short book equally (each gets `-1 / short_count`). Flat symbols get 0,
/// and a side with no entries contributes nothing, so positive weights sum
/// to 1 whenever any long exposure exists and negative weights sum to -1
/// whenever any short exposure exists.
///
/// # Errors
///
/// Propagates frame construction errors; these cannot occur for a frame
/// that was itself validly constructed.
pub fn rebalance_weights(positions: &Frame) -> Result<Frame> {
    if positions.is_empty() {
        return Ok(positions.clone());
    }

    let (n_rows, n_cols) = (positions.n_rows(), positions.n_cols());
    let mut weights = Array2::zeros((n_rows, n_cols));

    for row in 0..n_rows {
        let long_count = (0..n_cols)
            .filter(|&col| positions.get(row, col) > 0.0)
            .count();
        let short_count = (0..n_cols)
            .filter(|&col| positions.get(row, col) < 0.0)
            .count();

        for col in 0..n_cols {
            let value = positions.get(row, col);
            if value > 0.0 {
                weights[[row, col]] = 1.0 / long_count as f64;
            } else if value < 0.0 {
                weights[[row, col]] = -1.0 / short_count as f64;
            }
        }
    }

    Frame::new(
        positions.index().to_vec(),
        positions.columns().to_vec(),
        weights,
    )
}
