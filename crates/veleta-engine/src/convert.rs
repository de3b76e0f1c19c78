//! Signal-to-position conversion and the capacity slot allocator.

use veleta_core::{Frame, Result, VeletaError};

/// Converts a signal matrix into a position matrix.
///
/// Signal values must be ordinary numbers (booleans enter as 0/1 via
/// [`Frame::from_bool_rows`]); missing observations (NaN) are preserved and
/// filled to flat by the engine.
///
/// # Errors
///
/// Returns [`VeletaError::InvalidInput`] when a signal value is infinite.
pub fn signals_to_positions(signals: &Frame) -> Result<Frame> {
    if signals.values().iter().any(|v| v.is_infinite()) {
        return Err(VeletaError::InvalidInput(
            "signals must contain boolean or numeric values that can be converted to positions"
                .to_string(),
        ));
    }
    Ok(signals.clone())
}

/// Maps boolean-style or ternary signal conventions onto caller-chosen
/// numeric values.
///
/// When every value is in {0, 1} the frame is treated as a boolean panel and
/// mapped to `{1 -> long_value, 0 -> flat_value}`. When every value is in
/// {-1, 0, 1} it is treated as ternary and mapped to
/// `{1 -> long_value, 0 -> flat_value, -1 -> short_value}`. Any other value
/// set (including frames containing NaN) passes through unchanged.
///
/// # Errors
///
/// Returns [`VeletaError::InvalidInput`] when a signal value is infinite.
pub fn to_positions(
    signals: &Frame,
    long_value: f64,
    flat_value: f64,
    short_value: f64,
) -> Result<Frame> {
    let signals = signals_to_positions(signals)?;
    if signals.is_empty() {
        return Ok(signals);
    }

    let is_boolean_style = signals.values().iter().all(|&v| v == 0.0 || v == 1.0);
    if is_boolean_style {
        return Frame::new(
            signals.index().to_vec(),
            signals.columns().to_vec(),
            signals
                .values()
                .mapv(|v| if v == 1.0 { long_value } else { flat_value }),
        );
    }

    let is_ternary = signals
        .values()
        .iter()
        .all(|&v| v == -1.0 || v == 0.0 || v == 1.0);
    if is_ternary {
        return Frame::new(
            signals.index().to_vec(),
            signals.columns().to_vec(),
            signals.values().mapv(|v| {
                if v == 1.0 {
                    long_value
                } else if v == -1.0 {
                    short_value
                } else {
                    flat_value
                }
            }),
        );
    }

    Ok(signals)
}

/// Applies the per-side position capacity limit with slot stickiness.
///
/// Rows are processed in chronological order carrying the currently active
/// long and short symbols across timesteps:
///
/// 1. Symbols whose signal left their side are evicted, unconditionally
///    freeing their slot.
/// 2. Remaining candidates are admitted in column order up to the free
///    capacity on each side.
/// 3. Positions outside the active sets are zeroed; active positions keep
///    their original value.
///
/// An already-held name is never displaced by a later candidate; it only
/// exits when its own signal turns off. A symbol evicted from one side is
/// immediately eligible for the other side within the same timestep.
///
/// # Errors
///
/// Returns [`VeletaError::InvalidConfig`] when `limit` is zero.
pub fn apply_position_cap(positions: &Frame, limit: usize) -> Result<Frame> {
    if limit == 0 {
        return Err(VeletaError::InvalidConfig(
            "max_active_positions must be a positive integer".to_string(),
        ));
    }
    if positions.is_empty() {
        return Ok(positions.clone());
    }

    let n_cols = positions.n_cols();
    let mut values = positions.values().clone();
    let mut active_longs: Vec<usize> = Vec::new();
    let mut active_shorts: Vec<usize> = Vec::new();

    for row in 0..positions.n_rows() {
        // Exits are unconditional: a signal that turned off frees its slot.
        active_longs.retain(|&col| values[[row, col]] > 0.0);
        active_shorts.retain(|&col| values[[row, col]] < 0.0);

        let long_candidates: Vec<usize> = (0..n_cols)
            .filter(|&col| values[[row, col]] > 0.0 && !active_longs.contains(&col))
            .collect();
        let short_candidates: Vec<usize> = (0..n_cols)
            .filter(|&col| values[[row, col]] < 0.0 && !active_shorts.contains(&col))
            .collect();

        let long_slots = limit.saturating_sub(active_longs.len());
        let short_slots = limit.saturating_sub(active_shorts.len());

        active_longs.extend(long_candidates.into_iter().take(long_slots));
        active_shorts.extend(short_candidates.into_iter().take(short_slots));

        for col in 0..n_cols {
            if !active_longs.contains(&col) && !active_shorts.contains(&col) {
                values[[row, col]] = 0.0;
            }
        }
    }

    Frame::new(
        positions.index().to_vec(),
        positions.columns().to_vec(),
        values,
    )
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

    fn frame(columns: &[&str], rows: Vec<Vec<f64>>) -> Frame {
        let index = (1..=rows.len() as u32).map(ts).collect();
        Frame::from_rows(
            index,
            columns.iter().map(|c| c.to_string()).collect(),
            rows,
        )
        .unwrap()
    }

    #[test]
    fn test_signals_reject_infinite_values() {
        let signals = frame(&["a"], vec![vec![f64::INFINITY]]);
        assert!(signals_to_positions(&signals).is_err());
    }

    #[test]
    fn test_to_positions_boolean_style() {
        let signals = frame(&["a", "b"], vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        let mapped = to_positions(&signals, 2.0, 0.5, -2.0).unwrap();
        assert_relative_eq!(mapped.get(0, 0), 2.0);
        assert_relative_eq!(mapped.get(0, 1), 0.5);
        assert_relative_eq!(mapped.get(1, 1), 2.0);
    }

    #[test]
    fn test_to_positions_ternary() {
        let signals = frame(&["a", "b"], vec![vec![1.0, -1.0], vec![0.0, -1.0]]);
        let mapped = to_positions(&signals, 1.0, 0.0, -0.5).unwrap();
        assert_relative_eq!(mapped.get(0, 1), -0.5);
        assert_relative_eq!(mapped.get(1, 0), 0.0);
    }

    #[test]
    fn test_to_positions_other_values_pass_through() {
        let signals = frame(&["a"], vec![vec![0.7], vec![0.2]]);
        let mapped = to_positions(&signals, 1.0, 0.0, -1.0).unwrap();
        assert_relative_eq!(mapped.get(0, 0), 0.7);
        assert_relative_eq!(mapped.get(1, 0), 0.2);
    }

    #[test]
    fn test_cap_rejects_zero_limit() {
        let positions = frame(&["a"], vec![vec![1.0]]);
        assert!(matches!(
            apply_position_cap(&positions, 0),
            Err(VeletaError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_cap_rejects_new_candidate_when_full() {
        // t1 holds A and B; at t2 C signals long but both slots are taken.
        let positions = frame(
            &["a", "b", "c"],
            vec![vec![1.0, 1.0, 0.0], vec![1.0, 1.0, 1.0]],
        );
        let capped = apply_position_cap(&positions, 2).unwrap();
        assert_relative_eq!(capped.get(1, 0), 1.0);
        assert_relative_eq!(capped.get(1, 1), 1.0);
        assert_relative_eq!(capped.get(1, 2), 0.0);
    }

    #[test]
    fn test_cap_freed_slot_goes_to_earliest_column() {
        // A exits at t2, freeing one slot; C wins it over D by column order.
        let positions = frame(
            &["a", "b", "c", "d"],
            vec![
                vec![1.0, 1.0, 0.0, 0.0],
                vec![0.0, 1.0, 1.0, 1.0],
            ],
        );
        let capped = apply_position_cap(&positions, 2).unwrap();
        assert_relative_eq!(capped.get(1, 0), 0.0);
        assert_relative_eq!(capped.get(1, 1), 1.0);
        assert_relative_eq!(capped.get(1, 2), 1.0);
        assert_relative_eq!(capped.get(1, 3), 0.0);
    }

    #[test]
    fn test_cap_holder_never_displaced() {
        // B is held from t1; at t2 A (earlier column) turns on, but B keeps
        // the only slot while its own signal stays positive.
        let positions = frame(
            &["a", "b"],
            vec![vec![0.0, 1.0], vec![1.0, 1.0], vec![1.0, 0.0]],
        );
        let capped = apply_position_cap(&positions, 1).unwrap();
        assert_relative_eq!(capped.get(1, 0), 0.0);
        assert_relative_eq!(capped.get(1, 1), 1.0);
        // B exits at t3 and A takes the freed slot.
        assert_relative_eq!(capped.get(2, 0), 1.0);
        assert_relative_eq!(capped.get(2, 1), 0.0);
    }

    #[test]
    fn test_cap_sides_are_independent() {
        let positions = frame(
            &["a", "b", "c", "d"],
            vec![vec![1.0, 1.0, -1.0, -1.0]],
        );
        let capped = apply_position_cap(&positions, 1).unwrap();
        assert_relative_eq!(capped.get(0, 0), 1.0);
        assert_relative_eq!(capped.get(0, 1), 0.0);
        assert_relative_eq!(capped.get(0, 2), -1.0);
        assert_relative_eq!(capped.get(0, 3), 0.0);
    }

    #[test]
    fn test_cap_sign_flip_reenters_same_period() {
        // A flips from short to long at t2: the short slot is freed and A is
        // long-eligible the same timestep.
        let positions = frame(&["a"], vec![vec![-1.0], vec![1.0]]);
        let capped = apply_position_cap(&positions, 1).unwrap();
        assert_relative_eq!(capped.get(0, 0), -1.0);
        assert_relative_eq!(capped.get(1, 0), 1.0);
    }

    #[test]
    fn test_cap_invariant_never_exceeds_limit() {
        let positions = frame(
            &["a", "b", "c", "d", "e"],
            vec![
                vec![1.0, 1.0, 1.0, -1.0, -1.0],
                vec![1.0, 0.0, 1.0, -1.0, 1.0],
                vec![0.0, 1.0, 1.0, -1.0, -1.0],
            ],
        );
        let limit = 2;
        let capped = apply_position_cap(&positions, limit).unwrap();
        for row in 0..capped.n_rows() {
            let longs = (0..capped.n_cols())
                .filter(|&col| capped.get(row, col) > 0.0)
                .count();
            let shorts = (0..capped.n_cols())
                .filter(|&col| capped.get(row, col) < 0.0)
                .count();
            assert!(longs <= limit);
            assert!(shorts <= limit);
        }
    }

    #[test]
    fn test_cap_preserves_magnitude() {
        let positions = frame(&["a", "b"], vec![vec![0.6, -0.4]]);
        let capped = apply_position_cap(&positions, 1).unwrap();
        assert_relative_eq!(capped.get(0, 0), 0.6);
        assert_relative_eq!(capped.get(0, 1), -0.4);
    }
}
