//! Data helpers for the veleta CLI.

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use veleta_core::{Frame, Timestamp};

/// Parse a date string in YYYY-MM-DD format into a midnight timestamp.
pub(crate) fn parse_date(date_str: &str) -> Result<Timestamp> {
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("Invalid date format: {}", e))?;
    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("Failed to construct timestamp for {}", date_str))
}

/// Build a deterministic synthetic close-price panel for the demo command.
///
/// Four assets with distinct behaviors: a steady riser, a flat line, a
/// steady decliner, and an oscillator. Enough contrast for the momentum
/// ranking to produce a non-trivial book.
pub(crate) fn synthetic_panel(rows: usize) -> Result<Frame> {
    let start = parse_date("2024-01-01")?;
    let index: Vec<Timestamp> = (0..rows)
        .map(|t| start + Duration::days(t as i64))
        .collect();

    let values = (0..rows)
        .map(|t| {
            let t = t as f64;
            vec![
                100.0 * 1.002_f64.powf(t),
                100.0,
                100.0 * 0.998_f64.powf(t),
                100.0 + 5.0 * (t / 10.0).sin(),
            ]
        })
        .collect();

    let columns = ["TREND", "FLAT", "DECAY", "CYCLE"]
        .into_iter()
        .map(str::to_string)
        .collect();

    Ok(Frame::from_rows(index, columns, values)?)
}
