//! Retrieval metadata for price matrices.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Immutable descriptor of a price retrieval: which exchange, timeframe and
/// field a matrix was fetched for, the symbols it covers, and the requested
/// time window.
///
/// A [`crate::Frame`] and its `PriceMeta` travel as two decoupled values;
/// they are only joined back together at the serialization boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceMeta {
    /// Exchange identifier, e.g. `"binance"`.
    pub exchange: String,
    /// Bar timeframe, e.g. `"1d"`.
    pub timeframe: String,
    /// Price field, e.g. `"close"`.
    pub field: String,
    /// Symbols covered by the matrix, in column order.
    pub symbols: Vec<String>,
    /// Start of the requested window, if bounded.
    pub start: Option<NaiveDateTime>,
    /// End of the requested window, if bounded.
    pub end: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_through_json() {
        let meta = PriceMeta {
            exchange: "binance".to_string(),
            timeframe: "1d".to_string(),
            field: "close".to_string(),
            symbols: vec!["BTC/USDT".to_string(), "ETH/USDT".to_string()],
            start: None,
            end: None,
        };
        let json = serde_json::to_string(&meta).unwrap();
        let back: PriceMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(meta, back);
    }
}
