//! Wire types for price API responses.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use veleta_core::{Frame, PriceMeta, Timestamp};

use crate::{Result, error::PricesError};

/// Parameters of a close-price retrieval.
#[derive(Debug, Clone)]
pub struct PriceQuery {
    /// Exchange identifier, e.g. `"binance"`.
    pub exchange: String,
    /// Bar timeframe, e.g. `"1d"`.
    pub timeframe: String,
    /// Symbols to fetch; `None` requests every symbol the API holds.
    pub symbols: Option<Vec<String>>,
    /// Inclusive start of the window.
    pub start: Option<Timestamp>,
    /// Inclusive end of the window.
    pub end: Option<Timestamp>,
}

impl PriceQuery {
    /// Creates an unbounded query over all symbols.
    #[must_use]
    pub fn new(exchange: impl Into<String>, timeframe: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            timeframe: timeframe.into(),
            symbols: None,
            start: None,
            end: None,
        }
    }

    /// Requested symbols with duplicates removed, keeping first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`PricesError::NoSymbols`] when an explicit symbol list is
    /// empty; `None` (all symbols) remains valid.
    pub(crate) fn requested_symbols(&self) -> Result<Option<Vec<String>>> {
        match &self.symbols {
            None => Ok(None),
            Some(list) if list.is_empty() => Err(PricesError::NoSymbols),
            Some(list) => {
                let mut seen = BTreeSet::new();
                Ok(Some(
                    list.iter()
                        .filter(|symbol| seen.insert(symbol.as_str()))
                        .cloned()
                        .collect(),
                ))
            }
        }
    }
}

/// Top-level API response wrapper.
#[derive(Debug, Deserialize)]
pub(crate) struct PriceEnvelope {
    pub success: Option<bool>,
    #[serde(default)]
    pub message: String,
    pub context: Option<PriceContext>,
}

/// Payload of a price response.
#[derive(Debug, Deserialize)]
pub(crate) struct PriceContext {
    pub meta: Option<RawMeta>,
    #[serde(default)]
    pub data: Vec<PriceRecord>,
}

/// Retrieval metadata as serialized on the wire, timestamps still raw.
#[derive(Debug, Deserialize)]
pub(crate) struct RawMeta {
    pub exchange: String,
    pub timeframe: String,
    pub field: String,
    #[serde(default)]
    pub symbols: Vec<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl RawMeta {
    /// Converts wire metadata into [`PriceMeta`], parsing the timestamps.
    pub(crate) fn into_meta(self) -> Result<PriceMeta> {
        Ok(PriceMeta {
            exchange: self.exchange,
            timeframe: self.timeframe,
            field: self.field,
            symbols: self.symbols,
            start: self.start.as_deref().map(parse_timestamp).transpose()?,
            end: self.end.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}

/// One wide row of the response: a timestamp plus one value per symbol.
#[derive(Debug, Deserialize)]
pub(crate) struct PriceRecord {
    pub ts: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, serde_json::Value>,
}

/// Parses a response timestamp, converting tz-aware values to naive UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Result<Timestamp> {
    if let Ok(aware) = DateTime::parse_from_rfc3339(raw) {
        return Ok(aware.naive_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|_| PricesError::InvalidTimestamp(raw.to_string()))
}

/// Column order for the pivoted frame: server metadata wins, then the
/// requested list, then the symbols observed in the records.
pub(crate) fn resolve_columns(
    meta: Option<&RawMeta>,
    requested: Option<&[String]>,
    records: &[PriceRecord],
) -> Vec<String> {
    if let Some(meta) = meta
        && !meta.symbols.is_empty()
    {
        return meta.symbols.clone();
    }
    if let Some(requested) = requested {
        return requested.to_vec();
    }
    records
        .iter()
        .flat_map(|record| record.values.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Pivots wide records into a price matrix with the given column order.
///
/// Symbols missing from a record become missing values; non-numeric cells
/// do too.
pub(crate) fn pivot_records(records: &[PriceRecord], columns: &[String]) -> Result<Frame> {
    let mut index = Vec::with_capacity(records.len());
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        index.push(parse_timestamp(&record.ts)?);
        rows.push(
            columns
                .iter()
                .map(|column| {
                    record
                        .values
                        .get(column)
                        .and_then(serde_json::Value::as_f64)
                        .unwrap_or(f64::NAN)
                })
                .collect(),
        );
    }
    Frame::from_rows(index, columns.to_vec(), rows).map_err(Into::into)
}
