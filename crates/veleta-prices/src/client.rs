//! Price API client implementation.

use crate::{
    Result,
    error::PricesError,
    types::{PriceEnvelope, PriceQuery, pivot_records, resolve_columns},
};
use reqwest::Client;
use std::env;
use veleta_core::{Frame, PriceMeta};

/// Environment variable naming the price API base URL.
const ENV_BASE_URL: &str = "VELETA_API_URL";

/// Base URL used when the environment does not name one.
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Query parameter format for window bounds.
const TS_QUERY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Client for the veleta price API.
#[derive(Debug, Clone)]
pub struct PricesClient {
    client: Client,
    base_url: String,
}

impl PricesClient {
    /// Create a client pointed at the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create a client from the `VELETA_API_URL` environment variable,
    /// falling back to `http://localhost:8000`.
    ///
    /// This will also load from a `.env` file if present.
    #[must_use]
    pub fn from_env() -> Self {
        // Try to load .env file (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    /// Build a URL for an endpoint.
    fn url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url.trim_end_matches('/'))
    }

    /// Make a GET request and parse the JSON response.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(endpoint);
        let response = self.client.get(&url).query(params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(PricesError::Api(format!("HTTP {status}: {text}")));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            PricesError::Json(serde_json::Error::io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Failed to parse: {e}. Response: {text}"),
            )))
        })
    }

    /// Fetch close prices and pivot them into a price matrix.
    ///
    /// Returns the matrix together with the retrieval metadata. A response
    /// without records yields an empty frame that still carries the
    /// requested columns.
    ///
    /// # Errors
    ///
    /// Returns an error when the query names an empty symbol list, the
    /// request fails, the API reports an error, or the payload cannot be
    /// pivoted.
    pub async fn close_prices(&self, query: &PriceQuery) -> Result<(Frame, PriceMeta)> {
        let requested = query.requested_symbols()?;

        let mut params: Vec<(&str, String)> = vec![
            ("exchange", query.exchange.clone()),
            ("timeframe", query.timeframe.clone()),
            ("field", "close".to_string()),
        ];
        if let Some(symbols) = &requested {
            for symbol in symbols {
                params.push(("symbols", symbol.clone()));
            }
        }
        if let Some(start) = query.start {
            params.push(("start", start.format(TS_QUERY_FORMAT).to_string()));
        }
        if let Some(end) = query.end {
            params.push(("end", end.format(TS_QUERY_FORMAT).to_string()));
        }

        let envelope: PriceEnvelope = self.get("prices/", &params).await?;
        if envelope.success == Some(false) {
            return Err(PricesError::Api(envelope.message));
        }
        let context = envelope
            .context
            .ok_or_else(|| PricesError::Api("response missing context".to_string()))?;

        let columns = resolve_columns(context.meta.as_ref(), requested.as_deref(), &context.data);
        let frame = if context.data.is_empty() {
            Frame::empty(columns.clone())
        } else {
            pivot_records(&context.data, &columns)?
        };

        let meta = match context.meta {
            Some(raw) => raw.into_meta()?,
            None => PriceMeta {
                exchange: query.exchange.clone(),
                timeframe: query.timeframe.clone(),
                field: "close".to_string(),
                symbols: columns,
                start: query.start,
                end: query.end,
            },
        };

        Ok((frame, meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let client = PricesClient::new("http://localhost:8000/");
        assert_eq!(client.url("prices/"), "http://localhost:8000/prices/");

        let client = PricesClient::new("https://api.example.com");
        assert_eq!(client.url("prices/"), "https://api.example.com/prices/");
    }
}
