#![forbid(unsafe_code)]

//! Price API client for veleta.
//!
//! This crate fetches close-price panels from the collaborator price API
//! and pivots the record-oriented payload into a [`veleta_core::Frame`]
//! ready for backtesting.
//!
//! # Usage
//!
//! ```rust,ignore
//! use veleta_prices::{PriceQuery, PricesClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PricesClient::from_env();
//!
//!     let query = PriceQuery {
//!         symbols: Some(vec!["BTC/USDT".into(), "ETH/USDT".into()]),
//!         ..PriceQuery::new("binance", "1d")
//!     };
//!     let (prices, meta) = client.close_prices(&query).await?;
//!
//!     println!("{} rows for {:?}", prices.n_rows(), meta.symbols);
//!     Ok(())
//! }
//! ```
//!
//! # Environment Variables
//!
//! Set `VELETA_API_URL` in your environment or `.env` file:
//!
//! ```bash
//! VELETA_API_URL=http://localhost:8000
//! ```

mod client;
mod error;
mod types;

pub use client::PricesClient;
pub use error::PricesError;
pub use types::PriceQuery;

/// Result type for price API operations.
pub type Result<T> = std::result::Result<T, PricesError>;
