#![forbid(unsafe_code)]

//! Core data model for the veleta backtesting framework.
//!
//! This crate provides the canonical time-indexed matrix and series types
//! that every stage of the backtesting pipeline consumes and produces,
//! together with the shared error taxonomy and the price retrieval
//! descriptor.

/// The version of the veleta-core crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod frame;
pub mod meta;
pub mod series;

// Re-exports
pub use error::{Result, VeletaError};
pub use frame::{Frame, Timestamp};
pub use meta::PriceMeta;
pub use series::Series;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }
}
