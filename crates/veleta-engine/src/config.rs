//! Engine configuration.

use serde::{Deserialize, Serialize};
use veleta_core::{Result, VeletaError};

/// Configuration for the backtesting engine.
///
/// Costs are charged as a flat fraction per unit of turnover; there is no
/// slippage model beyond that. `max_active_positions` caps the number of
/// simultaneously held names per side and enables the sticky slot
/// allocation in the position converter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Starting capital the equity curve is scaled by.
    pub initial_capital: f64,
    /// Cost charged per unit of turnover, e.g. 0.001 for 10 bps.
    pub transaction_cost: f64,
    /// Trading periods per year used for annualization.
    pub annualization_factor: u32,
    /// Cap on simultaneously active positions per side, if any.
    pub max_active_positions: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_capital: 1.0,
            transaction_cost: 0.0,
            annualization_factor: 252,
            max_active_positions: None,
        }
    }
}

impl EngineConfig {
    /// Checks the configuration for invalid values.
    ///
    /// # Errors
    ///
    /// Returns [`VeletaError::InvalidConfig`] when the transaction cost is
    /// negative or non-finite, the annualization factor is zero, or the
    /// position cap is zero.
    pub fn validate(&self) -> Result<()> {
        if !self.transaction_cost.is_finite() || self.transaction_cost < 0.0 {
            return Err(VeletaError::InvalidConfig(
                "transaction_cost must be a non-negative number".to_string(),
            ));
        }
        if !self.initial_capital.is_finite() {
            return Err(VeletaError::InvalidConfig(
                "initial_capital must be finite".to_string(),
            ));
        }
        if self.annualization_factor == 0 {
            return Err(VeletaError::InvalidConfig(
                "annualization_factor must be positive".to_string(),
            ));
        }
        if self.max_active_positions == Some(0) {
            return Err(VeletaError::InvalidConfig(
                "max_active_positions must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}
