//! # Core Logic - Fee Bidding
//!
//! Chain-agnostic EIP-1559 fee bidding. The current fee market is read
//! through a [`FeeMarket`] and both components are inflated by the
//! configured multiplier. Values are wei throughout.

use serde::Deserialize;
use tracing::debug;

use crate::error::{ConfigError, CoreError, NetworkError};
use crate::traits::FeeMarket;

/// Fixed-point scale used to apply the multiplier exactly.
const MULTIPLIER_SCALE: u128 = 1_000;
/// Float noise allowed when checking the multiplier fits in thousandths.
const MULTIPLIER_TOLERANCE: f64 = 1e-6;

/// Configuration for fee bidding
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GasConfig {
    pub fee_multiplier: f64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            fee_multiplier: 1.2,
        }
    }
}

impl GasConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fee_multiplier(mut self, fee_multiplier: f64) -> Self {
        self.fee_multiplier = fee_multiplier;
        self
    }

    /// The multiplier must be at least `1.0` and have at most three decimals,
    /// since the bid is computed in thousandths.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            field: "gas.fee_multiplier".to_string(),
            reason,
        };

        if !self.fee_multiplier.is_finite() {
            return Err(invalid(format!(
                "must be a finite number, got {}",
                self.fee_multiplier
            )));
        }

        let thousandths = self.fee_multiplier * MULTIPLIER_SCALE as f64;
        if (thousandths - thousandths.round()).abs() > MULTIPLIER_TOLERANCE {
            return Err(invalid(format!(
                "at most three decimal places are supported, got {}",
                self.fee_multiplier
            )));
        }
        if self.multiplier_scaled() < MULTIPLIER_SCALE {
            return Err(invalid(format!(
                "must be at least 1.0, got {}",
                self.fee_multiplier
            )));
        }
        Ok(())
    }

    /// The multiplier in thousandths, e.g. `1.2` becomes `1200`.
    pub fn multiplier_scaled(&self) -> u128 {
        (self.fee_multiplier * MULTIPLIER_SCALE as f64).round() as u128
    }
}

/// EIP-1559 fee parameters for a single transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeBid {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

/// `floor(value * multiplier)`
fn inflate(value: u128, config: &GasConfig, field: &str) -> Result<u128, NetworkError> {
    value
        .checked_mul(config.multiplier_scaled())
        .map(|scaled| scaled / MULTIPLIER_SCALE)
        .ok_or_else(|| NetworkError::ValueOverflow {
            field: field.to_string(),
        })
}

/// Turns the observed fee market into a bid:
///
/// ```text
/// priority = floor(priority_fee * m)
/// max      = floor(base_fee * m + priority)
/// ```
pub fn compute_fee_bid(
    base_fee: u128,
    priority_fee: u128,
    config: &GasConfig,
) -> Result<FeeBid, CoreError> {
    config.validate()?;

    let max_priority_fee_per_gas = inflate(priority_fee, config, "priority_fee")?;
    // priority is already integral, so floor(base * m + priority) == floor(base * m) + priority
    let max_fee_per_gas = inflate(base_fee, config, "base_fee")?
        .checked_add(max_priority_fee_per_gas)
        .ok_or_else(|| NetworkError::ValueOverflow {
            field: "max_fee".to_string(),
        })?;

    Ok(FeeBid {
        max_fee_per_gas,
        max_priority_fee_per_gas,
    })
}

/// Reads the current fee market and computes a bid from it.
pub async fn bid_fees<F>(market: &F, config: &GasConfig) -> Result<FeeBid, CoreError>
where
    F: FeeMarket + ?Sized,
{
    let base_fee = market.base_fee().await?;
    let priority_fee = market.priority_fee().await?;

    let bid = compute_fee_bid(base_fee, priority_fee, config)?;
    debug!(
        endpoint = market.endpoint(),
        base_fee,
        priority_fee,
        max_fee = bid.max_fee_per_gas,
        max_priority_fee = bid.max_priority_fee_per_gas,
        "Computed fee bid"
    );

    Ok(bid)
}

/// Convert wei to gwei for display
pub fn wei_to_gwei(wei: u128) -> f64 {
    wei as f64 / 1e9
}
