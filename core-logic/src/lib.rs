//! # Core Logic - Shared Utilities for Contract Deployment
//!
//! This crate provides the chain-agnostic pieces used by the deployer
//! binaries: typed errors, fee bidding, local account storage and logging.
//!
//! ## Modules
//!
//! - [`config`] - Connection and account-source configuration
//! - [`error`] - Typed error handling with thiserror
//! - [`security`] - Encryption of local account files
//! - [`traits`] - The [`FeeMarket`] seam implemented per chain
//! - `utils` - Fee bidding, wallet management, logging

pub mod config;
pub mod error;
pub mod security;
pub mod traits;
pub(crate) mod utils;

pub use config::{ChainConfig, WalletSource};
pub use error::{
    ConfigError, CoreError, DeployError, NetworkError, SecurityError, WalletError,
};
pub use security::{EncryptedComponents, SecurityUtils};
pub use traits::FeeMarket;
pub use tracing_appender::non_blocking::WorkerGuard;

pub use utils::{
    bid_fees, compute_fee_bid, normalize_private_key, setup_logger, wei_to_gwei, DecryptedWallet,
    FeeBid, GasConfig, WalletManager, RESULT_TARGET,
};
