//! # Utilities Module
//!
//! Internal utility modules for the core-logic crate.
//! These modules are marked as `pub(crate)` to enforce API boundaries.

pub(crate) mod gas;
pub(crate) mod logger;
pub(crate) mod wallet_manager;

// Selective exports - only public utilities
pub use gas::{bid_fees, compute_fee_bid, wei_to_gwei, FeeBid, GasConfig};
pub use logger::{setup_logger, RESULT_TARGET};
pub use wallet_manager::{normalize_private_key, DecryptedWallet, WalletManager};
