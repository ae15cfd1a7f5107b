use async_trait::async_trait;

use crate::error::NetworkError;

/// Read access to a network's current EIP-1559 fee market.
///
/// Chains implement this against their RPC client; all amounts are wei.
#[async_trait]
pub trait FeeMarket: Send + Sync {
    /// Endpoint identifier used in logs and errors
    fn endpoint(&self) -> &str;

    /// Base fee of the most recent block
    async fn base_fee(&self) -> Result<u128, NetworkError>;

    /// Priority fee currently suggested by the node
    async fn priority_fee(&self) -> Result<u128, NetworkError>;
}
