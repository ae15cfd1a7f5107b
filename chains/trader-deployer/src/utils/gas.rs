use async_trait::async_trait;
use core_logic::{FeeMarket, NetworkError};
use ethers::prelude::*;
use std::sync::Arc;

/// Reads the EIP-1559 fee market from an ethers middleware.
#[derive(Clone, Debug)]
pub struct GasManager<M> {
    provider: Arc<M>,
    endpoint: String,
}

impl<M: Middleware> GasManager<M> {
    pub fn new(provider: Arc<M>, endpoint: impl Into<String>) -> Self {
        Self {
            provider,
            endpoint: endpoint.into(),
        }
    }

    fn request_error(&self, method: &str, reason: impl ToString) -> NetworkError {
        NetworkError::Request {
            endpoint: self.endpoint.clone(),
            method: method.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl<M> FeeMarket for GasManager<M>
where
    M: Middleware + 'static,
{
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn base_fee(&self) -> Result<u128, NetworkError> {
        let block = self
            .provider
            .get_block(BlockNumber::Latest)
            .await
            .map_err(|e| self.request_error("eth_getBlockByNumber", e))?
            .ok_or_else(|| self.request_error("eth_getBlockByNumber", "latest block not found"))?;

        let base_fee = block
            .base_fee_per_gas
            .ok_or_else(|| NetworkError::MissingBaseFee {
                endpoint: self.endpoint.clone(),
            })?;

        u256_to_u128(base_fee, "base_fee")
    }

    async fn priority_fee(&self) -> Result<u128, NetworkError> {
        let fee: U256 = self
            .provider
            .provider()
            .request("eth_maxPriorityFeePerGas", ())
            .await
            .map_err(|e| self.request_error("eth_maxPriorityFeePerGas", e))?;

        u256_to_u128(fee, "priority_fee")
    }
}

pub fn u256_to_u128(value: U256, field: &str) -> Result<u128, NetworkError> {
    if value > U256::from(u128::MAX) {
        return Err(NetworkError::ValueOverflow {
            field: field.to_string(),
        });
    }
    Ok(value.as_u128())
}
