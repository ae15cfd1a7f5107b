//! The deploy routine: one contract-creation transaction per call, no retries.

pub mod record;

use core_logic::{
    bid_fees, ChainConfig, ConfigError, CoreError, DeployError, FeeBid, GasConfig, NetworkError,
    WalletError,
};
use ethers::prelude::*;
use ethers::utils::to_checksum;
use std::sync::Arc;
use tracing::info;

use crate::contracts::{ContractArtifact, TraderArgs};
use crate::utils::gas::GasManager;

pub use record::{append_deployment, DeploymentHistory, DeploymentRecord};

pub type DeployClient<M> = SignerMiddleware<M, LocalWallet>;

/// A creation request with its fee bid, gas limit and the deployer balance.
#[derive(Debug, Clone)]
pub struct PreparedDeployment {
    pub tx: Eip1559TransactionRequest,
    pub fee_bid: FeeBid,
    pub gas_limit: U256,
    pub balance: U256,
}

impl PreparedDeployment {
    /// Upper bound on what the deployment can cost
    pub fn max_cost(&self) -> U256 {
        self.gas_limit
            .saturating_mul(U256::from(self.fee_bid.max_fee_per_gas))
    }

    /// How much the balance falls short of `max_cost`, if at all.
    pub fn shortfall(&self) -> Option<U256> {
        self.max_cost()
            .checked_sub(self.balance)
            .filter(|missing| !missing.is_zero())
    }
}

#[derive(Debug, Clone)]
pub struct DeployOutcome {
    pub address: Address,
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: Option<U256>,
    pub deployer: Address,
    pub fee_bid: FeeBid,
}

pub struct TraderDeployer<M = Provider<Http>> {
    chain: ChainConfig,
    client: Arc<DeployClient<M>>,
    gas_manager: GasManager<DeployClient<M>>,
}

impl TraderDeployer<Provider<Http>> {
    /// Connects over HTTP to the configured endpoint.
    pub async fn connect(chain: ChainConfig, wallet: LocalWallet) -> Result<Self, CoreError> {
        chain.validate()?;

        let provider = Provider::<Http>::try_from(chain.rpc_endpoint.as_str()).map_err(|_| {
            ConfigError::InvalidRpcUrl {
                url: chain.rpc_endpoint.clone(),
            }
        })?;

        Self::with_provider(chain, provider, wallet).await
    }
}

impl<M> TraderDeployer<M>
where
    M: Middleware + 'static,
{
    /// Wraps `provider` with the signer after checking it serves the
    /// configured chain.
    pub async fn with_provider(
        chain: ChainConfig,
        provider: M,
        wallet: LocalWallet,
    ) -> Result<Self, CoreError> {
        let remote_chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| NetworkError::Request {
                endpoint: chain.rpc_endpoint.clone(),
                method: "eth_chainId".to_string(),
                reason: e.to_string(),
            })?;
        if remote_chain_id > U256::from(u64::MAX) {
            return Err(NetworkError::ValueOverflow {
                field: "chain_id".to_string(),
            }
            .into());
        }
        let remote_chain_id = remote_chain_id.as_u64();

        if remote_chain_id != chain.chain_id {
            return Err(ConfigError::ChainIdMismatch {
                network: chain.name.clone(),
                expected: chain.chain_id,
                actual: remote_chain_id,
            }
            .into());
        }

        let client = Arc::new(SignerMiddleware::new(
            provider,
            wallet.with_chain_id(chain.chain_id),
        ));
        let gas_manager = GasManager::new(Arc::clone(&client), chain.rpc_endpoint.clone());

        info!(
            network = %chain.name,
            chain_id = chain.chain_id,
            deployer = %to_checksum(&client.address(), None),
            "Connected"
        );

        Ok(Self {
            chain,
            client,
            gas_manager,
        })
    }

    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    pub fn deployer_address(&self) -> Address {
        self.client.address()
    }

    /// Builds and prices the creation request: fee bid, init code, gas
    /// estimate and the current balance. Funds are not checked.
    pub async fn quote(
        &self,
        artifact: &ContractArtifact,
        args: &TraderArgs,
        gas_config: &GasConfig,
    ) -> Result<PreparedDeployment, CoreError> {
        let init_code = artifact.init_code(args)?;
        let fee_bid = bid_fees(&self.gas_manager, gas_config).await?;

        let tx = build_creation_tx(
            self.deployer_address(),
            init_code,
            &fee_bid,
            self.chain.chain_id,
        );

        let gas_limit = self
            .client
            .estimate_gas(&tx.clone().into(), None)
            .await
            .map_err(|e| DeployError::Submission {
                reason: format!("gas estimation failed: {}", e),
            })?;
        let tx = tx.gas(gas_limit);

        let balance = self
            .client
            .get_balance(self.deployer_address(), None)
            .await
            .map_err(|e| NetworkError::Request {
                endpoint: self.chain.rpc_endpoint.clone(),
                method: "eth_getBalance".to_string(),
                reason: e.to_string(),
            })?;

        Ok(PreparedDeployment {
            tx,
            fee_bid,
            gas_limit,
            balance,
        })
    }

    /// `quote` followed by the balance check against the worst-case cost.
    pub async fn prepare(
        &self,
        artifact: &ContractArtifact,
        args: &TraderArgs,
        gas_config: &GasConfig,
    ) -> Result<PreparedDeployment, CoreError> {
        let prepared = self.quote(artifact, args, gas_config).await?;
        check_funds(&prepared)?;
        Ok(prepared)
    }

    /// Submits the prepared transaction and waits for it to be mined.
    pub async fn deploy(
        &self,
        prepared: PreparedDeployment,
        confirmations: usize,
    ) -> Result<DeployOutcome, CoreError> {
        let fee_bid = prepared.fee_bid;
        let pending = self
            .client
            .send_transaction(prepared.tx, None)
            .await
            .map_err(|e| DeployError::Submission {
                reason: e.to_string(),
            })?;

        let tx_hash = pending.tx_hash();
        info!(network = %self.chain.name, tx_hash = ?tx_hash, "Deployment transaction sent");

        let receipt = pending
            .confirmations(confirmations)
            .await
            .map_err(|e| DeployError::Submission {
                reason: e.to_string(),
            })?
            .ok_or_else(|| DeployError::Dropped {
                tx_hash: format!("{:?}", tx_hash),
            })?;

        Ok(outcome_from_receipt(
            receipt,
            self.deployer_address(),
            fee_bid,
        )?)
    }
}

pub fn build_creation_tx(
    from: Address,
    init_code: Bytes,
    fee_bid: &FeeBid,
    chain_id: u64,
) -> Eip1559TransactionRequest {
    Eip1559TransactionRequest::new()
        .from(from)
        .data(init_code)
        .chain_id(chain_id)
        .max_fee_per_gas(fee_bid.max_fee_per_gas)
        .max_priority_fee_per_gas(fee_bid.max_priority_fee_per_gas)
}

pub fn check_funds(prepared: &PreparedDeployment) -> Result<(), DeployError> {
    if prepared.shortfall().is_some() {
        return Err(DeployError::InsufficientFunds {
            have: prepared.balance.to_string(),
            want: prepared.max_cost().to_string(),
        });
    }
    Ok(())
}

pub fn outcome_from_receipt(
    receipt: TransactionReceipt,
    deployer: Address,
    fee_bid: FeeBid,
) -> Result<DeployOutcome, DeployError> {
    let tx_hash = receipt.transaction_hash;

    if receipt.status.is_some_and(|status| status.is_zero()) {
        return Err(DeployError::Reverted {
            tx_hash: format!("{:?}", tx_hash),
        });
    }

    let address = receipt
        .contract_address
        .ok_or_else(|| DeployError::MissingContractAddress {
            tx_hash: format!("{:?}", tx_hash),
        })?;

    Ok(DeployOutcome {
        address,
        tx_hash,
        block_number: receipt.block_number.map(|n| n.as_u64()),
        gas_used: receipt.gas_used,
        deployer,
        fee_bid,
    })
}

/// Builds the signer and checks it against the address stored with the account.
pub fn signer_from_key(private_key: &str, expected_address: &str) -> Result<LocalWallet, CoreError> {
    let wallet = private_key
        .parse::<LocalWallet>()
        .map_err(|_| WalletError::InvalidKeyFormat)?;

    if !expected_address.is_empty() {
        let expected = expected_address
            .parse::<Address>()
            .map_err(|_| WalletError::AddressMismatch {
                expected: expected_address.to_string(),
                actual: to_checksum(&wallet.address(), None),
            })?;
        if expected != wallet.address() {
            return Err(WalletError::AddressMismatch {
                expected: expected_address.to_string(),
                actual: to_checksum(&wallet.address(), None),
            }
            .into());
        }
    }

    Ok(wallet)
}
