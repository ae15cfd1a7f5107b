use chrono::Utc;
use core_logic::DeployError;
use ethers::types::{Address, TxHash};
use ethers::utils::to_checksum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::DeployOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub address: String,
    pub tx_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    pub chain_id: u64,
    pub deployer: String,
    pub deployed_at: String,
}

impl DeploymentRecord {
    pub fn new(
        address: Address,
        tx_hash: TxHash,
        block_number: Option<u64>,
        chain_id: u64,
        deployer: Address,
    ) -> Self {
        Self {
            address: to_checksum(&address, None),
            tx_hash: format!("{:?}", tx_hash),
            block_number,
            chain_id,
            deployer: to_checksum(&deployer, None),
            deployed_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn from_outcome(outcome: &DeployOutcome, chain_id: u64) -> Self {
        Self::new(
            outcome.address,
            outcome.tx_hash,
            outcome.block_number,
            chain_id,
            outcome.deployer,
        )
    }
}

/// Deployment log keyed by network, oldest first.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DeploymentHistory {
    #[serde(default)]
    pub deployments: BTreeMap<String, Vec<DeploymentRecord>>,
}

impl DeploymentHistory {
    /// A missing file is an empty history.
    pub fn load(path: &Path) -> Result<Self, DeployError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| record_error(path, e.to_string()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content).map_err(|e| record_error(path, e.to_string()))
    }

    pub fn record(&mut self, network: &str, record: DeploymentRecord) {
        self.deployments
            .entry(network.to_string())
            .or_default()
            .push(record);
    }

    pub fn latest(&self, network: &str) -> Option<&DeploymentRecord> {
        self.deployments.get(network).and_then(|records| records.last())
    }

    pub fn save(&self, path: &Path) -> Result<(), DeployError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| record_error(path, e.to_string()))?;
        }
        let json =
            serde_json::to_string_pretty(self).map_err(|e| record_error(path, e.to_string()))?;
        fs::write(path, json).map_err(|e| record_error(path, e.to_string()))
    }
}

pub fn append_deployment(
    path: &Path,
    network: &str,
    record: DeploymentRecord,
) -> Result<(), DeployError> {
    let mut history = DeploymentHistory::load(path)?;
    history.record(network, record);
    history.save(path)
}

fn record_error(path: &Path, msg: String) -> DeployError {
    DeployError::Record {
        path: path.display().to_string(),
        msg,
    }
}
