use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Where the signing account is loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletSource {
    /// `<alias>.json` inside the local wallet directory
    Keystore { alias: String },
    /// Raw hex private key held in an environment variable
    Env { key: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub name: String,
    pub rpc_endpoint: String,
    pub chain_id: u64,
}

impl ChainConfig {
    /// Deployments go over HTTP JSON-RPC only.
    const URL_SCHEMES: [&'static str; 2] = ["http://", "https://"];

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "name".to_string(),
            });
        }

        if !Self::URL_SCHEMES
            .iter()
            .any(|scheme| self.rpc_endpoint.starts_with(scheme))
        {
            return Err(ConfigError::InvalidRpcUrl {
                url: self.rpc_endpoint.clone(),
            });
        }

        if self.chain_id == 0 {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.chain_id", self.name),
                reason: "chain id must be non-zero".to_string(),
            });
        }

        Ok(())
    }
}
