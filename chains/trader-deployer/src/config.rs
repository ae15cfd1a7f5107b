use anyhow::Result;
use config::{Config, Environment, File, FileFormat};
use core_logic::{ChainConfig, ConfigError, GasConfig, WalletManager, WalletSource};
use ethers::types::{Address, U256};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::contracts::TraderArgs;

/// Prefix of environment overrides, e.g. `TRADER__NETWORKS__BSC__RPC_URL`
pub const ENV_PREFIX: &str = "TRADER";

/// Short names accepted for `--network`
const NETWORK_ALIASES: [(&str, &str); 4] = [
    ("eth", "ethereum"),
    ("mainnet", "ethereum"),
    ("arb", "arbitrum"),
    ("op", "optimism"),
];

#[derive(Debug, Deserialize, Clone)]
pub struct DeployerConfig {
    /// Local account alias used when `key_env` is not set
    #[serde(default = "default_account")]
    pub account: String,
    /// Environment variable holding a raw private key
    #[serde(default)]
    pub key_env: Option<String>,
    #[serde(default)]
    pub wallet_dir: Option<String>,
    #[serde(default = "default_artifact")]
    pub artifact: String,
    #[serde(default = "default_deployments_file")]
    pub deployments_file: String,
    #[serde(default = "default_confirmations")]
    pub confirmations: usize,
    #[serde(default)]
    pub gas: GasConfig,
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,
}

/// Per-network constructor constants. Fees are in wei.
#[derive(Debug, Deserialize, Clone)]
pub struct NetworkConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub compass: String,
    pub fee_collector: String,
    pub refund_wallet: String,
    #[serde(deserialize_with = "deserialize_wei")]
    pub service_fee: u128,
    #[serde(deserialize_with = "deserialize_wei")]
    pub gas_fee: u128,
}

fn default_account() -> String {
    "deployer_account".to_string()
}

fn default_artifact() -> String {
    "artifacts/trader.json".to_string()
}

fn default_deployments_file() -> String {
    "deployments.json".to_string()
}

fn default_confirmations() -> usize {
    1
}

/// Wei amounts may be written as integers or decimal strings.
fn deserialize_wei<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wei {
        Int(u64),
        Text(String),
    }

    match Wei::deserialize(deserializer)? {
        Wei::Int(v) => Ok(u128::from(v)),
        Wei::Text(s) => s
            .trim()
            .replace('_', "")
            .parse::<u128>()
            .map_err(serde::de::Error::custom),
    }
}

impl DeployerConfig {
    pub fn load(path: &str) -> Result<Self> {
        Self::build(Config::builder().add_source(File::with_name(path)))
    }

    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Self::build(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    fn build(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize().map_err(|e| anyhow::anyhow!(e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gas.validate()?;
        if self.networks.is_empty() {
            return Err(ConfigError::MissingField {
                field: "networks".to_string(),
            });
        }
        for (name, network) in &self.networks {
            network.chain_config(name).validate()?;
            network.constructor_args(name)?;
        }
        Ok(())
    }

    /// Looks up a network by name or alias, case-insensitively.
    pub fn network(&self, name: &str) -> Result<(&str, &NetworkConfig), ConfigError> {
        let lowered = name.trim().to_ascii_lowercase();
        let canonical = NETWORK_ALIASES
            .iter()
            .find(|(alias, _)| *alias == lowered)
            .map(|(_, target)| target.to_string())
            .unwrap_or(lowered);

        self.networks
            .get_key_value(&canonical)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::UnknownNetwork {
                name: name.to_string(),
                available: self.network_names().join(", "),
            })
    }

    pub fn network_names(&self) -> Vec<&str> {
        self.networks.keys().map(String::as_str).collect()
    }

    /// `key_env` wins over the keystore alias; `account_override` replaces the alias.
    pub fn wallet_source(&self, account_override: Option<&str>) -> WalletSource {
        match (&self.key_env, account_override) {
            (_, Some(alias)) => WalletSource::Keystore {
                alias: alias.to_string(),
            },
            (Some(key), None) => WalletSource::Env { key: key.clone() },
            (None, None) => WalletSource::Keystore {
                alias: self.account.clone(),
            },
        }
    }

    pub fn wallet_manager(&self) -> WalletManager {
        match &self.wallet_dir {
            Some(dir) => WalletManager::new(dir),
            None => WalletManager::discover(),
        }
    }
}

impl NetworkConfig {
    pub fn chain_config(&self, name: &str) -> ChainConfig {
        ChainConfig {
            name: name.to_string(),
            rpc_endpoint: self.rpc_url.clone(),
            chain_id: self.chain_id,
        }
    }

    pub fn constructor_args(&self, name: &str) -> Result<TraderArgs, ConfigError> {
        Ok(TraderArgs {
            compass: parse_address(name, "compass", &self.compass)?,
            refund_wallet: parse_address(name, "refund_wallet", &self.refund_wallet)?,
            gas_fee: U256::from(self.gas_fee),
            fee_collector: parse_address(name, "fee_collector", &self.fee_collector)?,
            service_fee: U256::from(self.service_fee),
        })
    }
}

fn parse_address(network: &str, field: &str, value: &str) -> Result<Address, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        field: format!("networks.{}.{}", network, field),
        reason,
    };

    let trimmed = value.trim();
    if !trimmed.starts_with("0x") || trimmed.len() != 42 {
        return Err(invalid(format!("'{}' is not a 20-byte hex address", value)));
    }

    Address::from_str(trimmed).map_err(|e| invalid(e.to_string()))
}
