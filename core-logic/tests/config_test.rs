use core_logic::config::{ChainConfig, WalletSource};
use core_logic::{ConfigError, GasConfig};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct GasSection {
    gas: GasConfig,
}

fn chain(rpc: &str, chain_id: u64) -> ChainConfig {
    ChainConfig {
        name: "arbitrum".to_string(),
        rpc_endpoint: rpc.to_string(),
        chain_id,
    }
}

#[test]
fn test_chain_config_accepts_http() {
    assert!(chain("https://arb1.arbitrum.io/rpc", 42161).validate().is_ok());
    assert!(chain("http://127.0.0.1:8545", 31337).validate().is_ok());
}

#[test]
fn test_chain_config_rejects_websocket() {
    for url in ["wss://arb1.arbitrum.io/ws", "ws://127.0.0.1:8546"] {
        assert!(matches!(
            chain(url, 42161).validate(),
            Err(ConfigError::InvalidRpcUrl { .. })
        ));
    }
}

#[test]
fn test_chain_config_rejects_bad_url() {
    let err = chain("arb1.arbitrum.io/rpc", 42161).validate().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRpcUrl { .. }));
}

#[test]
fn test_chain_config_rejects_zero_chain_id() {
    let err = chain("https://arb1.arbitrum.io/rpc", 0)
        .validate()
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn test_chain_config_rejects_empty_name() {
    let mut config = chain("https://arb1.arbitrum.io/rpc", 42161);
    config.name = "  ".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingField { .. })
    ));
}

#[test]
fn test_gas_config_deserialize_defaults() {
    let parsed: GasSection = serde_json::from_str(r#"{ "gas": {} }"#).unwrap();
    assert_eq!(parsed.gas, GasConfig::default());
}

#[test]
fn test_gas_config_deserialize_override() {
    let parsed: GasSection =
        serde_json::from_str(r#"{ "gas": { "fee_multiplier": 1.5 } }"#).unwrap();
    assert_eq!(parsed.gas.fee_multiplier, 1.5);
}

#[test]
fn test_wallet_source_serde() {
    let source = WalletSource::Keystore {
        alias: "deployer_account".to_string(),
    };
    let json = serde_json::to_string(&source).unwrap();
    let back: WalletSource = serde_json::from_str(&json).unwrap();
    assert_eq!(back, source);
}
