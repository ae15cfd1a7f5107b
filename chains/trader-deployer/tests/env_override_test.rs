use trader_deployer::config::DeployerConfig;

// Own test binary: the variables below are process-wide.
const CONFIG: &str = r#"
    [networks.envcheck]
    rpc_url = "https://file.example/rpc"
    chain_id = 42161
    compass = "0x3c1864a873879139C1BD87c7D95c4e475A91d19C"
    fee_collector = "0x9cf40152d7fb47dff8ad199282b002ca312ec818"
    refund_wallet = "0x6dc0A87638CD75Cc700cCdB226c7ab6C054bc70b"
    service_fee = 10000000000000000
    gas_fee = 50000000000000
"#;

#[test]
fn test_environment_overrides_file_values() {
    std::env::set_var(
        "TRADER__NETWORKS__ENVCHECK__RPC_URL",
        "https://override.example/rpc",
    );
    std::env::set_var("TRADER__NETWORKS__ENVCHECK__GAS_FEE", "7000");
    std::env::set_var("TRADER__CONFIRMATIONS", "3");

    let config = DeployerConfig::from_toml_str(CONFIG).unwrap();
    let (_, network) = config.network("envcheck").unwrap();

    assert_eq!(network.rpc_url, "https://override.example/rpc");
    assert_eq!(network.gas_fee, 7_000);
    assert_eq!(config.confirmations, 3);
    // untouched values still come from the file
    assert_eq!(network.chain_id, 42161);
    assert_eq!(network.service_fee, 10_000_000_000_000_000);
}
