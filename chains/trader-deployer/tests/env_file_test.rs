use std::fs;
use tracing::Level;

// Installs the global subscriber, so it lives in its own test binary.
#[test]
fn test_env_file_log_filter_reaches_logger() {
    // an exported RUST_LOG takes precedence over `.env`
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let env_file = dir.path().join(".env");
    fs::write(&env_file, "RUST_LOG=env_file_check=trace\n").unwrap();
    let log_dir = dir.path().join("logs");

    let _guard =
        trader_deployer::init_environment(Some(&env_file), log_dir.to_str().unwrap());

    assert_eq!(std::env::var("RUST_LOG").unwrap(), "env_file_check=trace");
    // neither default filter enables TRACE
    assert!(tracing::enabled!(target: "env_file_check", Level::TRACE));
    assert!(!tracing::enabled!(target: "some_other_target", Level::TRACE));
}
