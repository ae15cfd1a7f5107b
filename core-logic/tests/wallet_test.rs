use core_logic::{CoreError, SecurityError, WalletError, WalletManager};
use std::fs;

const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
const ADDRESS: &str = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23";

#[tokio::test]
async fn test_import_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let manager = WalletManager::new(dir.path());

    let path = manager
        .import("deployer_account", KEY, ADDRESS, "correct horse")
        .unwrap();
    assert!(path.ends_with("deployer_account.json"));

    // File must not contain the key in clear
    let raw = fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("4c0883a691"));
    assert!(manager.is_encrypted("deployer_account").unwrap());

    let wallet = manager
        .load("deployer_account", Some("correct horse"))
        .await
        .unwrap();
    assert_eq!(wallet.evm_private_key, KEY.trim_start_matches("0x"));
    assert_eq!(wallet.evm_address, ADDRESS);
}

#[tokio::test]
async fn test_load_encrypted_without_password() {
    let dir = tempfile::tempdir().unwrap();
    let manager = WalletManager::new(dir.path());
    manager.import("ops", KEY, ADDRESS, "pw").unwrap();

    let result = manager.load("ops", None).await;
    assert!(matches!(
        result,
        Err(CoreError::Security(SecurityError::PasswordRequired))
    ));
}

#[tokio::test]
async fn test_load_wrong_password() {
    let dir = tempfile::tempdir().unwrap();
    let manager = WalletManager::new(dir.path());
    manager.import("ops", KEY, ADDRESS, "pw").unwrap();

    let result = manager.load("ops", Some("nope")).await;
    assert!(matches!(
        result,
        Err(CoreError::Wallet(WalletError::DecryptionFailed { .. }))
    ));
}

#[tokio::test]
async fn test_load_plaintext_account() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("local.json"),
        format!(r#"{{ "evm_private_key": "{}", "evm_address": "{}" }}"#, KEY, ADDRESS),
    )
    .unwrap();

    let manager = WalletManager::new(dir.path());
    assert!(!manager.is_encrypted("local").unwrap());

    let wallet = manager.load("local", None).await.unwrap();
    assert_eq!(wallet.evm_address, ADDRESS);
}

#[tokio::test]
async fn test_missing_account() {
    let dir = tempfile::tempdir().unwrap();
    let manager = WalletManager::new(dir.path());

    let result = manager.load("ghost", None).await;
    assert!(matches!(
        result,
        Err(CoreError::Wallet(WalletError::NotFound { .. }))
    ));
}

#[test]
fn test_import_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let manager = WalletManager::new(dir.path());
    manager.import("ops", KEY, ADDRESS, "pw").unwrap();

    let result = manager.import("ops", KEY, ADDRESS, "pw");
    assert!(matches!(
        result,
        Err(CoreError::Wallet(WalletError::AlreadyExists { .. }))
    ));
}

#[test]
fn test_list_accounts_reads_addresses() {
    let dir = tempfile::tempdir().unwrap();
    let manager = WalletManager::new(dir.path());
    manager.import("b_second", KEY, ADDRESS, "pw").unwrap();
    manager.import("a_first", KEY, "0xdead", "pw").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let accounts = manager.list_accounts().unwrap();
    assert_eq!(
        accounts,
        vec![
            ("a_first".to_string(), "0xdead".to_string()),
            ("b_second".to_string(), ADDRESS.to_string()),
        ]
    );
}

#[test]
fn test_list_accounts_missing_dir_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let manager = WalletManager::new(dir.path().join("absent"));
    assert!(manager.list_accounts().unwrap().is_empty());
}

#[test]
fn test_load_from_env() {
    std::env::set_var("CORE_LOGIC_TEST_DEPLOYER_KEY", KEY);
    let wallet = WalletManager::load_from_env("CORE_LOGIC_TEST_DEPLOYER_KEY").unwrap();
    assert_eq!(wallet.evm_private_key.len(), 64);

    let missing = WalletManager::load_from_env("CORE_LOGIC_TEST_UNSET_KEY");
    assert!(matches!(
        missing,
        Err(CoreError::Wallet(WalletError::EnvKeyMissing { .. }))
    ));
}
