//! # Core Error Types
//!
//! Centralized error definitions for the core-logic crate.
//! All errors implement `std::error::Error` and `std::fmt::Display`.

use thiserror::Error;

/// Unified error type for core-logic operations.
///
/// This enum wraps all specific error types and provides a unified
/// error interface for the application layer.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Security(#[from] SecurityError),

    #[error(transparent)]
    Deploy(#[from] DeployError),
}

/// Configuration-related errors
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Invalid RPC URL format: '{url}'")]
    InvalidRpcUrl { url: String },

    #[error("Missing required configuration field: '{field}'")]
    MissingField { field: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Unknown network '{name}' (available: {available})")]
    UnknownNetwork { name: String, available: String },

    #[error("Chain ID mismatch for {network}: configured {expected}, node reports {actual}")]
    ChainIdMismatch {
        network: String,
        expected: u64,
        actual: u64,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("I/O error reading {path}: {msg}")]
    IoError { path: String, msg: String },
}

/// Local account errors
#[derive(Error, Debug, Clone)]
pub enum WalletError {
    #[error("Decryption failed for account at '{path}': {reason}")]
    DecryptionFailed { path: String, reason: String },

    #[error("No account named '{alias}'")]
    NotFound { alias: String },

    #[error("An account named '{alias}' already exists")]
    AlreadyExists { alias: String },

    #[error("Invalid private key format: expected hex string")]
    InvalidKeyFormat,

    #[error("Private key has wrong length: expected 64 hex chars, got {length}")]
    InvalidKeyLength { length: usize },

    #[error("Account address mismatch: expected {expected}, got {actual}")]
    AddressMismatch { expected: String, actual: String },

    #[error("Environment variable '{key}' holding the private key is not set")]
    EnvKeyMissing { key: String },

    #[error("Unrecognized account file format in '{path}'")]
    Malformed { path: String },
}

/// Network and RPC-related errors
#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("RPC call {method} to {endpoint} failed: {reason}")]
    Request {
        endpoint: String,
        method: String,
        reason: String,
    },

    #[error("Latest block from {endpoint} carries no base fee (EIP-1559 unsupported?)")]
    MissingBaseFee { endpoint: String },

    #[error("Value of '{field}' does not fit in 128 bits")]
    ValueOverflow { field: String },
}

/// Security-related errors
#[derive(Error, Debug, Clone)]
pub enum SecurityError {
    #[error("Password required but not provided")]
    PasswordRequired,

    #[error("Encryption/decryption failed: {reason}")]
    CryptographyFailed { reason: String },
}

/// Contract deployment errors
#[derive(Error, Debug, Clone)]
pub enum DeployError {
    #[error("Failed to read contract artifact {path}: {msg}")]
    ArtifactRead { path: String, msg: String },

    #[error("Failed to parse contract artifact {path}: {reason}")]
    ArtifactParse { path: String, reason: String },

    #[error("Contract artifact {path} has no deployment bytecode")]
    EmptyBytecode { path: String },

    #[error("Failed to encode constructor arguments: {reason}")]
    ConstructorEncoding { reason: String },

    #[error("Insufficient funds: have {have} wei, want {want} wei")]
    InsufficientFunds { have: String, want: String },

    #[error("Transaction submission failed: {reason}")]
    Submission { reason: String },

    #[error("Transaction {tx_hash} was dropped before being mined")]
    Dropped { tx_hash: String },

    #[error("Deployment transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },

    #[error("Receipt for {tx_hash} has no contract address")]
    MissingContractAddress { tx_hash: String },

    #[error("Failed to record deployment in {path}: {msg}")]
    Record { path: String, msg: String },
}
