use crate::error::{ConfigError, CoreError, SecurityError, WalletError};
use crate::security::{EncryptedComponents, SecurityUtils};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct DecryptedWallet {
    #[serde(default)]
    pub mnemonic: String,
    #[serde(default)]
    pub evm_private_key: String,
    #[serde(default)]
    pub evm_address: String,
}

impl fmt::Debug for DecryptedWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptedWallet")
            .field("evm_address", &self.evm_address)
            .field("mnemonic", &"***REDACTED***")
            .field("evm_private_key", &"***REDACTED***")
            .finish()
    }
}

/// On-disk account file. Either `encrypted` or the plaintext key is present.
#[derive(Serialize, Deserialize)]
struct AccountFile {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    encrypted: Option<EncryptedComponents>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    evm_private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    evm_address: Option<String>,
}

impl AccountFile {
    fn address(&self) -> &str {
        if !self.address.is_empty() {
            &self.address
        } else {
            self.evm_address.as_deref().unwrap_or("")
        }
    }
}

/// Named local signing accounts stored as `<alias>.json`.
pub struct WalletManager {
    dir: PathBuf,
    cache: Mutex<HashMap<String, Arc<DecryptedWallet>>>,
}

impl WalletManager {
    pub const WALLETS_DIR: &'static str = "wallet-json";
    const EXTENSION: &'static str = "json";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Try current dir first, then workspace root (../../)
    pub fn discover() -> Self {
        let candidates = [
            PathBuf::from(Self::WALLETS_DIR),
            PathBuf::from("../..").join(Self::WALLETS_DIR),
        ];

        let dir = candidates
            .iter()
            .find(|p| p.is_dir())
            .cloned()
            .unwrap_or_else(|| candidates[0].clone());

        debug!(dir = %dir.display(), "Using wallet directory");
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn account_path(&self, alias: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", alias, Self::EXTENSION))
    }

    /// List `(alias, address)` pairs without decrypting
    pub fn list_accounts(&self) -> Result<Vec<(String, String)>, CoreError> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries: Vec<PathBuf> = fs::read_dir(&self.dir)
            .map_err(|e| io_error(&self.dir, e))?
            .filter_map(|res| res.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == Self::EXTENSION))
            .collect();
        entries.sort();

        let mut accounts = Vec::with_capacity(entries.len());
        for path in entries {
            let Some(alias) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let file = Self::read_account_file(&path)?;
            accounts.push((alias.to_string(), file.address().to_string()));
        }

        Ok(accounts)
    }

    /// Whether loading `alias` needs a password
    pub fn is_encrypted(&self, alias: &str) -> Result<bool, CoreError> {
        validate_alias(alias)?;
        let path = self.existing_account_path(alias)?;
        Ok(Self::read_account_file(&path)?.encrypted.is_some())
    }

    /// Get a decrypted account by alias. Decrypts if not cached.
    /// Returns Arc<DecryptedWallet> to avoid cloning sensitive data.
    pub async fn load(
        &self,
        alias: &str,
        password: Option<&str>,
    ) -> Result<Arc<DecryptedWallet>, CoreError> {
        validate_alias(alias)?;

        {
            let cache = self.cache.lock().await;
            if let Some(wallet) = cache.get(alias) {
                return Ok(Arc::clone(wallet));
            }
        }

        let path = self.existing_account_path(alias)?;
        let wallet = Arc::new(Self::open_account_file(&path, password)?);
        normalize_private_key(&wallet.evm_private_key)?;
        info!(alias, address = %wallet.evm_address, "Loaded local account");

        {
            let mut cache = self.cache.lock().await;
            cache.insert(alias.to_string(), Arc::clone(&wallet));
        }

        Ok(wallet)
    }

    /// Raw private key from an environment variable
    pub fn load_from_env(key: &str) -> Result<DecryptedWallet, CoreError> {
        let raw = std::env::var(key).map_err(|_| WalletError::EnvKeyMissing {
            key: key.to_string(),
        })?;
        let evm_private_key = normalize_private_key(&raw)?;

        Ok(DecryptedWallet {
            mnemonic: String::new(),
            evm_private_key,
            evm_address: String::new(),
        })
    }

    /// Encrypts `private_key` into a new `<alias>.json`. Never overwrites.
    pub fn import(
        &self,
        alias: &str,
        private_key: &str,
        address: &str,
        password: &str,
    ) -> Result<PathBuf, CoreError> {
        validate_alias(alias)?;
        if password.is_empty() {
            return Err(SecurityError::PasswordRequired.into());
        }

        let path = self.account_path(alias);
        if path.exists() {
            return Err(WalletError::AlreadyExists {
                alias: alias.to_string(),
            }
            .into());
        }

        let wallet = DecryptedWallet {
            mnemonic: String::new(),
            evm_private_key: normalize_private_key(private_key)?,
            evm_address: address.to_string(),
        };
        let mut plaintext = serde_json::to_string(&wallet).map_err(|_| WalletError::Malformed {
            path: path.display().to_string(),
        })?;
        let encrypted = SecurityUtils::encrypt_components(&plaintext, password);
        plaintext.zeroize();

        let file = AccountFile {
            address: address.to_string(),
            encrypted: Some(encrypted?),
            evm_private_key: None,
            evm_address: None,
        };
        let json = serde_json::to_string_pretty(&file).map_err(|_| WalletError::Malformed {
            path: path.display().to_string(),
        })?;

        fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;
        fs::write(&path, json).map_err(|e| io_error(&path, e))?;
        info!(alias, address, path = %path.display(), "Imported account");

        Ok(path)
    }

    fn existing_account_path(&self, alias: &str) -> Result<PathBuf, CoreError> {
        let path = self.account_path(alias);
        if !path.is_file() {
            return Err(WalletError::NotFound {
                alias: alias.to_string(),
            }
            .into());
        }
        Ok(path)
    }

    fn read_account_file(path: &Path) -> Result<AccountFile, CoreError> {
        let content = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        serde_json::from_str(&content).map_err(|_| {
            WalletError::Malformed {
                path: path.display().to_string(),
            }
            .into()
        })
    }

    fn open_account_file(path: &Path, password: Option<&str>) -> Result<DecryptedWallet, CoreError> {
        let mut file = Self::read_account_file(path)?;

        if let Some(encrypted) = &file.encrypted {
            let pass = password.ok_or(SecurityError::PasswordRequired)?;
            let mut decrypted = SecurityUtils::decrypt_components(encrypted, pass).map_err(|e| {
                WalletError::DecryptionFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
            })?;
            let parsed = serde_json::from_str::<DecryptedWallet>(&decrypted);
            decrypted.zeroize();

            let mut wallet = parsed.map_err(|_| WalletError::Malformed {
                path: path.display().to_string(),
            })?;
            if wallet.evm_address.is_empty() {
                wallet.evm_address = file.address.clone();
            }
            return Ok(wallet);
        }

        if let Some(key) = file.evm_private_key.take() {
            return Ok(DecryptedWallet {
                mnemonic: String::new(),
                evm_private_key: key,
                evm_address: file.address().to_string(),
            });
        }

        Err(WalletError::Malformed {
            path: path.display().to_string(),
        }
        .into())
    }
}

/// Validates a hex private key and returns it without the `0x` prefix.
pub fn normalize_private_key(key: &str) -> Result<String, WalletError> {
    let trimmed = key.trim();
    let hex_part = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WalletError::InvalidKeyFormat);
    }
    if hex_part.len() != 64 {
        return Err(WalletError::InvalidKeyLength {
            length: hex_part.len(),
        });
    }

    Ok(hex_part.to_ascii_lowercase())
}

fn validate_alias(alias: &str) -> Result<(), ConfigError> {
    let valid = !alias.is_empty()
        && alias
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
        && !alias.starts_with('.');

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field: "account".to_string(),
            reason: format!("'{}' is not a valid account alias", alias),
        })
    }
}

fn io_error(path: &Path, e: std::io::Error) -> CoreError {
    ConfigError::IoError {
        path: path.display().to_string(),
        msg: e.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[test]
    fn test_normalize_private_key() {
        let key = normalize_private_key(KEY).unwrap();
        assert_eq!(key.len(), 64);
        assert!(!key.starts_with("0x"));

        assert!(matches!(
            normalize_private_key("0x1234"),
            Err(WalletError::InvalidKeyLength { length: 4 })
        ));
        assert!(matches!(
            normalize_private_key("not-a-key"),
            Err(WalletError::InvalidKeyFormat)
        ));
    }

    #[test]
    fn test_alias_rejects_paths() {
        assert!(validate_alias("deployer_account").is_ok());
        assert!(validate_alias("../etc/passwd").is_err());
        assert!(validate_alias("").is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let wallet = DecryptedWallet {
            mnemonic: "seed words".to_string(),
            evm_private_key: KEY.to_string(),
            evm_address: "0xabc".to_string(),
        };
        let dbg = format!("{:?}", wallet);
        assert!(!dbg.contains("seed words"));
        assert!(!dbg.contains("4c0883a6"));
        assert!(dbg.contains("0xabc"));
    }
}
