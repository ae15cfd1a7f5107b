use aes_gcm::{
    aead::{Aead, NewAead}, // NewAead for 0.9/0.4
    Aes256Gcm,
    Nonce,
};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::SecurityError;

const SALT_LEN: usize = 16;
const IV_LEN: usize = 12;
const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Hex-encoded AES-256-GCM output, stored as the `encrypted` block of an
/// account file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedComponents {
    pub ciphertext: String,
    pub iv: String,
    pub salt: String,
    pub tag: String,
}

pub struct SecurityUtils;

impl SecurityUtils {
    pub fn encrypt_components(
        plaintext: &str,
        password: &str,
    ) -> Result<EncryptedComponents, SecurityError> {
        let mut salt = [0u8; SALT_LEN];
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut iv);

        let cipher = Self::cipher(password, &salt)?;
        let mut sealed = cipher
            .encrypt(Nonce::from_slice(&iv), plaintext.as_bytes())
            .map_err(|e| crypto_failed(format!("encryption failed: {}", e)))?;

        // aes-gcm appends the tag to the ciphertext
        let tag = sealed.split_off(sealed.len() - TAG_LEN);

        Ok(EncryptedComponents {
            ciphertext: hex::encode(&sealed),
            iv: hex::encode(iv),
            salt: hex::encode(salt),
            tag: hex::encode(tag),
        })
    }

    pub fn decrypt_components(
        components: &EncryptedComponents,
        password: &str,
    ) -> Result<String, SecurityError> {
        let ciphertext = decode_hex("ciphertext", &components.ciphertext)?;
        let iv = decode_hex("iv", &components.iv)?;
        let salt = decode_hex("salt", &components.salt)?;
        let mut tag = decode_hex("tag", &components.tag)?;

        if iv.len() != IV_LEN {
            return Err(crypto_failed(format!(
                "IV must be {} bytes, got {}",
                IV_LEN,
                iv.len()
            )));
        }
        if tag.len() != TAG_LEN {
            return Err(crypto_failed(format!(
                "tag must be {} bytes, got {}",
                TAG_LEN,
                tag.len()
            )));
        }

        let cipher = Self::cipher(password, &salt)?;

        let mut full_payload = ciphertext;
        full_payload.append(&mut tag);

        let mut plaintext = cipher
            .decrypt(Nonce::from_slice(&iv), full_payload.as_ref())
            .map_err(|_| crypto_failed("wrong password or corrupted data"))?;

        let text = String::from_utf8(plaintext.clone())
            .map_err(|_| crypto_failed("decrypted data is not valid UTF-8"));
        plaintext.zeroize();
        text
    }

    /// Derive the AES key using scrypt (N=16384, r=8, p=1).
    fn cipher(password: &str, salt: &[u8]) -> Result<Aes256Gcm, SecurityError> {
        let params = scrypt::Params::new(14, 8, 1, KEY_LEN)
            .map_err(|e| crypto_failed(format!("invalid scrypt params: {}", e)))?;
        let mut key = [0u8; KEY_LEN];
        scrypt::scrypt(password.as_bytes(), salt, &params, &mut key)
            .map_err(|e| crypto_failed(format!("scrypt failed: {}", e)))?;

        let cipher = Aes256Gcm::new(&key.into());
        key.zeroize();
        Ok(cipher)
    }
}

fn decode_hex(field: &str, value: &str) -> Result<Vec<u8>, SecurityError> {
    hex::decode(value).map_err(|e| crypto_failed(format!("invalid {} hex: {}", field, e)))
}

fn crypto_failed(reason: impl Into<String>) -> SecurityError {
    SecurityError::CryptographyFailed {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrypt_recovers_plaintext() {
        let sealed = SecurityUtils::encrypt_components("secret payload", "hunter2").unwrap();
        assert_eq!(sealed.iv.len(), IV_LEN * 2);
        assert_eq!(sealed.tag.len(), TAG_LEN * 2);

        let opened = SecurityUtils::decrypt_components(&sealed, "hunter2").unwrap();
        assert_eq!(opened, "secret payload");
    }

    #[test]
    fn test_wrong_password_fails() {
        let sealed = SecurityUtils::encrypt_components("secret payload", "hunter2").unwrap();
        let result = SecurityUtils::decrypt_components(&sealed, "hunter3");
        assert!(matches!(
            result,
            Err(SecurityError::CryptographyFailed { .. })
        ));
    }

    #[test]
    fn test_short_iv_is_error_not_panic() {
        let mut sealed = SecurityUtils::encrypt_components("x", "pw").unwrap();
        sealed.iv = "abcd".to_string();
        assert!(SecurityUtils::decrypt_components(&sealed, "pw").is_err());
    }

    #[test]
    fn test_bad_hex_is_error() {
        let mut sealed = SecurityUtils::encrypt_components("x", "pw").unwrap();
        sealed.ciphertext = "zz".to_string();
        assert!(SecurityUtils::decrypt_components(&sealed, "pw").is_err());
    }
}
