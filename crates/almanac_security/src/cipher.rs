//! AES-256-GCM sealing of OAuth tokens for storage at rest.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use almanac_core::GoogleToken;
use almanac_error::{CryptoError, CryptoErrorKind};
use base64::engine::general_purpose::{STANDARD as BASE64, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::{Deserialize, Serialize};

/// The serializable envelope stored in the `token_ciphertext` column,
/// base64-encoded as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedToken {
    /// Per-message 96-bit nonce
    pub nonce: Vec<u8>,
    /// AES-GCM ciphertext with appended auth tag
    pub ciphertext: Vec<u8>,
    /// Cipher identifier, rejected on mismatch
    pub algorithm: String,
}

const ALGORITHM: &str = "AES-256-GCM";

/// Seals and opens [`GoogleToken`] values with a single symmetric key.
///
/// The key comes from the `TOKEN_KEY` environment variable as 32 base64
/// bytes; [`TokenCipher::generate_key`] mints one for initial deployment.
pub struct TokenCipher {
    key: [u8; 32],
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCipher")
            .field("key", &"[REDACTED]")
            .field("fingerprint", &self.key_fingerprint())
            .finish()
    }
}

impl TokenCipher {
    /// Create a cipher from a raw 32-byte key.
    pub fn new(key: [u8; 32]) -> Self {
        // new_from_slice cannot fail for a 32-byte key
        let cipher = Aes256Gcm::new(&key.into());
        Self { key, cipher }
    }

    /// Create a cipher from a base64-encoded 32-byte key, the form carried
    /// in configuration. Accepts standard or url-safe alphabets.
    pub fn from_base64_key(encoded: &str) -> Result<Self, CryptoError> {
        let decoded = BASE64
            .decode(encoded.trim())
            .or_else(|_| URL_SAFE_NO_PAD.decode(encoded.trim()))
            .map_err(|e| {
                CryptoError::new(CryptoErrorKind::InvalidKey(format!("not base64: {e}")))
            })?;
        let key: [u8; 32] = decoded.try_into().map_err(|v: Vec<u8>| {
            CryptoError::new(CryptoErrorKind::InvalidKey(format!(
                "expected 32 bytes, got {}",
                v.len()
            )))
        })?;
        Ok(Self::new(key))
    }

    /// Generate a fresh random key, base64-encoded for configuration.
    pub fn generate_key() -> String {
        let key = Aes256Gcm::generate_key(OsRng);
        BASE64.encode(key)
    }

    /// Encrypt a token into the base64 envelope stored in the database.
    pub fn seal_token(&self, token: &GoogleToken) -> Result<String, CryptoError> {
        let plaintext = serde_json::to_vec(token).map_err(|e| {
            CryptoError::new(CryptoErrorKind::Encrypt(format!("serialize: {e}")))
        })?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_ref())
            .map_err(|e| CryptoError::new(CryptoErrorKind::Encrypt(e.to_string())))?;
        let sealed = SealedToken {
            nonce: nonce.to_vec(),
            ciphertext,
            algorithm: ALGORITHM.to_string(),
        };
        let serialized = serde_json::to_vec(&sealed).map_err(|e| {
            CryptoError::new(CryptoErrorKind::Encrypt(format!("envelope: {e}")))
        })?;
        Ok(BASE64.encode(serialized))
    }

    /// Decrypt a stored envelope back into a token.
    pub fn open_token(&self, encoded: &str) -> Result<GoogleToken, CryptoError> {
        let decoded = BASE64
            .decode(encoded)
            .map_err(|e| CryptoError::new(CryptoErrorKind::Envelope(e.to_string())))?;
        let sealed: SealedToken = serde_json::from_slice(&decoded)
            .map_err(|e| CryptoError::new(CryptoErrorKind::Envelope(e.to_string())))?;
        if sealed.algorithm != ALGORITHM {
            return Err(CryptoError::new(CryptoErrorKind::Envelope(format!(
                "unsupported algorithm: {}",
                sealed.algorithm
            ))));
        }
        let nonce: [u8; 12] = sealed.nonce.as_slice().try_into().map_err(|_| {
            CryptoError::new(CryptoErrorKind::Envelope(format!(
                "nonce must be 12 bytes, got {}",
                sealed.nonce.len()
            )))
        })?;
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&nonce), sealed.ciphertext.as_ref())
            .map_err(|e| CryptoError::new(CryptoErrorKind::Decrypt(e.to_string())))?;
        serde_json::from_slice(&plaintext)
            .map_err(|e| CryptoError::new(CryptoErrorKind::Decrypt(format!("deserialize: {e}"))))
    }

    /// Short key fingerprint, safe to log when diagnosing key mismatches.
    pub fn key_fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let digest = Sha256::digest(self.key);
        BASE64.encode(&digest[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> TokenCipher {
        TokenCipher::from_base64_key(&TokenCipher::generate_key()).unwrap()
    }

    fn token() -> GoogleToken {
        GoogleToken {
            access_token: "ya29.test-access".into(),
            refresh_token: Some("1//refresh".into()),
            expires_at: Some(1_750_000_000),
        }
    }

    #[test]
    fn seal_and_open_round_trip() {
        let cipher = cipher();
        let sealed = cipher.seal_token(&token()).unwrap();
        assert_ne!(sealed, "ya29.test-access");
        assert_eq!(cipher.open_token(&sealed).unwrap(), token());
    }

    #[test]
    fn wrong_key_fails_to_open() {
        let sealed = cipher().seal_token(&token()).unwrap();
        let err = cipher().open_token(&sealed).unwrap_err();
        assert!(matches!(err.kind, CryptoErrorKind::Decrypt(_)));
    }

    #[test]
    fn short_key_is_rejected() {
        let short = BASE64.encode([0u8; 16]);
        let err = TokenCipher::from_base64_key(&short).unwrap_err();
        assert!(matches!(err.kind, CryptoErrorKind::InvalidKey(_)));
    }

    #[test]
    fn garbage_envelope_is_rejected() {
        let err = cipher().open_token("not base64 at all!!!").unwrap_err();
        assert!(matches!(err.kind, CryptoErrorKind::Envelope(_)));
    }

    #[test]
    fn fingerprints_differ_across_keys() {
        assert_ne!(cipher().key_fingerprint(), cipher().key_fingerprint());
    }
}
