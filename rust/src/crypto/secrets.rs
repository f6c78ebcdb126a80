//! Authenticated leaf vault built on ChaCha20-Poly1305.
//! Each token packs nonce + ciphertext + auth tag into one base64 string so it
//! can replace a configuration value in place.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::rngs::OsRng;
use zeroize::Zeroize;

use super::{CipherError, EncryptionKey, LeafCipher, Scheme};

const NONCE_SIZE: usize = 12;
const TAG_SIZE: usize = 16;

/// Holds the symmetric key used to seal configuration leaves.
pub struct SecretVault {
    key: Key,
}

impl SecretVault {
    pub fn new(key: &EncryptionKey) -> Self {
        let mut vault_key = Key::default();
        vault_key.copy_from_slice(key.as_bytes());
        Self { key: vault_key }
    }
}

impl LeafCipher for SecretVault {
    fn scheme(&self) -> Scheme {
        Scheme::ChaCha20Poly1305
    }

    fn seal(&self, plaintext: &[u8]) -> Result<String, CipherError> {
        let cipher = ChaCha20Poly1305::new(&self.key);
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);

        let ciphertext_and_tag = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| CipherError::EncryptionFailed(format!("{e}")))?;
        if ciphertext_and_tag.len() < TAG_SIZE {
            return Err(CipherError::EncryptionFailed(
                "ciphertext shorter than authentication tag".to_string(),
            ));
        }

        let mut packed = Vec::with_capacity(NONCE_SIZE + ciphertext_and_tag.len());
        packed.extend_from_slice(&nonce);
        packed.extend_from_slice(&ciphertext_and_tag);
        Ok(STANDARD_NO_PAD.encode(packed))
    }

    fn open(&self, token: &str) -> Result<Vec<u8>, CipherError> {
        let packed = STANDARD_NO_PAD
            .decode(token.as_bytes())
            .map_err(|e| CipherError::Base64DecodeFailed(format!("{e}")))?;
        if packed.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CipherError::MalformedToken("token too short".to_string()));
        }
        let (nonce_bytes, ciphertext_and_tag) = packed.split_at(NONCE_SIZE);

        let cipher = ChaCha20Poly1305::new(&self.key);
        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext_and_tag)
            .map_err(|e| CipherError::DecryptionFailed(format!("{e}")))
    }
}

impl Drop for SecretVault {
    fn drop(&mut self) {
        // Zero the key material on drop to reduce its lifetime in memory.
        self.key.as_mut_slice().zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::SecretVault;
    use crate::crypto::{EncryptionKey, LeafCipher};
    use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};

    fn vault(byte: u8) -> SecretVault {
        SecretVault::new(&EncryptionKey::from_bytes(&[byte; 32]).expect("key should be valid"))
    }

    #[test]
    fn encrypts_and_decrypts_round_trip() {
        let vault = vault(42);
        let token = vault.seal(b"secret-token").expect("encryption should succeed");
        let plaintext = vault.open(&token).expect("decryption should succeed");
        assert_eq!(plaintext, b"secret-token");
    }

    #[test]
    fn packs_nonce_and_tag_into_the_token() {
        let token = vault(5).seal(b"abc").expect("encryption should succeed");
        let packed = STANDARD_NO_PAD.decode(&token).expect("valid base64");
        assert_eq!(packed.len(), 12 + 3 + 16);
    }

    #[test]
    fn handles_invalid_ciphertext() {
        let bogus = STANDARD_NO_PAD.encode([0u8; 12 + 5 + 16]);
        let err = vault(7).open(&bogus).unwrap_err();
        assert!(format!("{err}").contains("decryption failed"));
    }

    #[test]
    fn rejects_truncated_tokens() {
        let err = vault(7).open(&STANDARD_NO_PAD.encode([0u8; 10])).unwrap_err();
        assert!(format!("{err}").contains("too short"));
    }
}
