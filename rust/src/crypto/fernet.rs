//! Fernet tokens: AES-128-CBC with PKCS#7 padding, authenticated by
//! HMAC-SHA256. This is the format the Dart client decrypts at runtime.
//!
//! Token layout before URL-safe base64 encoding:
//! `0x80 | timestamp (u64 BE) | iv (16) | ciphertext | hmac (32)`.

use std::time::{SystemTime, UNIX_EPOCH};

use aes::Aes128;
use base64::{engine::general_purpose::URL_SAFE, Engine};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use super::integrity::{hmac_sha256, verify_hmac_sha256, HMAC_LEN};
use super::{CipherError, EncryptionKey, LeafCipher, Scheme, KEY_LEN};

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

const VERSION: u8 = 0x80;
const IV_LEN: usize = 16;
const BLOCK_LEN: usize = 16;
const HEADER_LEN: usize = 1 + 8 + IV_LEN;

pub struct FernetCipher {
    signing_key: [u8; KEY_LEN / 2],
    encryption_key: [u8; KEY_LEN / 2],
}

impl FernetCipher {
    /// Splits the key: the first half signs, the second half encrypts.
    pub fn new(key: &EncryptionKey) -> Self {
        let bytes = key.as_bytes();
        let mut signing_key = [0u8; KEY_LEN / 2];
        let mut encryption_key = [0u8; KEY_LEN / 2];
        signing_key.copy_from_slice(&bytes[..KEY_LEN / 2]);
        encryption_key.copy_from_slice(&bytes[KEY_LEN / 2..]);
        Self {
            signing_key,
            encryption_key,
        }
    }

    fn seal_at(&self, plaintext: &[u8], timestamp: u64, iv: &[u8; IV_LEN]) -> Result<String, CipherError> {
        let ciphertext = Aes128CbcEnc::new_from_slices(&self.encryption_key, iv)
            .map_err(|e| CipherError::EncryptionFailed(format!("{e}")))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        let mut token = Vec::with_capacity(HEADER_LEN + ciphertext.len() + HMAC_LEN);
        token.push(VERSION);
        token.extend_from_slice(&timestamp.to_be_bytes());
        token.extend_from_slice(iv);
        token.extend_from_slice(&ciphertext);

        let tag = hmac_sha256(&self.signing_key, &token)?;
        token.extend_from_slice(&tag);
        Ok(URL_SAFE.encode(token))
    }
}

impl LeafCipher for FernetCipher {
    fn scheme(&self) -> Scheme {
        Scheme::Fernet
    }

    fn seal(&self, plaintext: &[u8]) -> Result<String, CipherError> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| CipherError::Clock(format!("{e}")))?
            .as_secs();
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);
        self.seal_at(plaintext, timestamp, &iv)
    }

    fn open(&self, token: &str) -> Result<Vec<u8>, CipherError> {
        let raw = URL_SAFE
            .decode(token.as_bytes())
            .map_err(|e| CipherError::Base64DecodeFailed(format!("{e}")))?;

        if raw.len() < HEADER_LEN + BLOCK_LEN + HMAC_LEN {
            return Err(CipherError::MalformedToken("token too short".to_string()));
        }
        if raw[0] != VERSION {
            return Err(CipherError::MalformedToken(format!(
                "unknown version byte {:#04x}",
                raw[0]
            )));
        }
        let (signed, tag) = raw.split_at(raw.len() - HMAC_LEN);
        let ciphertext = &signed[HEADER_LEN..];
        if ciphertext.len() % BLOCK_LEN != 0 {
            return Err(CipherError::MalformedToken(
                "ciphertext is not block aligned".to_string(),
            ));
        }

        verify_hmac_sha256(&self.signing_key, signed, tag)?;

        let iv = &signed[1 + 8..HEADER_LEN];
        Aes128CbcDec::new_from_slices(&self.encryption_key, iv)
            .map_err(|e| CipherError::DecryptionFailed(format!("{e}")))?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|e| CipherError::DecryptionFailed(format!("{e}")))
    }
}

impl Drop for FernetCipher {
    fn drop(&mut self) {
        self.signing_key.zeroize();
        self.encryption_key.zeroize();
    }
}
