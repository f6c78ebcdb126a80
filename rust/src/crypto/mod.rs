//! Leaf encryption for configuration trees. A single `EncryptionKey` seals
//! every leaf of a run; `Scheme` picks the token format the client expects.

pub mod fernet;
pub mod integrity;
pub mod secrets;

use thiserror::Error;
use zeroize::Zeroize;

use self::fernet::FernetCipher;
use self::secrets::SecretVault;

/// Length of every key accepted by the supported schemes.
pub const KEY_LEN: usize = 32;

/// Key material the client application is built with.
const EMBEDDED_KEY: &[u8; KEY_LEN] = b"12312dsf7841dgffd93741gdcxv27492";

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("invalid key length; expected 32 bytes")]
    InvalidKeyLength,
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),
    #[error("base64 decoding failed: {0}")]
    Base64DecodeFailed(String),
    #[error("malformed token: {0}")]
    MalformedToken(String),
    #[error("system clock unusable: {0}")]
    Clock(String),
}

/// Symmetric key shared by every leaf of a run.
pub struct EncryptionKey {
    bytes: [u8; KEY_LEN],
}

impl EncryptionKey {
    /// Builds a key from raw bytes. Exactly 32 bytes are required.
    pub fn from_bytes(key_bytes: &[u8]) -> Result<Self, CipherError> {
        let bytes: [u8; KEY_LEN] = key_bytes
            .try_into()
            .map_err(|_| CipherError::InvalidKeyLength)?;
        Ok(Self { bytes })
    }

    /// The constant key compiled into the tool.
    pub fn embedded() -> Self {
        Self {
            bytes: *EMBEDDED_KEY,
        }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl Drop for EncryptionKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}

/// Turns a leaf's plaintext into a text-safe token and back.
///
/// Implementations are expected to be non-deterministic: sealing the same
/// plaintext twice yields different tokens.
pub trait LeafCipher {
    fn scheme(&self) -> Scheme;

    fn seal(&self, plaintext: &[u8]) -> Result<String, CipherError>;

    fn open(&self, token: &str) -> Result<Vec<u8>, CipherError>;
}

/// Token format written for each leaf.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scheme {
    /// Fernet tokens (AES-128-CBC + HMAC-SHA256), readable by the Dart client.
    #[default]
    Fernet,
    /// ChaCha20-Poly1305 with the nonce and tag packed into the token.
    ChaCha20Poly1305,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Fernet => "fernet",
            Scheme::ChaCha20Poly1305 => "chacha20poly1305",
        }
    }

    /// Builds the cipher for this scheme keyed by `key`.
    pub fn cipher(&self, key: &EncryptionKey) -> Box<dyn LeafCipher> {
        match self {
            Scheme::Fernet => Box::new(FernetCipher::new(key)),
            Scheme::ChaCha20Poly1305 => Box::new(SecretVault::new(key)),
        }
    }
}
