//! Hashing helpers shared by the Fernet signer and the artifact fingerprints
//! reported after a run.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use super::CipherError;

type HmacSha256 = Hmac<Sha256>;

/// Length of an HMAC-SHA256 tag.
pub const HMAC_LEN: usize = 32;

/// Returns the hexadecimal representation of a SHA-256 digest.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest: [u8; 32] = hasher.finalize().into();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Generates an HMAC-SHA256 tag for the provided data.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<[u8; HMAC_LEN], CipherError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| CipherError::EncryptionFailed(format!("{e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().into())
}

/// Checks `tag` against the HMAC-SHA256 of `data` in constant time.
pub fn verify_hmac_sha256(key: &[u8], data: &[u8], tag: &[u8]) -> Result<(), CipherError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| CipherError::DecryptionFailed(format!("{e}")))?;
    mac.update(data);
    mac.verify_slice(tag)
        .map_err(|_| CipherError::DecryptionFailed("signature mismatch".to_string()))
}
