//! AES-256-CTR stream encryption.
//!
//! Each call to `encrypt` draws a fresh random 16-byte nonce and
//! prepends it to the ciphertext.  `decrypt` splits the nonce back out
//! and runs the same keystream over the remainder.
//!
//! Layout of the returned byte buffer:
//!   [ 16-byte nonce | ciphertext (same length as plaintext) ]
//!
//! There is no authentication tag.  Integrity is checked separately
//! with SHA-256 digests over the stored ciphertext.

use aes::cipher::{KeyIvInit, StreamCipher};
use rand::TryRngCore;

use crate::errors::{VaultError, Result};

/// AES-256 with a 128-bit big-endian counter; the nonce is the first counter block.
type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;

/// Size of the CTR nonce in bytes (one AES block).
pub const NONCE_LEN: usize = 16;

/// Encrypt `plaintext` with a 32-byte `key`.
///
/// Returns the nonce prepended to the ciphertext (nonce || ciphertext).
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut nonce = [0u8; NONCE_LEN];
    rand::rngs::OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|e| VaultError::EncryptionFailed(format!("nonce generation: {e}")))?;

    let mut cipher = Aes256Ctr::new_from_slices(key, &nonce)
        .map_err(|e| VaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let mut output = Vec::with_capacity(NONCE_LEN + plaintext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(plaintext);
    cipher.apply_keystream(&mut output[NONCE_LEN..]);
    Ok(output)
}

/// Decrypt data that was produced by `encrypt`.
///
/// Expects the first 16 bytes to be the nonce.  A wrong key does not
/// fail here; it yields garbage plaintext that the caller must reject.
pub fn decrypt(key: &[u8], ciphertext_with_nonce: &[u8]) -> Result<Vec<u8>> {
    if ciphertext_with_nonce.len() < NONCE_LEN {
        return Err(VaultError::DecryptionFailed);
    }

    let (nonce, ciphertext) = ciphertext_with_nonce.split_at(NONCE_LEN);
    let mut cipher =
        Aes256Ctr::new_from_slices(key, nonce).map_err(|_| VaultError::DecryptionFailed)?;

    let mut plaintext = ciphertext.to_vec();
    cipher.apply_keystream(&mut plaintext);
    Ok(plaintext)
}
