//! Cryptographic primitives for FileVault.
//!
//! This module provides:
//! - AES-256-CTR encryption and decryption (`encryption`)
//! - Argon2id password-based key derivation (`kdf`)
//! - SHA-256 digests over buffers and file ranges (`hashing`)

pub mod encryption;
pub mod hashing;
pub mod kdf;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use encryption::{decrypt, encrypt, NONCE_LEN};
pub use hashing::{digests_match, hash_bytes, hash_file_range, HASH_LEN};
pub use kdf::{derive_key, generate_salt, VaultKey, KEY_LEN, SALT_LEN};
