//! Metadata records stored inside a vault.
//!
//! `VaultMetadata` is written in plaintext at the head of the file so the
//! salt can be recovered before a key exists.  The list of `FileMetadata`
//! entries is encrypted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::{HASH_LEN, SALT_LEN};

/// Vault-wide metadata (plaintext on disk).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultMetadata {
    /// The salt used for Argon2id key derivation; fixed for the vault's lifetime.
    pub salt: [u8; SALT_LEN],

    /// When this vault was first created.
    pub created_at: DateTime<Utc>,
}

/// Bookkeeping for one stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Original file name (final path component only).
    pub name: String,

    /// Position in the vault's file list; always equal to the entry's slot.
    pub index: u64,

    /// Start of this file's ciphertext inside the concatenated blob.
    pub offset: u64,

    /// SHA-256 of the stored ciphertext (nonce included), not the plaintext.
    pub integrity_hash: [u8; HASH_LEN],

    /// When the file was added.
    pub added_at: DateTime<Utc>,
}
