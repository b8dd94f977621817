//! Vault module: the encrypted file container.
//!
//! This module provides:
//! - `VaultMetadata` and `FileMetadata` records (`metadata`)
//! - Deterministic binary encoding of records and length prefixes (`encoding`)
//! - The on-disk byte layout and whole-file integrity check (`format`)
//! - The in-memory `Vault` and its add/remove/extract operations (`engine`)

pub mod encoding;
pub mod engine;
pub mod format;
pub mod metadata;

// Re-export the most commonly used items.
pub use engine::{check_vault_integrity, Vault};
pub use metadata::{FileMetadata, VaultMetadata};
