use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in FileVault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: wrong key or corrupted data")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Format errors ---
    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- Lookup errors ---
    #[error("File index {index} not found (vault holds {count} file(s))")]
    FileNotFound { index: usize, count: usize },

    #[error("Vault not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Vault already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl VaultError {
    /// True for errors raised by the cipher or the KDF.
    pub fn is_crypto(&self) -> bool {
        matches!(
            self,
            Self::EncryptionFailed(_) | Self::DecryptionFailed | Self::KeyDerivationFailed(_)
        )
    }

    /// True for errors raised while decoding a vault's structure.
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            Self::InvalidVaultFormat(_) | Self::SerializationError(_)
        )
    }
}

/// Convenience type alias for FileVault results.
pub type Result<T> = std::result::Result<T, VaultError>;
