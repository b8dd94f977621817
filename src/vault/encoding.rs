//! Deterministic binary encoding for metadata records and length prefixes.
//!
//! Records go through `bincode` with its default fixed-width,
//! little-endian configuration.  Length prefixes are plain 4-byte
//! little-endian `i32`s.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{VaultError, Result};

/// Width of an encoded `i32` length prefix.
pub const INT32_LEN: usize = 4;

/// Serialize a metadata record (or a sequence of them) to bytes.
pub fn encode_record<T: Serialize + ?Sized>(record: &T) -> Result<Vec<u8>> {
    bincode::serialize(record).map_err(|e| VaultError::SerializationError(e.to_string()))
}

/// Deserialize a metadata record from bytes produced by `encode_record`.
pub fn decode_record<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    bincode::deserialize(bytes)
        .map_err(|e| VaultError::InvalidVaultFormat(format!("record decoding: {e}")))
}

pub fn encode_i32(value: i32) -> [u8; INT32_LEN] {
    value.to_le_bytes()
}

pub fn decode_i32(bytes: &[u8]) -> Result<i32> {
    let raw: [u8; INT32_LEN] = bytes.try_into().map_err(|_| {
        VaultError::InvalidVaultFormat(format!(
            "expected {INT32_LEN} bytes for an int32, got {}",
            bytes.len()
        ))
    })?;
    Ok(i32::from_le_bytes(raw))
}

/// Convert an in-memory length to the on-disk `i32` prefix.
pub fn length_prefix(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| {
        VaultError::SerializationError(format!("section length {len} exceeds i32::MAX"))
    })
}
