//! Binary vault file format and whole-file integrity check.
//!
//! A `.vault` file has this layout (all integers little-endian):
//!
//! ```text
//! [meta_len: i32][VaultMetadata][enc(files_meta_len): 20 bytes][enc(FileMetadata[])][file blob][SHA-256: 32 bytes]
//! ```
//!
//! - **meta_len / VaultMetadata**: plaintext, so the salt is readable
//!   before any key exists.
//! - **enc(files_meta_len)**: a 16-byte nonce plus the encrypted 4-byte
//!   length of the following section.
//! - **enc(FileMetadata[])**: nonce plus the encrypted record list.
//! - **file blob**: per-file ciphertexts back to back, each carrying its
//!   own nonce.  Its length is whatever is left before the trailing hash.
//! - **SHA-256**: digest of every preceding byte.  Unkeyed: it catches
//!   accidental corruption, not deliberate tampering.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::encoding::{decode_i32, decode_record, encode_i32, encode_record, length_prefix, INT32_LEN};
use super::metadata::{FileMetadata, VaultMetadata};
use crate::crypto::{decrypt, digests_match, encrypt, hash_file_range, VaultKey, HASH_LEN, NONCE_LEN};
use crate::errors::{VaultError, Result};

/// Size of the encrypted length field that precedes the files metadata.
pub const SIZE_FIELD_LEN: usize = NONCE_LEN + INT32_LEN;

/// Smallest file that can possibly hold a vault.
const MIN_VAULT_LEN: usize = INT32_LEN + SIZE_FIELD_LEN + HASH_LEN;

/// The decoded sections of a vault file.
#[derive(Debug)]
pub struct RawVault {
    pub metadata: VaultMetadata,
    pub files_metadata: Vec<FileMetadata>,
    /// Concatenated per-file ciphertexts.
    pub files: Vec<u8>,
}

/// Write a vault file to disk **atomically**.
///
/// The sections are written to a temp file next to `path`, the trailing
/// digest is computed over what was written, and the temp file is then
/// renamed over the target.  On any error the temp file is removed and
/// the previous vault (if any) is left untouched.
pub fn write_vault(
    path: &Path,
    key: &VaultKey,
    metadata: &VaultMetadata,
    files_metadata: &[FileMetadata],
    files: &[u8],
) -> Result<()> {
    let tmp_path = temp_path_for(path);

    let written = write_sections(&tmp_path, key, metadata, files_metadata, files)
        .and_then(|()| fs::rename(&tmp_path, path).map_err(VaultError::from));

    if written.is_err() {
        if let Err(e) = fs::remove_file(&tmp_path) {
            warn!(path = %tmp_path.display(), error = %e, "could not remove temp vault file");
        }
    }
    written
}

fn write_sections(
    tmp_path: &Path,
    key: &VaultKey,
    metadata: &VaultMetadata,
    files_metadata: &[FileMetadata],
    files: &[u8],
) -> Result<()> {
    let meta_bytes = encode_record(metadata)?;
    let meta_len = length_prefix(meta_bytes.len())?;

    let files_meta_bytes = encode_record(files_metadata)?;
    let encrypted_files_meta = encrypt(key.as_bytes(), &files_meta_bytes)?;
    let files_meta_len = length_prefix(encrypted_files_meta.len())?;
    let encrypted_size_field = encrypt(key.as_bytes(), &encode_i32(files_meta_len))?;

    debug!(
        metadata = meta_bytes.len(),
        files_metadata = encrypted_files_meta.len(),
        blob = files.len(),
        "writing vault sections"
    );

    // The handle is dropped when this function returns, on every path.
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(tmp_path)?;

    file.write_all(&encode_i32(meta_len))?;
    file.write_all(&meta_bytes)?;
    file.write_all(&encrypted_size_field)?;
    file.write_all(&encrypted_files_meta)?;
    file.write_all(files)?;
    file.flush()?;

    let body_end = file.stream_position()?;
    let digest = hash_file_range(&mut file, 0, body_end)?;
    file.write_all(&digest)?;
    file.sync_all()?;

    Ok(())
}

/// Read a vault file and decrypt its metadata with `password`.
///
/// The trailing digest is *not* verified here; use
/// [`check_vault_integrity`] for that.  A wrong password surfaces as an
/// `InvalidVaultFormat` error because the decrypted lengths and records
/// do not make sense.
pub fn read_vault(path: &Path, password: &[u8]) -> Result<(RawVault, VaultKey)> {
    let data = fs::read(path)?;
    if data.len() < MIN_VAULT_LEN {
        return Err(VaultError::InvalidVaultFormat(
            "file too small to be a valid vault".into(),
        ));
    }
    let body_end = data.len() - HASH_LEN;

    // --- Plaintext vault metadata ---

    let meta_len = section_len(decode_i32(&data[..INT32_LEN])?, "vault metadata")?;
    let meta_end = INT32_LEN + meta_len;
    if meta_end + SIZE_FIELD_LEN > body_end {
        return Err(VaultError::InvalidVaultFormat(
            "vault metadata length exceeds file size".into(),
        ));
    }
    let metadata: VaultMetadata = decode_record(&data[INT32_LEN..meta_end])?;

    let key = crate::crypto::derive_key(password, &metadata.salt)?;

    // --- Encrypted files metadata ---

    let size_field_end = meta_end + SIZE_FIELD_LEN;
    let size_plain = decrypt(key.as_bytes(), &data[meta_end..size_field_end])?;
    let files_meta_len = section_len(decode_i32(&size_plain)?, "files metadata")?;
    if files_meta_len < NONCE_LEN || size_field_end + files_meta_len > body_end {
        return Err(VaultError::InvalidVaultFormat(
            "files metadata length out of range (wrong password or corrupted vault)".into(),
        ));
    }
    let header_end = size_field_end + files_meta_len;

    let files_meta_plain = decrypt(key.as_bytes(), &data[size_field_end..header_end])?;
    let files_metadata: Vec<FileMetadata> = decode_record(&files_meta_plain)?;

    // --- File blob: everything up to the trailing digest ---

    let files = data[header_end..body_end].to_vec();

    debug!(
        metadata = meta_len,
        files_metadata = files_meta_len,
        blob = files.len(),
        entries = files_metadata.len(),
        "read vault sections"
    );

    Ok((
        RawVault {
            metadata,
            files_metadata,
            files,
        },
        key,
    ))
}

/// Recompute the SHA-256 over everything but the last 32 bytes and
/// compare it with the stored trailing digest.
///
/// Needs no password.  Files too short to hold a digest report `false`.
pub fn check_vault_integrity(path: &Path) -> Result<bool> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    let hash_len = HASH_LEN as u64;
    if len < hash_len {
        warn!(path = %path.display(), len, "vault too short to carry an integrity hash");
        return Ok(false);
    }

    let body_end = len - hash_len;
    let computed = hash_file_range(&mut file, 0, body_end)?;

    let mut stored = [0u8; HASH_LEN];
    file.seek(SeekFrom::Start(body_end))?;
    file.read_exact(&mut stored)?;

    let ok = digests_match(&computed, &stored);
    if !ok {
        warn!(path = %path.display(), "vault integrity hash mismatch");
    }
    Ok(ok)
}

/// Sibling temp path used while saving: `<dir>/.<name>.tmp`.
fn temp_path_for(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ))
}

fn section_len(raw: i32, what: &str) -> Result<usize> {
    usize::try_from(raw)
        .map_err(|_| VaultError::InvalidVaultFormat(format!("negative {what} length {raw}")))
}
