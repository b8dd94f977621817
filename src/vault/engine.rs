//! In-memory vault model and the operations that mutate it.
//!
//! A `Vault` owns the whole container in memory: the plaintext
//! metadata, the ordered list of file entries, and one contiguous blob
//! holding every file's ciphertext back to back.  For every entry `i`:
//!
//! - `files_metadata[i].index == i`
//! - `files_metadata[i].offset` is where its ciphertext starts in the blob
//! - the ciphertext runs until the next entry's offset (or the blob's end)
//!
//! Nothing is written to disk until `save` is called.

use std::fs;
use std::ops::Range;
use std::path::{Component, Path};

use chrono::Utc;
use tracing::{debug, info, warn};
use zeroize::Zeroize;

use super::format;
use super::metadata::{FileMetadata, VaultMetadata};
use crate::crypto::{decrypt, derive_key, digests_match, encrypt, generate_salt, hash_bytes, VaultKey, NONCE_LEN};
use crate::errors::{VaultError, Result};

/// An unlocked vault held entirely in memory.
#[derive(Debug)]
pub struct Vault {
    metadata: VaultMetadata,
    files_metadata: Vec<FileMetadata>,
    files: Vec<u8>,
    /// True when the in-memory model differs from what was last saved.
    dirty: bool,
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create an empty vault with a fresh salt.
    ///
    /// Returns the session key derived from `password` alongside the
    /// vault.  The vault starts dirty because nothing exists on disk yet.
    pub fn create(password: &[u8]) -> Result<(Self, VaultKey)> {
        let salt = generate_salt()?;
        let key = derive_key(password, &salt)?;

        let vault = Self {
            metadata: VaultMetadata {
                salt,
                created_at: Utc::now(),
            },
            files_metadata: Vec::new(),
            files: Vec::new(),
            dirty: true,
        };

        info!("created new vault");
        Ok((vault, key))
    }

    /// Load a vault from disk, decrypting its metadata with `password`.
    ///
    /// The whole file is read into memory.  The trailing integrity hash
    /// is not checked; call [`check_vault_integrity`] for that.
    pub fn load(password: &[u8], path: &Path) -> Result<(Self, VaultKey)> {
        let (raw, key) = format::read_vault(path, password)?;

        let vault = Self {
            metadata: raw.metadata,
            files_metadata: raw.files_metadata,
            files: raw.files,
            dirty: false,
        };
        vault.validate_layout()?;

        info!(
            path = %path.display(),
            files = vault.file_count(),
            "loaded vault"
        );
        Ok((vault, key))
    }

    /// Re-derive the key for this vault from a password.
    pub fn derive_key(&self, password: &[u8]) -> Result<VaultKey> {
        derive_key(password, &self.metadata.salt)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Write the vault to `path` (atomically) and mark it clean.
    pub fn save(&mut self, key: &VaultKey, path: &Path) -> Result<()> {
        format::write_vault(path, key, &self.metadata, &self.files_metadata, &self.files)?;
        self.dirty = false;

        info!(
            path = %path.display(),
            files = self.file_count(),
            "saved vault"
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // File operations
    // ------------------------------------------------------------------

    /// Encrypt the file at `source` and append it to the vault.
    ///
    /// With `delete_original`, the source is removed once it is safely
    /// inside the (in-memory) vault.  Callers that add several files
    /// before one `save` should pass `false` and delete after saving.
    pub fn add_file(&mut self, key: &VaultKey, source: &Path, delete_original: bool) -> Result<()> {
        let name = source
            .file_name()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("{} does not name a file", source.display()),
                )
            })?
            .to_string_lossy()
            .into_owned();

        let mut plaintext = fs::read(source)?;
        let encrypted = encrypt(key.as_bytes(), &plaintext);
        plaintext.zeroize();
        let ciphertext = encrypted?;

        let entry = FileMetadata {
            name,
            index: self.files_metadata.len() as u64,
            offset: self.files.len() as u64,
            integrity_hash: hash_bytes(&ciphertext),
            added_at: Utc::now(),
        };

        debug!(
            index = entry.index,
            offset = entry.offset,
            stored = ciphertext.len(),
            "appending file"
        );

        self.files.extend_from_slice(&ciphertext);
        self.files_metadata.push(entry);
        self.dirty = true;

        if delete_original {
            fs::remove_file(source)?;
        }
        Ok(())
    }

    /// Drop entry `index` and splice its ciphertext out of the blob.
    ///
    /// Every later entry moves down one slot and its offset shifts back
    /// by the removed length, so the layout invariants keep holding.
    pub fn remove_file(&mut self, index: usize) -> Result<()> {
        let range = self.file_range(index)?;
        let removed_len = (range.end - range.start) as u64;

        self.files.drain(range);
        let removed = self.files_metadata.remove(index);

        for (slot, entry) in self.files_metadata.iter_mut().enumerate().skip(index) {
            entry.index = slot as u64;
            entry.offset -= removed_len;
        }
        self.dirty = true;

        debug!(index, name = %removed.name, removed_len, "removed file");
        Ok(())
    }

    /// Decrypt entry `index` into `dest_dir/<name>`, then remove it from the vault.
    ///
    /// Extraction is a move: on success the entry is no longer in the
    /// vault.  If writing the plaintext fails, the vault is unchanged.
    /// Names that are not a single plain path component are rejected.
    pub fn extract_file(&mut self, key: &VaultKey, index: usize, dest_dir: &Path) -> Result<()> {
        let range = self.file_range(index)?;
        let mut plaintext = decrypt(key.as_bytes(), &self.files[range])?;

        let name = &self.files_metadata[index].name;
        if !is_plain_file_name(name) {
            plaintext.zeroize();
            return Err(VaultError::InvalidVaultFormat(format!(
                "refusing to extract entry {index} to unsafe name {name:?}"
            )));
        }
        let out_path = dest_dir.join(name);
        let written = fs::write(&out_path, &plaintext);
        plaintext.zeroize();
        written?;

        info!(index, path = %out_path.display(), "extracted file");
        self.remove_file(index)
    }

    /// Check entry `index`'s ciphertext against its stored SHA-256.
    ///
    /// Works on ciphertext only, so no key is needed.
    pub fn check_file_integrity(&self, index: usize) -> Result<bool> {
        let range = self.file_range(index)?;
        let entry = &self.files_metadata[index];

        let ok = digests_match(&hash_bytes(&self.files[range]), &entry.integrity_hash);
        if !ok {
            warn!(index, name = %entry.name, "file integrity hash mismatch");
        }
        Ok(ok)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Byte range of entry `index`'s ciphertext inside the blob.
    pub fn file_range(&self, index: usize) -> Result<Range<usize>> {
        let count = self.files_metadata.len();
        if index >= count {
            return Err(VaultError::FileNotFound { index, count });
        }

        let start = blob_position(self.files_metadata[index].offset)?;
        let end = match self.files_metadata.get(index + 1) {
            Some(next) => blob_position(next.offset)?,
            None => self.files.len(),
        };
        if start > end || end > self.files.len() {
            return Err(VaultError::InvalidVaultFormat(format!(
                "entry {index} spans {start}..{end} outside the file blob"
            )));
        }
        Ok(start..end)
    }

    /// Returns the vault-wide metadata (salt, creation time).
    pub fn metadata(&self) -> &VaultMetadata {
        &self.metadata
    }

    /// Returns the file entries in index order.
    pub fn files(&self) -> &[FileMetadata] {
        &self.files_metadata
    }

    /// Returns the number of stored files.
    pub fn file_count(&self) -> usize {
        self.files_metadata.len()
    }

    /// Returns the total size of the ciphertext blob.
    pub fn blob_len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if there are changes not yet saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Check the index/offset invariants of freshly decoded entries.
    ///
    /// Every ciphertext carries at least a nonce, so offsets must be at
    /// least `NONCE_LEN` apart.
    fn validate_layout(&self) -> Result<()> {
        let blob_len = self.files.len() as u64;
        let mut expected_offset = 0u64;

        for (slot, entry) in self.files_metadata.iter().enumerate() {
            if entry.index != slot as u64 {
                return Err(VaultError::InvalidVaultFormat(format!(
                    "entry {slot} carries index {}",
                    entry.index
                )));
            }
            let in_order = if slot == 0 {
                entry.offset == 0
            } else {
                entry.offset >= expected_offset
            };
            let min_end = entry.offset.checked_add(NONCE_LEN as u64);
            match min_end {
                Some(end) if in_order && end <= blob_len => expected_offset = end,
                _ => {
                    return Err(VaultError::InvalidVaultFormat(format!(
                        "entry {slot} has offset {} outside the file blob",
                        entry.offset
                    )))
                }
            }
        }

        if self.files_metadata.is_empty() && blob_len != 0 {
            return Err(VaultError::InvalidVaultFormat(format!(
                "{blob_len} blob bytes but no file entries"
            )));
        }
        Ok(())
    }
}

fn blob_position(offset: u64) -> Result<usize> {
    usize::try_from(offset)
        .map_err(|_| VaultError::InvalidVaultFormat(format!("offset {offset} does not fit in memory")))
}

/// True when `name` is exactly one normal path component (no `..`, no root, no separators).
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Check a vault file's trailing SHA-256 without a password.
pub fn check_vault_integrity(path: &Path) -> Result<bool> {
    format::check_vault_integrity(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_source(dir: &Path, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn assert_layout(vault: &Vault) {
        let mut prev = None;
        for (i, entry) in vault.files().iter().enumerate() {
            assert_eq!(entry.index, i as u64);
            if let Some(p) = prev {
                assert!(entry.offset > p, "offsets must strictly increase");
            }
            prev = Some(entry.offset);
        }
        let total: usize = (0..vault.file_count())
            .map(|i| vault.file_range(i).unwrap().len())
            .sum();
        assert_eq!(total, vault.blob_len());
    }

    #[test]
    fn new_vault_is_empty_and_dirty() {
        let (vault, _key) = Vault::create(b"pw").unwrap();
        assert_eq!(vault.file_count(), 0);
        assert_eq!(vault.blob_len(), 0);
        assert!(vault.is_dirty());
    }

    #[test]
    fn add_appends_with_cumulative_offsets() {
        let dir = TempDir::new().unwrap();
        let (mut vault, key) = Vault::create(b"pw").unwrap();

        let a = write_source(dir.path(), "a.txt", &[1u8; 100]);
        let b = write_source(dir.path(), "b.txt", &[2u8; 7]);
        vault.add_file(&key, &a, false).unwrap();
        vault.add_file(&key, &b, false).unwrap();

        assert_eq!(vault.files()[0].offset, 0);
        assert_eq!(vault.files()[1].offset, (NONCE_LEN + 100) as u64);
        assert_eq!(vault.blob_len(), 2 * NONCE_LEN + 107);
        assert_layout(&vault);
    }

    #[test]
    fn remove_middle_renumbers_and_shifts() {
        let dir = TempDir::new().unwrap();
        let (mut vault, key) = Vault::create(b"pw").unwrap();
        for (name, len) in [("one", 10), ("two", 20), ("three", 30)] {
            let p = write_source(dir.path(), name, &vec![0x5A; len]);
            vault.add_file(&key, &p, false).unwrap();
        }

        vault.remove_file(1).unwrap();

        assert_eq!(vault.file_count(), 2);
        assert_eq!(vault.files()[1].name, "three");
        assert_eq!(vault.files()[1].index, 1);
        assert_eq!(vault.files()[1].offset, (NONCE_LEN + 10) as u64);
        assert_layout(&vault);
        assert!(vault.check_file_integrity(0).unwrap());
        assert!(vault.check_file_integrity(1).unwrap());
    }

    #[test]
    fn remove_last_and_only_entries() {
        let dir = TempDir::new().unwrap();
        let (mut vault, key) = Vault::create(b"pw").unwrap();
        let p = write_source(dir.path(), "f", b"abc");
        vault.add_file(&key, &p, false).unwrap();
        vault.add_file(&key, &p, false).unwrap();

        vault.remove_file(1).unwrap();
        assert_eq!(vault.blob_len(), NONCE_LEN + 3);
        vault.remove_file(0).unwrap();
        assert_eq!(vault.blob_len(), 0);
        assert_eq!(vault.file_count(), 0);
    }

    #[test]
    fn out_of_range_index_is_not_found() {
        let (mut vault, key) = Vault::create(b"pw").unwrap();
        let dir = TempDir::new().unwrap();

        assert!(matches!(
            vault.remove_file(0),
            Err(VaultError::FileNotFound { index: 0, count: 0 })
        ));
        assert!(matches!(
            vault.check_file_integrity(3),
            Err(VaultError::FileNotFound { .. })
        ));
        assert!(matches!(
            vault.extract_file(&key, 0, dir.path()),
            Err(VaultError::FileNotFound { .. })
        ));
    }

    #[test]
    fn extract_writes_plaintext_and_removes_entry() {
        let dir = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let (mut vault, key) = Vault::create(b"pw").unwrap();
        let p = write_source(dir.path(), "note.md", b"# hello vault");
        vault.add_file(&key, &p, false).unwrap();

        vault.extract_file(&key, 0, out.path()).unwrap();

        assert_eq!(fs::read(out.path().join("note.md")).unwrap(), b"# hello vault");
        assert_eq!(vault.file_count(), 0);
    }

    #[test]
    fn failed_extract_leaves_vault_unchanged() {
        let dir = TempDir::new().unwrap();
        let (mut vault, key) = Vault::create(b"pw").unwrap();
        let p = write_source(dir.path(), "keep.bin", b"data");
        vault.add_file(&key, &p, false).unwrap();

        let missing = dir.path().join("does-not-exist");
        assert!(matches!(
            vault.extract_file(&key, 0, &missing),
            Err(VaultError::Io(_))
        ));
        assert_eq!(vault.file_count(), 1);
    }

    #[test]
    fn delete_original_removes_source() {
        let dir = TempDir::new().unwrap();
        let (mut vault, key) = Vault::create(b"pw").unwrap();
        let p = write_source(dir.path(), "gone.txt", b"bye");
        vault.add_file(&key, &p, true).unwrap();
        assert!(!p.exists());
        assert_eq!(vault.file_count(), 1);
    }

    #[test]
    fn missing_source_is_io_error() {
        let dir = TempDir::new().unwrap();
        let (mut vault, key) = Vault::create(b"pw").unwrap();
        let err = vault
            .add_file(&key, &dir.path().join("absent"), false)
            .unwrap_err();
        assert!(matches!(err, VaultError::Io(_)));
        assert_eq!(vault.file_count(), 0);
    }

    #[test]
    fn corrupted_ciphertext_fails_file_integrity() {
        let dir = TempDir::new().unwrap();
        let (mut vault, key) = Vault::create(b"pw").unwrap();
        let p = write_source(dir.path(), "x", b"payload");
        vault.add_file(&key, &p, false).unwrap();

        vault.files[NONCE_LEN] ^= 0x01;
        assert!(!vault.check_file_integrity(0).unwrap());
    }

    #[test]
    fn save_clears_dirty_flag() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("d.vault");
        let (mut vault, key) = Vault::create(b"pw").unwrap();
        vault.save(&key, &path).unwrap();
        assert!(!vault.is_dirty());

        let p = write_source(dir.path(), "f", b"1");
        vault.add_file(&key, &p, false).unwrap();
        assert!(vault.is_dirty());
    }

    #[test]
    fn layout_validation_rejects_bad_indices() {
        let (mut vault, _key) = Vault::create(b"pw").unwrap();
        vault.files = vec![0u8; 32];
        vault.files_metadata = vec![FileMetadata {
            name: "x".into(),
            index: 4,
            offset: 0,
            integrity_hash: [0u8; 32],
            added_at: Utc::now(),
        }];
        assert!(vault.validate_layout().unwrap_err().is_format());

        vault.files_metadata[0].index = 0;
        vault.files_metadata[0].offset = 30;
        assert!(vault.validate_layout().unwrap_err().is_format());

        vault.files_metadata[0].offset = 0;
        assert!(vault.validate_layout().is_ok());
    }

    #[test]
    fn layout_validation_rejects_offsets_near_u64_max() {
        let (mut vault, _key) = Vault::create(b"pw").unwrap();
        vault.files = vec![0u8; 32];
        let entry = |index, offset| FileMetadata {
            name: format!("f{index}"),
            index,
            offset,
            integrity_hash: [0u8; 32],
            added_at: Utc::now(),
        };
        vault.files_metadata = vec![entry(0, 0), entry(1, u64::MAX - 3)];
        assert!(vault.validate_layout().unwrap_err().is_format());
    }

    #[test]
    fn file_range_reports_offsets_past_blob() {
        let (mut vault, _key) = Vault::create(b"pw").unwrap();
        vault.files = vec![0u8; 20];
        vault.files_metadata = vec![FileMetadata {
            name: "x".into(),
            index: 0,
            offset: 64,
            integrity_hash: [0u8; 32],
            added_at: Utc::now(),
        }];
        assert!(vault.file_range(0).unwrap_err().is_format());
        assert!(vault.check_file_integrity(0).unwrap_err().is_format());
    }

    #[test]
    fn plain_file_names() {
        assert!(is_plain_file_name("report.txt"));
        assert!(is_plain_file_name(".hidden"));
        assert!(!is_plain_file_name(""));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name("../escape.txt"));
        assert!(!is_plain_file_name("/etc/passwd"));
        assert!(!is_plain_file_name("nested/file"));
    }

    #[test]
    fn extract_refuses_names_that_leave_dest_dir() {
        let dir = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let (mut vault, key) = Vault::create(b"pw").unwrap();
        let p = write_source(dir.path(), "inner.txt", b"payload");
        vault.add_file(&key, &p, false).unwrap();
        vault.files_metadata[0].name = "../escaped.txt".into();

        assert!(vault.extract_file(&key, 0, out.path()).unwrap_err().is_format());
        assert!(!out.path().join("../escaped.txt").exists());
        assert_eq!(vault.file_count(), 1);
    }
}
