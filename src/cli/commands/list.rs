//! `filevault list`: show the files stored in a vault.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;

use crate::cli::output::{self, FileRow};
use crate::cli::{unlock_vault, vault_path};
use crate::errors::{VaultError, Result};
use crate::vault::Vault;

/// JSON shape of one listed file.
#[derive(Debug, Serialize)]
struct ListedFile {
    index: u64,
    name: String,
    offset: u64,
    stored_bytes: usize,
    added_at: String,
    /// SHA-256 of the stored ciphertext, base64.
    integrity_hash: String,
    intact: bool,
}

/// Execute the `list` command.
pub fn execute(raw_path: &Path, json: bool) -> Result<()> {
    let path = vault_path(raw_path);
    let (vault, _key) = unlock_vault(&path)?;

    let listed = collect(&vault)?;

    if json {
        let rendered = serde_json::to_string_pretty(&listed)
            .map_err(|e| VaultError::SerializationError(format!("listing: {e}")))?;
        println!("{rendered}");
        return Ok(());
    }

    output::info(&format!(
        "{}: created {}, {} file(s)",
        path.display(),
        vault.metadata().created_at.format("%Y-%m-%d %H:%M"),
        vault.file_count()
    ));

    let rows: Vec<FileRow> = listed
        .into_iter()
        .map(|f| FileRow {
            index: f.index as usize,
            name: f.name,
            added_at: f.added_at,
            stored_bytes: f.stored_bytes,
            intact: f.intact,
        })
        .collect();
    output::print_files_table(&rows);

    Ok(())
}

fn collect(vault: &Vault) -> Result<Vec<ListedFile>> {
    vault
        .files()
        .iter()
        .enumerate()
        .map(|(i, f)| -> Result<ListedFile> {
            Ok(ListedFile {
                index: f.index,
                name: f.name.clone(),
                offset: f.offset,
                stored_bytes: vault.file_range(i)?.len(),
                added_at: f.added_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                integrity_hash: BASE64.encode(f.integrity_hash),
                intact: vault.check_file_integrity(i)?,
            })
        })
        .collect()
}
