//! `filevault verify`: check a vault's trailing integrity hash.
//!
//! The vault-level check needs no password.  With `--files` the vault is
//! also unlocked and each stored file's hash is checked.

use std::path::Path;

use crate::cli::output;
use crate::cli::{unlock_vault, vault_path};
use crate::errors::{VaultError, Result};
use crate::vault::check_vault_integrity;

/// Execute the `verify` command.
pub fn execute(raw_path: &Path, files: bool) -> Result<()> {
    let path = vault_path(raw_path);
    if !path.exists() {
        return Err(VaultError::VaultNotFound(path));
    }

    let vault_ok = check_vault_integrity(&path)?;
    if vault_ok {
        output::success(&format!("{}: integrity hash matches", path.display()));
    } else {
        output::error(&format!("{}: integrity hash MISMATCH", path.display()));
    }

    let mut corrupted = 0usize;
    if files {
        let (vault, _key) = unlock_vault(&path)?;
        for (i, entry) in vault.files().iter().enumerate() {
            if !vault.check_file_integrity(i)? {
                output::error(&format!("#{i} '{}' is corrupted", entry.name));
                corrupted += 1;
            }
        }
        if corrupted == 0 {
            output::success(&format!("All {} file(s) intact", vault.file_count()));
        }
    }

    if !vault_ok || corrupted > 0 {
        return Err(VaultError::CommandFailed(
            "vault failed verification".into(),
        ));
    }
    Ok(())
}
