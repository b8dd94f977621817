//! `filevault extract`: decrypt a file out of the vault.
//!
//! Extraction moves the file: once the plaintext is on disk the entry is
//! removed and the vault is saved.

use std::path::Path;

use crate::cli::output;
use crate::cli::{unlock_vault, vault_path};
use crate::config::Settings;
use crate::errors::{VaultError, Result};

/// Execute the `extract` command.
pub fn execute(raw_path: &Path, index: usize, out: Option<&Path>, settings: &Settings) -> Result<()> {
    let path = vault_path(raw_path);
    let cwd = std::env::current_dir()?;
    let dest = settings.extract_dir(&cwd, out);
    if !dest.is_dir() {
        return Err(VaultError::CommandFailed(format!(
            "destination {} is not a directory",
            dest.display()
        )));
    }

    let (mut vault, key) = unlock_vault(&path)?;
    let name = vault
        .files()
        .get(index)
        .map(|f| f.name.clone())
        .ok_or(VaultError::FileNotFound {
            index,
            count: vault.file_count(),
        })?;

    if !vault.check_file_integrity(index)? {
        output::warning(&format!(
            "'{name}' failed its integrity check; the extracted copy may be corrupt"
        ));
    }

    vault.extract_file(&key, index, &dest)?;
    vault.save(&key, &path)?;

    output::success(&format!(
        "Extracted '{name}' to {}",
        dest.join(&name).display()
    ));
    Ok(())
}
