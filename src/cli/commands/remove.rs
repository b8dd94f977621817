//! `filevault remove`: permanently discard a file from a vault.

use std::path::Path;

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{unlock_vault, vault_path};
use crate::config::Settings;
use crate::errors::{VaultError, Result};

/// Execute the `remove` command.
pub fn execute(raw_path: &Path, index: usize, force: bool, settings: &Settings) -> Result<()> {
    let path = vault_path(raw_path);
    let (mut vault, key) = unlock_vault(&path)?;

    // Look the entry up first so a bad index fails before any prompt.
    let name = vault
        .files()
        .get(index)
        .map(|f| f.name.clone())
        .ok_or(VaultError::FileNotFound {
            index,
            count: vault.file_count(),
        })?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force && settings.confirm_remove {
        let confirmed = Confirm::new()
            .with_prompt(format!("Permanently remove '{name}' from the vault?"))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    vault.remove_file(index)?;
    vault.save(&key, &path)?;

    output::success(&format!("Removed '{name}'"));
    Ok(())
}
