//! `filevault create`: create a new, empty vault file.

use std::path::Path;

use crate::cli::output;
use crate::cli::{prompt_new_password, vault_path};
use crate::errors::{VaultError, Result};
use crate::vault::Vault;

/// Execute the `create` command.
pub fn execute(raw_path: &Path) -> Result<()> {
    let path = vault_path(raw_path);

    if path.exists() {
        return Err(VaultError::VaultAlreadyExists(path));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            return Err(VaultError::CommandFailed(format!(
                "directory {} does not exist",
                parent.display()
            )));
        }
    }

    let password = prompt_new_password()?;
    let (mut vault, key) = Vault::create(password.as_bytes())?;
    vault.save(&key, &path)?;

    output::success(&format!("Vault created at {}", path.display()));
    output::tip(&format!(
        "Run `filevault add {} <FILE>` to store a file.",
        path.display()
    ));

    Ok(())
}
