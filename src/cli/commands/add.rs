//! `filevault add`: encrypt one or more files into a vault.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::cli::output;
use crate::cli::{unlock_vault, vault_path};
use crate::config::Settings;
use crate::errors::Result;

/// Execute the `add` command.
///
/// Files are added in order and the vault is saved once at the end.
/// Sources are only deleted after that save succeeds, so a failure
/// part-way leaves both the vault on disk and every original untouched.
pub fn execute(raw_path: &Path, files: &[PathBuf], delete_original: bool, settings: &Settings) -> Result<()> {
    let path = vault_path(raw_path);
    let (mut vault, key) = unlock_vault(&path)?;
    let delete_original = delete_original || settings.delete_original;

    for file in files {
        vault.add_file(&key, file, false)?;
        output::info(&format!("Added {}", file.display()));
    }

    vault.save(&key, &path)?;
    output::success(&format!(
        "Stored {} file(s); vault now holds {}",
        files.len(),
        vault.file_count()
    ));

    if delete_original {
        let mut kept = 0usize;
        for file in files {
            if let Err(e) = fs::remove_file(file) {
                warn!(path = %file.display(), error = %e, "could not delete original");
                output::warning(&format!("Could not delete {}: {e}", file.display()));
                kept += 1;
            }
        }
        if kept == 0 {
            output::tip("Original files were deleted.");
        }
    }

    Ok(())
}
