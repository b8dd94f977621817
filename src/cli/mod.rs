//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use clap::Parser;

use zeroize::Zeroizing;

use crate::crypto::VaultKey;
use crate::errors::{VaultError, Result};
use crate::vault::Vault;

/// Minimum password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable read before prompting for a password.
pub const PASSWORD_ENV: &str = "FILEVAULT_PASSWORD";

/// Conventional extension for vault files.
pub const VAULT_EXTENSION: &str = "vault";

/// FileVault CLI: store files inside a single password-protected container.
#[derive(Parser)]
#[command(
    name = "filevault",
    about = "Encrypted single-file container for arbitrary files",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new, empty vault
    Create {
        /// Vault file (".vault" is appended when no extension is given)
        vault: PathBuf,
    },

    /// Encrypt files into a vault
    Add {
        /// Vault file
        vault: PathBuf,
        /// Files to add
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Delete each source file once it is stored
        #[arg(short, long)]
        delete_original: bool,
    },

    /// List the files stored in a vault
    List {
        /// Vault file
        vault: PathBuf,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Decrypt a file out of the vault (the file is removed from the vault)
    Extract {
        /// Vault file
        vault: PathBuf,
        /// Index of the file, as shown by `list`
        index: usize,
        /// Destination directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Permanently discard a file from the vault
    Remove {
        /// Vault file
        vault: PathBuf,
        /// Index of the file, as shown by `list`
        index: usize,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Check a vault's integrity hash (no password needed)
    Verify {
        /// Vault file
        vault: PathBuf,
        /// Also unlock the vault and check every stored file
        #[arg(long)]
        files: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the vault password, trying in order:
/// 1. `FILEVAULT_PASSWORD` env var (scripts/CI)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter vault password")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation (used by `create`).
///
/// Also respects `FILEVAULT_PASSWORD` for scripted usage.
/// Enforces a minimum password length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            check_password_len(&pw)?;
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Choose vault password")
                .with_confirmation(
                    "Confirm vault password",
                    "Passwords do not match, try again",
                )
                .interact()
                .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?,
        );

        if let Err(e) = check_password_len(&password) {
            output::warning(&format!("{e}. Try again."));
            continue;
        }

        return Ok(password);
    }
}

fn check_password_len(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(VaultError::CommandFailed(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Normalize a user-supplied vault path.
///
/// Paths without an extension get `.vault` appended, so `filevault list
/// photos` and `filevault list photos.vault` name the same file.
pub fn vault_path(raw: &Path) -> PathBuf {
    if raw.extension().is_some() {
        raw.to_path_buf()
    } else {
        raw.with_extension(VAULT_EXTENSION)
    }
}

/// Prompt for the password and load the vault at `path`.
pub fn unlock_vault(path: &Path) -> Result<(Vault, VaultKey)> {
    if !path.exists() {
        return Err(VaultError::VaultNotFound(path.to_path_buf()));
    }
    let password = prompt_password()?;
    Vault::load(password.as_bytes(), path)
}
