//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// One row of the `list` table.
pub struct FileRow {
    pub index: usize,
    pub name: String,
    pub added_at: String,
    pub stored_bytes: usize,
    pub intact: bool,
}

/// Print a table of stored files (Index, Name, Added, Size, Integrity).
pub fn print_files_table(rows: &[FileRow]) {
    if rows.is_empty() {
        info("This vault is empty.");
        tip("Run `filevault add <VAULT> <FILE>` to store your first file.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Name", "Added", "Stored", "Integrity"]);

    for row in rows {
        let integrity = if row.intact {
            style("ok").green().to_string()
        } else {
            style("CORRUPTED").red().bold().to_string()
        };
        table.add_row(vec![
            row.index.to_string(),
            row.name.clone(),
            row.added_at.clone(),
            human_size(row.stored_bytes),
            integrity,
        ]);
    }

    println!("{table}");
}

/// Format a byte count with a binary unit suffix.
pub fn human_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
