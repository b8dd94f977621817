//! One module per subcommand.  Each exposes an `execute` function.

pub mod add;
pub mod completions;
pub mod create;
pub mod extract;
pub mod list;
pub mod remove;
pub mod verify;
