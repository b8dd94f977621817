//! Configuration loaded from `.filevault.toml`.

pub mod settings;

pub use settings::Settings;
