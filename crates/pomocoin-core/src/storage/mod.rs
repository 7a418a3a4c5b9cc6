mod config;
pub mod database;
pub mod migrations;
pub mod shop;
pub mod stats;
pub mod tasks;

pub use config::{Config, MusicConfig};
pub use database::Database;
pub use shop::{
    ImportOutcome, ImportedMusic, PurchaseOutcome, RoomProgress, IMPORT_MUSIC_PRICE,
    MAX_IMPORTED_MUSIC,
};

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns `~/.config/pomocoin[-dev]/` based on POMOCOIN_ENV.
///
/// Set POMOCOIN_ENV=dev to use development data directory, or
/// POMOCOIN_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("POMOCOIN_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("POMOCOIN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomocoin-dev")
            } else {
                base_dir.join("pomocoin")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
