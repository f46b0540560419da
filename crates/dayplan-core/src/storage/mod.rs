mod config;
mod memory;
pub mod migrations;
pub mod task_db;
mod task_store;

pub use config::{Config, IdentityConfig, SuggestionConfig, TimelineConfig};
pub use memory::InMemoryTaskStore;
pub use task_db::TaskDb;
pub use task_store::TaskStore;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `DAYPLAN_DATA_DIR` wins when set. Otherwise `~/.config/dayplan/`, or
/// `~/.config/dayplan-dev/` with `DAYPLAN_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("DAYPLAN_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("DAYPLAN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("dayplan-dev")
            } else {
                base_dir.join("dayplan")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
