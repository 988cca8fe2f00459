//! Configuration resolution helpers

use crate::Result;
use std::path::PathBuf;

/// Resolve the SQLite database path following the priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. Compiled default (`./data/ecolink.db`)
pub fn resolve_database_path(cli_arg: Option<&str>, env_var_name: &str) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    // Priority 3: Compiled default
    Ok(PathBuf::from("data").join("ecolink.db"))
}
