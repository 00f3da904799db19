use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

const APP_DIR: &str = "termgrid";
const DATA_DIR_ENV: &str = "TERMGRID_DATA_DIR";

/// Per-user data directory holding `servers.json`. `TERMGRID_DATA_DIR`
/// overrides the platform default, which keeps tests and portable installs
/// away from the real inventory.
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        let dir = dir.trim();
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let base = dirs_next::data_dir().ok_or_else(|| anyhow!("no user data directory found"))?;
    Ok(base.join(APP_DIR))
}

pub fn ensure_data_dir() -> Result<PathBuf> {
    let dir = data_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("create data dir {}", dir.display()))?;
    Ok(dir)
}
