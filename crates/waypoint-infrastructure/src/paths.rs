//! Path management for waypoint configuration files.
//!
//! ```text
//! ~/.config/waypoint/
//! └── config.toml      # API endpoints, keys, autosave tuning
//! ```

use std::path::{Path, PathBuf};
use waypoint_core::{Result, WaypointError};

const APP_DIR: &str = "waypoint";
const CONFIG_FILE: &str = "config.toml";

/// Resolves where waypoint keeps its files.
///
/// A base directory can be injected, which tests use to stay out of the
/// real home directory.
#[derive(Debug, Clone, Default)]
pub struct WaypointPaths {
    base_dir: Option<PathBuf>,
}

impl WaypointPaths {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    /// Returns the configuration directory (e.g. `~/.config/waypoint/`).
    pub fn config_dir(&self) -> Result<PathBuf> {
        if let Some(base) = &self.base_dir {
            return Ok(base.clone());
        }
        let home = dirs::home_dir()
            .ok_or_else(|| WaypointError::config("Could not determine home directory"))?;
        Ok(home.join(".config").join(APP_DIR))
    }

    /// Returns the path to `config.toml`.
    pub fn config_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join(CONFIG_FILE))
    }

    /// Creates the parent directory of `path` if needed.
    pub fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}
