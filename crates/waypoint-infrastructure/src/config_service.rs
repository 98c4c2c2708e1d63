//! Configuration service.
//!
//! Loads [`WaypointConfig`] from `~/.config/waypoint/config.toml`, falls back
//! to defaults when the file is missing, then applies environment overrides.

use crate::paths::WaypointPaths;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use waypoint_core::config::WaypointConfig;
use waypoint_core::{Result, WaypointError};

pub const ENV_API_URL: &str = "WAYPOINT_API_URL";
pub const ENV_API_TOKEN: &str = "WAYPOINT_API_TOKEN";
pub const ENV_PLACES_API_KEY: &str = "WAYPOINT_PLACES_API_KEY";
pub const ENV_ETHERSCAN_API_KEY: &str = "ETHERSCAN_API_KEY";
pub const ENV_ETHERSCAN_API_URL: &str = "ETHERSCAN_API_URL";
pub const ENV_AUTOSAVE_DEBOUNCE_MS: &str = "WAYPOINT_AUTOSAVE_DEBOUNCE_MS";

/// Loads and caches the configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<WaypointConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the default config file location.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(WaypointPaths::default().config_file()?))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading it on first access.
    pub fn get_config(&self) -> Result<WaypointConfig> {
        {
            let cached = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(config) = cached.as_ref() {
                return Ok(config.clone());
            }
        }

        let loaded = Self::load(&self.path, |key| std::env::var(key).ok())?;
        let mut cached = self.config.write().unwrap_or_else(|e| e.into_inner());
        *cached = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut cached = self.config.write().unwrap_or_else(|e| e.into_inner());
        *cached = None;
    }

    /// Reads `path` (defaults when missing) and applies overrides from `env`.
    pub fn load<F>(path: &Path, env: F) -> Result<WaypointConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| {
                WaypointError::config(format!(
                    "Failed to parse configuration file at {}: {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            tracing::debug!(
                "[ConfigService] No configuration at {}, using defaults",
                path.display()
            );
            WaypointConfig::default()
        };

        apply_env_overrides(&mut config, env)?;
        Ok(config)
    }

    /// Writes `config` to the service's file, creating directories as needed.
    pub fn save(&self, config: &WaypointConfig) -> Result<()> {
        WaypointPaths::ensure_parent(&self.path)?;
        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.path, content)?;
        self.invalidate_cache();
        tracing::info!("[ConfigService] Saved configuration to {}", self.path.display());
        Ok(())
    }
}

fn apply_env_overrides<F>(config: &mut WaypointConfig, env: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let value = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = value(ENV_API_URL) {
        config.api.base_url = url;
    }
    if let Some(token) = value(ENV_API_TOKEN) {
        config.api.auth_token = Some(token);
    }
    if let Some(key) = value(ENV_PLACES_API_KEY) {
        config.places.api_key = Some(key);
    }
    if let Some(key) = value(ENV_ETHERSCAN_API_KEY) {
        config.etherscan.api_key = Some(key);
    }
    if let Some(url) = value(ENV_ETHERSCAN_API_URL) {
        config.etherscan.base_url = url;
    }
    if let Some(raw) = value(ENV_AUTOSAVE_DEBOUNCE_MS) {
        config.autosave.debounce_ms = raw.trim().parse().map_err(|_| {
            WaypointError::config(format!(
                "{ENV_AUTOSAVE_DEBOUNCE_MS} must be a number of milliseconds, got '{raw}'"
            ))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = ConfigService::load(Path::new("/nonexistent/waypoint.toml"), env(&[])).unwrap();
        assert_eq!(config, WaypointConfig::default());
    }

    #[test]
    fn test_env_overrides_defaults() {
        let config = ConfigService::load(
            Path::new("/nonexistent/waypoint.toml"),
            env(&[
                (ENV_API_URL, "https://api.example.com"),
                (ENV_ETHERSCAN_API_KEY, "ether-key"),
                (ENV_AUTOSAVE_DEBOUNCE_MS, "750"),
                (ENV_API_TOKEN, "  "),
            ]),
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.api.auth_token, None);
        assert_eq!(config.etherscan.api_key.as_deref(), Some("ether-key"));
        assert_eq!(config.autosave.debounce_ms, 750);
    }

    #[test]
    fn test_invalid_debounce_is_a_config_error() {
        let err = ConfigService::load(
            Path::new("/nonexistent/waypoint.toml"),
            env(&[(ENV_AUTOSAVE_DEBOUNCE_MS, "soon")]),
        )
        .unwrap_err();
        assert!(matches!(err, WaypointError::Config(_)));
    }
}
