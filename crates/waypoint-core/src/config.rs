//! Runtime configuration shared by every layer.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct WaypointConfig {
    pub api: ApiConfig,
    pub places: PlacesConfig,
    pub etherscan: EtherscanConfig,
    pub autosave: AutosaveConfig,
}

/// Marketplace backend.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Bearer token sent with every request when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3030".to_string(),
            auth_token: None,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Place details lookup used to geocode trip locations.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PlacesConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com/maps/api".to_string(),
            api_key: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EtherscanConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for EtherscanConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.etherscan.io".to_string(),
            api_key: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AutosaveConfig {
    pub debounce_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self { debounce_ms: 2000 }
    }
}

impl AutosaveConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: WaypointConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://api.example.com"

            [autosave]
            debounce_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.autosave.debounce(), Duration::from_millis(500));
        assert_eq!(config.places, PlacesConfig::default());
    }

    #[test]
    fn test_default_debounce_is_two_seconds() {
        assert_eq!(
            WaypointConfig::default().autosave.debounce(),
            crate::autosave::DEFAULT_DEBOUNCE
        );
    }
}
