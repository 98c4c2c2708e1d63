use anyhow::{Context, Result};
use waypoint_core::config::WaypointConfig;
use waypoint_infrastructure::ConfigService;

pub fn show(config: &ConfigService) -> Result<()> {
    let settings = config.get_config()?;
    println!("# {}", config.path().display());
    print!(
        "{}",
        toml_preview(&settings).context("Failed to render configuration")?
    );
    Ok(())
}

pub fn init(config: &ConfigService) -> Result<()> {
    let path = config.path();
    if path.exists() {
        println!("Configuration already exists at {}", path.display());
        return Ok(());
    }

    config.save(&WaypointConfig::default())?;
    println!("📝 Wrote default configuration to {}", path.display());
    Ok(())
}

/// Renders the configuration with secrets masked.
fn toml_preview(settings: &WaypointConfig) -> Result<String> {
    let mut masked = settings.clone();
    for secret in [
        &mut masked.api.auth_token,
        &mut masked.places.api_key,
        &mut masked.etherscan.api_key,
    ] {
        if secret.is_some() {
            *secret = Some("********".to_string());
        }
    }
    Ok(toml::to_string_pretty(&masked)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_are_masked() {
        let mut settings = WaypointConfig::default();
        settings.api.auth_token = Some("secret-token".into());

        let preview = toml_preview(&settings).unwrap();
        assert!(!preview.contains("secret-token"));
        assert!(preview.contains("********"));
    }

    #[test]
    fn test_init_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let service = ConfigService::with_path(dir.path().join("nested").join("config.toml"));

        init(&service).unwrap();
        assert!(service.path().exists());

        let before = std::fs::read_to_string(service.path()).unwrap();
        init(&service).unwrap();
        assert_eq!(std::fs::read_to_string(service.path()).unwrap(), before);
    }
}
