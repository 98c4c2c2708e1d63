use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use waypoint_infrastructure::ConfigService;

/// Config service for an explicit file, or for the default location.
pub fn config_service(path: Option<PathBuf>) -> Result<ConfigService> {
    match path {
        Some(path) => Ok(ConfigService::with_path(path)),
        None => ConfigService::new().context("Failed to locate configuration directory"),
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} as JSON", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::io::Write;

    #[test]
    fn test_read_json_reports_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = read_json::<Value>(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_explicit_config_path_is_used() {
        let service = config_service(Some(PathBuf::from("/tmp/waypoint.toml"))).unwrap();
        assert_eq!(service.path(), Path::new("/tmp/waypoint.toml"));
    }
}
