use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::importer::ColumnAliases;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        WebConfig {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

// flight logs of long missions run into tens of megabytes
fn default_max_upload_bytes() -> usize {
    64 * 1024 * 1024
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub base_folder: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportConfig {
    #[serde(default)]
    pub columns: ColumnAliases,
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::from_yaml("storage:\n  base_folder: /var/lib/flights\n").unwrap();

        assert_eq!(config.storage.base_folder, PathBuf::from("/var/lib/flights"));
        assert_eq!(config.web.bind, "0.0.0.0:8080");
        assert_eq!(config.web.max_upload_bytes, 64 * 1024 * 1024);
        assert_eq!(config.import.columns, ColumnAliases::default());
    }

    #[test]
    fn column_overrides_keep_other_defaults() {
        let yaml = r#"
storage:
  base_folder: ./flights
web:
  bind: 127.0.0.1:9000
import:
  columns:
    battery_percent: ["battery(%)", "BATTERY.chargeLevel"]
"#;
        let config = Config::from_yaml(yaml).unwrap();
        let columns = &config.import.columns;

        assert_eq!(config.web.bind, "127.0.0.1:9000");
        assert_eq!(
            columns.battery_percent,
            vec!["battery(%)".to_string(), "BATTERY.chargeLevel".to_string()]
        );
        assert_eq!(columns.latitude, vec!["OSD.latitude".to_string()]);
    }

    #[test]
    fn storage_section_is_required() {
        assert!(matches!(
            Config::from_yaml("web:\n  bind: 0.0.0.0:1\n"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
