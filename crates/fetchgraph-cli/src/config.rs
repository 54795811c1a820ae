//! Optional `fetchgraph.toml` configuration.
//!
//! Command-line flags always take precedence over config values.

use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "fetchgraph.toml";
pub const DEFAULT_CATALOG_PATH: &str = "fetchgraph.catalog.json";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub output: Option<OutputFormat>,
}

impl CliConfig {
    /// Read an explicit config path, or `fetchgraph.toml` when it exists.
    pub fn load(explicit: Option<&str>) -> Result<Self, String> {
        let path = match explicit {
            Some(path) => path,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => DEFAULT_CONFIG_PATH,
            None => return Ok(Self::default()),
        };
        let text = fs::read_to_string(path)
            .map_err(|e| format!("failed to read config at {path}: {e}"))?;
        toml::from_str(&text).map_err(|e| format!("failed to parse config at {path}: {e}"))
    }

    pub fn catalog_path(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.catalog.clone())
            .unwrap_or_else(|| DEFAULT_CATALOG_PATH.to_string())
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn json_output(&self, flag: bool) -> bool {
        flag || self.output == Some(OutputFormat::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let config: CliConfig = toml::from_str(
            r#"
catalog = "catalogs/orders.json"
log_level = "debug"
output = "json"
"#,
        )
        .unwrap();
        assert_eq!(config.catalog_path(None), "catalogs/orders.json");
        assert_eq!(config.catalog_path(Some("other.toml".to_string())), "other.toml");
        assert_eq!(config.log_level(), "debug");
        assert!(config.json_output(false));
    }

    #[test]
    fn defaults_apply_without_config() {
        let config = CliConfig::default();
        assert_eq!(config.catalog_path(None), DEFAULT_CATALOG_PATH);
        assert_eq!(config.log_level(), DEFAULT_LOG_LEVEL);
        assert!(!config.json_output(false));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<CliConfig>("colour = \"blue\"").is_err());
    }
}
