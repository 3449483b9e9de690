use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::TallyConfig;
use crate::error::{Result, TallyError};
use crate::reports::ReportFormat;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Settings given explicitly on the command line.
///
/// `None` fields are skipped so they never mask lower layers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CliOverrides {
    pub discovery: DiscoveryOverrides,
    pub pool: PoolOverrides,
    pub report: ReportOverrides,
    pub run: RunOverrides,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PoolOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace_period_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub console_top: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_top: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ReportFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_report: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_on_empty: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<bool>,
}

impl TallyConfig {
    /// Load the layered configuration.
    ///
    /// Priority, lowest first: embedded defaults, user config, working
    /// directory config, `custom_config`, `WORDTALLY_*` environment
    /// variables, CLI overrides.
    pub fn load(custom_config: Option<&Path>, cli_overrides: Option<&CliOverrides>) -> Result<Self> {
        tracing::trace!("CONFIG LOAD: Starting");

        let user_config = Self::user_config_path();
        let mut figment = Figment::new()
            .merge(Toml::string(DEFAULT_CONFIG))
            .merge(Toml::file(&user_config))
            .merge(Toml::file("wordtally.toml"))
            .merge(Json::file("wordtally.json"))
            .merge(Yaml::file("wordtally.yaml"))
            .merge(Yaml::file("wordtally.yml"));

        if let Some(path) = custom_config {
            if !path.is_file() {
                return Err(TallyError::config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => figment.merge(Json::file(path)),
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
                _ => figment.merge(Toml::file(path)),
            };
        }

        // Environment variables beat every file
        figment = figment.merge(Env::prefixed("WORDTALLY_").split("__"));

        if let Some(overrides) = cli_overrides {
            tracing::trace!("CONFIG LOAD: Applying CLI overrides");
            figment = figment.merge(Serialized::defaults(overrides));
        }

        let config: TallyConfig = figment
            .extract()
            .map_err(|e| TallyError::config(format!("Invalid configuration: {e}")))?;
        config.validate()?;

        tracing::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    fn user_config_path() -> PathBuf {
        match std::env::var("HOME") {
            Ok(home) => PathBuf::from(home).join(".config/wordtally/config.toml"),
            Err(_) => PathBuf::from("~/.config/wordtally/config.toml"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_config_loads_defaults() {
        let config = TallyConfig::load(None, None).expect("Should load default config");
        assert_eq!(config.discovery.extensions, vec!["txt".to_string()]);
        assert_eq!(config.report.console_top, 20);
        assert_eq!(config.report.report_top, 50);
        assert_eq!(config.pool.grace_period_ms, 5000);
    }

    #[test]
    fn test_embedded_defaults_match_code_defaults() {
        let config: TallyConfig = Figment::new()
            .merge(Toml::string(DEFAULT_CONFIG))
            .extract()
            .unwrap();
        assert_eq!(config, TallyConfig::default());
    }

    #[test]
    fn test_custom_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        fs::write(&path, "[pool]\nthreads = 3\n\n[report]\nconsole_top = 5\n").unwrap();

        let config = TallyConfig::load(Some(&path), None).unwrap();
        assert_eq!(config.pool.threads, Some(3));
        assert_eq!(config.report.console_top, 5);
        assert_eq!(config.report.report_top, 50);
    }

    #[test]
    fn test_missing_custom_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = TallyConfig::load(Some(&temp_dir.path().join("missing.toml")), None);
        assert!(result.unwrap_err().is_fatal());
    }

    #[test]
    fn test_cli_overrides_win() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.json");
        fs::write(&path, r#"{"pool": {"threads": 3}, "run": {"progress": true}}"#).unwrap();

        let overrides = CliOverrides {
            pool: PoolOverrides {
                threads: Some(6),
                ..Default::default()
            },
            ..Default::default()
        };

        let config = TallyConfig::load(Some(&path), Some(&overrides)).unwrap();
        assert_eq!(config.pool.threads, Some(6));
        assert!(config.run.progress);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let overrides = CliOverrides {
            pool: PoolOverrides {
                threads: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(TallyConfig::load(None, Some(&overrides)).is_err());
    }
}
