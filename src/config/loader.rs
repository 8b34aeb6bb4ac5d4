// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::core::{FingerprintConfig, HttpChannelConfig};
use crate::types::FingerprintMode;
use super::validation::ConfigValidator;

pub struct ConfigLoader {
    config_path: PathBuf,
    format: ConfigFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigLoader {
    pub fn new<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let path = config_path.as_ref().to_path_buf();
        let format = Self::detect_format(&path)?;

        Ok(Self {
            config_path: path,
            format,
        })
    }

    pub fn with_format<P: AsRef<Path>>(config_path: P, format: ConfigFormat) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            format,
        }
    }

    fn detect_format(path: &Path) -> Result<ConfigFormat> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| anyhow::anyhow!("Could not determine config file format"))?;

        match extension {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(anyhow::anyhow!("Unsupported config file format: {}", extension)),
        }
    }

    pub fn load_config(&self) -> Result<FingerprintConfig> {
        let content = std::fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file: {:?}", self.config_path))?;

        let mut config = Self::parse(&content, self.format)?;

        self.apply_env_overrides(&mut config)?;

        ConfigValidator::validate_fingerprint_config(&config)?;

        Ok(config)
    }

    pub fn parse(content: &str, format: ConfigFormat) -> Result<FingerprintConfig> {
        let config: FingerprintConfig = match format {
            ConfigFormat::Yaml => {
                serde_yaml::from_str(content).context("Failed to parse YAML config")?
            }
            ConfigFormat::Toml => toml::from_str(content).context("Failed to parse TOML config")?,
            ConfigFormat::Json => {
                serde_json::from_str(content).context("Failed to parse JSON config")?
            }
        };

        Ok(config)
    }

    fn apply_env_overrides(&self, config: &mut FingerprintConfig) -> Result<()> {
        if let Ok(mode) = std::env::var("FINGERPRINT_MODE") {
            config.mode = mode
                .parse::<FingerprintMode>()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("Invalid FINGERPRINT_MODE")?;
        }

        if let Ok(dbms) = std::env::var("FINGERPRINT_FORCED_DBMS") {
            config.forced_dbms = Some(dbms);
        }

        if let Ok(url) = std::env::var("FINGERPRINT_TARGET_URL") {
            config
                .http
                .get_or_insert_with(HttpChannelConfig::default)
                .url = url;
        }

        if let Ok(timeout) = std::env::var("FINGERPRINT_TIMEOUT_SECS") {
            if let Some(http) = config.http.as_mut() {
                http.timeout_secs = timeout.parse().context("Invalid FINGERPRINT_TIMEOUT_SECS")?;
            }
        }

        if let Ok(log_level) = std::env::var("LOG_LEVEL") {
            config.observability.log_level = log_level;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VersionRange;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_detect_format() {
        assert_eq!(
            ConfigLoader::detect_format(Path::new("fingerprint.yaml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigLoader::detect_format(Path::new("fingerprint.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigLoader::detect_format(Path::new("fingerprint.json")).unwrap(),
            ConfigFormat::Json
        );
        assert!(ConfigLoader::detect_format(Path::new("fingerprint.ini")).is_err());
    }

    #[test]
    fn test_load_yaml_config() -> Result<()> {
        let yaml_content = r#"
mode: extensive
forced_dbms: mysql
detect_os: false
version_ranges:
  - lower: 50000
    upper: 50090
  - lower: 50100
    upper: 50142
http:
  url: "http://target.local/item.php"
  parameter: id
  similarity_threshold: 0.9
"#;

        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(yaml_content.as_bytes())?;
        temp_file.flush()?;

        let loader = ConfigLoader::with_format(temp_file.path(), ConfigFormat::Yaml);
        let config = loader.load_config()?;

        assert_eq!(config.mode, FingerprintMode::Extensive);
        assert_eq!(config.forced_dbms.as_deref(), Some("mysql"));
        assert!(!config.detect_os);
        assert!(config.comment_check);
        assert_eq!(
            config.version_ranges,
            Some(vec![
                VersionRange::new(50000, 50090),
                VersionRange::new(50100, 50142)
            ])
        );

        let http = config.http.expect("http section");
        assert_eq!(http.parameter, "id");
        assert_eq!(http.value, "1");
        assert_eq!(http.timeout_secs, 30);

        Ok(())
    }

    #[test]
    fn test_parse_toml_defaults() -> Result<()> {
        let config = ConfigLoader::parse("mode = \"basic\"\n", ConfigFormat::Toml)?;
        assert_eq!(config.mode, FingerprintMode::Basic);
        assert!(config.detect_os);
        assert!(config.http.is_none());
        assert_eq!(config.inference.max_length, 256);
        Ok(())
    }

    #[test]
    fn test_overlapping_ranges_rejected() -> Result<()> {
        let json = r#"{"version_ranges": [{"lower": 50000, "upper": 50100}, {"lower": 50090, "upper": 50142}]}"#;

        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(json.as_bytes())?;
        temp_file.flush()?;

        let loader = ConfigLoader::with_format(temp_file.path(), ConfigFormat::Json);
        assert!(loader.load_config().is_err());

        Ok(())
    }
}
