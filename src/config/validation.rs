// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use validator::Validate;

use super::core::{FingerprintConfig, HttpChannelConfig};
use crate::fingerprint::ranges::validate_ranges;

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate_fingerprint_config(config: &FingerprintConfig) -> Result<()> {
        config
            .validate()
            .context("Configuration validation failed")?;

        Self::validate_forced_dbms(config)?;
        Self::validate_version_ranges(config)?;

        if let Some(http) = &config.http {
            Self::validate_http_config(http)?;
        }

        Ok(())
    }

    fn validate_forced_dbms(config: &FingerprintConfig) -> Result<()> {
        if let Some(dbms) = &config.forced_dbms {
            if dbms.trim().is_empty() {
                return Err(anyhow::anyhow!("Forced DBMS cannot be empty when set"));
            }
        }

        Ok(())
    }

    fn validate_version_ranges(config: &FingerprintConfig) -> Result<()> {
        if let Some(ranges) = &config.version_ranges {
            if ranges.is_empty() {
                return Err(anyhow::anyhow!("Version range table cannot be empty when set"));
            }

            validate_ranges(ranges).context("Invalid version range table")?;
        }

        Ok(())
    }

    fn validate_http_config(http: &HttpChannelConfig) -> Result<()> {
        if !http.url.starts_with("http://") && !http.url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "Target URL must start with http:// or https://"
            ));
        }

        if http.parameter.contains('=') || http.parameter.contains('&') {
            return Err(anyhow::anyhow!(
                "Parameter name must not contain '=' or '&': {}",
                http.parameter
            ));
        }

        if http.similarity_threshold < 0.5 {
            tracing::warn!(
                "Similarity threshold {:.2} is low; false branches may read as true",
                http.similarity_threshold
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VersionRange;

    fn http_config(url: &str) -> HttpChannelConfig {
        HttpChannelConfig {
            url: url.to_string(),
            parameter: "id".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ConfigValidator::validate_fingerprint_config(&FingerprintConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let config = FingerprintConfig {
            http: Some(http_config("ftp://target.local/item")),
            ..Default::default()
        };
        assert!(ConfigValidator::validate_fingerprint_config(&config).is_err());
    }

    #[test]
    fn test_rejects_threshold_out_of_bounds() {
        let mut http = http_config("http://target.local/item.php");
        http.similarity_threshold = 1.5;
        let config = FingerprintConfig {
            http: Some(http),
            ..Default::default()
        };
        assert!(ConfigValidator::validate_fingerprint_config(&config).is_err());
    }

    #[test]
    fn test_rejects_descending_ranges() {
        let config = FingerprintConfig {
            version_ranges: Some(vec![
                VersionRange::new(50100, 50142),
                VersionRange::new(50000, 50090),
            ]),
            ..Default::default()
        };
        assert!(ConfigValidator::validate_fingerprint_config(&config).is_err());
    }

    #[test]
    fn test_rejects_empty_forced_dbms() {
        let config = FingerprintConfig {
            forced_dbms: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(ConfigValidator::validate_fingerprint_config(&config).is_err());
    }
}
