// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{FingerprintMode, VersionRange};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FingerprintConfig {
    #[serde(default)]
    pub mode: FingerprintMode,

    /// DBMS the operator asserts the target runs, e.g. `mysql`
    #[serde(default)]
    pub forced_dbms: Option<String>,

    #[serde(default = "default_true")]
    pub detect_os: bool,

    #[serde(default = "default_true")]
    pub comment_check: bool,

    /// Replaces the built-in release table used by the comment-injection scan
    #[serde(default)]
    pub version_ranges: Option<Vec<VersionRange>>,

    #[validate(nested)]
    #[serde(default)]
    pub inference: InferenceConfig,

    #[validate(nested)]
    #[serde(default)]
    pub http: Option<HttpChannelConfig>,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InferenceConfig {
    #[validate(range(min = 1, max = 4096))]
    #[serde(default = "default_max_length")]
    pub max_length: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HttpChannelConfig {
    #[validate(url)]
    pub url: String,

    #[validate(length(min = 1))]
    pub parameter: String,

    #[serde(default = "default_value")]
    pub value: String,

    #[serde(default)]
    pub prefix: String,

    #[serde(default)]
    pub suffix: String,

    #[validate(range(min = 1, max = 3600))]
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[validate(range(min = 0, max = 10))]
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_true() -> bool {
    true
}

fn default_max_length() -> u32 {
    crate::oracle::inference::DEFAULT_MAX_LENGTH
}

fn default_value() -> String {
    "1".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    2
}

fn default_similarity_threshold() -> f64 {
    0.95
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            mode: FingerprintMode::Basic,
            forced_dbms: None,
            detect_os: true,
            comment_check: true,
            version_ranges: None,
            inference: InferenceConfig::default(),
            http: None,
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
        }
    }
}

impl Default for HttpChannelConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            parameter: String::new(),
            value: default_value(),
            prefix: String::new(),
            suffix: String::new(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl FingerprintConfig {
    pub fn is_extensive(&self) -> bool {
        self.mode.is_extensive()
    }
}
