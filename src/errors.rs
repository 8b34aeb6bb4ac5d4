// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Fingerprint Error Types
 * Error classification for oracle-driven DBMS fingerprinting
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use thiserror::Error;

/// Main fingerprinting error type
#[derive(Error, Debug)]
pub enum FingerprintError {
    /// The oracle channel could not answer (network/protocol failure)
    #[error("Oracle unavailable: {reason}")]
    OracleUnavailable {
        reason: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Version range table is not ascending and disjoint
    #[error("Invalid version range {lower}-{upper}: {reason}")]
    InvalidVersionRange {
        lower: u32,
        upper: u32,
        reason: String,
    },

    /// Session store rejected the write
    #[error("Session store error: {0}")]
    SessionStore(String),
}

pub type FingerprintResult<T> = Result<T, FingerprintError>;

impl FingerprintError {
    pub fn oracle_unavailable(reason: impl Into<String>) -> Self {
        FingerprintError::OracleUnavailable {
            reason: reason.into(),
        }
    }

    /// Oracle failures are retryable by the oracle's owner; the core never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FingerprintError::OracleUnavailable { .. })
    }

    pub fn is_oracle_unavailable(&self) -> bool {
        matches!(self, FingerprintError::OracleUnavailable { .. })
    }
}

/// Convert reqwest errors to our error types
impl From<reqwest::Error> for FingerprintError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();

        let reason = if err.is_timeout() {
            format!("request timed out for {}", url)
        } else if err.is_connect() {
            format!("connection refused for {}", url)
        } else if err.is_body() || err.is_decode() {
            format!("malformed response from {}: {}", url, err)
        } else {
            err.to_string()
        };

        FingerprintError::OracleUnavailable { reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oracle_unavailable_is_retryable() {
        let err = FingerprintError::oracle_unavailable("connection reset");
        assert!(err.is_retryable());
        assert!(err.is_oracle_unavailable());
        assert_eq!(err.to_string(), "Oracle unavailable: connection reset");
    }

    #[test]
    fn test_configuration_not_retryable() {
        let err = FingerprintError::Configuration("missing url".to_string());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_invalid_range_display() {
        let err = FingerprintError::InvalidVersionRange {
            lower: 50100,
            upper: 50000,
            reason: "lower bound above upper bound".to_string(),
        };
        assert!(err.to_string().contains("50100-50000"));
    }
}
