// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use crate::errors::{FingerprintError, FingerprintResult};
use crate::oracle::{DecodeMode, Oracle};
use rand::Rng;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// One feature-availability question asked of the oracle
#[derive(Debug, Clone)]
pub enum Probe {
    /// Boolean predicate, answered by `Oracle::evaluate`
    Predicate(String),

    /// Scalar result equals `expected`
    TextEquals {
        expression: String,
        mode: DecodeMode,
        expected: String,
    },

    /// Scalar result is present and non-empty
    TextPresent {
        expression: String,
        mode: DecodeMode,
    },

    /// Scalar result matches `pattern`
    TextMatches {
        expression: String,
        mode: DecodeMode,
        pattern: Regex,
    },

    /// `SELECT <r> FROM <table> LIMIT 0, 1` echoes a fresh random digit,
    /// i.e. the catalog table exists and is readable
    CatalogEcho {
        table: String,
    },
}

impl Probe {
    pub fn predicate(predicate: &str) -> Self {
        Probe::Predicate(predicate.to_string())
    }

    pub fn text_equals(expression: &str, mode: DecodeMode, expected: &str) -> Self {
        Probe::TextEquals {
            expression: expression.to_string(),
            mode,
            expected: expected.to_string(),
        }
    }

    pub fn text_present(expression: &str) -> Self {
        Probe::TextPresent {
            expression: expression.to_string(),
            mode: DecodeMode::Default,
        }
    }

    pub fn text_matches(expression: &str, pattern: &Regex) -> Self {
        Probe::TextMatches {
            expression: expression.to_string(),
            mode: DecodeMode::Default,
            pattern: pattern.clone(),
        }
    }

    /// Compile `pattern` once, up front
    pub fn try_text_matches(expression: &str, pattern: &str) -> FingerprintResult<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            FingerprintError::Configuration(format!("Invalid probe pattern {}: {}", pattern, e))
        })?;
        Ok(Self::text_matches(expression, &pattern))
    }

    pub fn catalog_echo(table: &str) -> Self {
        Probe::CatalogEcho {
            table: table.to_string(),
        }
    }

    pub async fn evaluate<O: Oracle + ?Sized>(
        &self,
        oracle: &O,
        memo: &mut TextMemo,
    ) -> FingerprintResult<bool> {
        let outcome = match self {
            Probe::Predicate(predicate) => {
                memo.oracle_calls += 1;
                oracle.evaluate(predicate).await?
            }
            Probe::TextEquals {
                expression,
                mode,
                expected,
            } => memo.fetch(oracle, expression, *mode).await?.as_deref() == Some(expected.as_str()),
            Probe::TextPresent { expression, mode } => memo
                .fetch(oracle, expression, *mode)
                .await?
                .is_some_and(|value| !value.is_empty()),
            Probe::TextMatches {
                expression,
                mode,
                pattern,
            } => memo
                .fetch(oracle, expression, *mode)
                .await?
                .is_some_and(|value| pattern.is_match(&value)),
            Probe::CatalogEcho { table } => {
                let marker = fresh_digit().to_string();
                let expression = format!("SELECT {} FROM {} LIMIT 0, 1", marker, table);
                memo.oracle_calls += 1;
                oracle
                    .evaluate_text(&expression, DecodeMode::Digits)
                    .await?
                    .as_deref()
                    == Some(marker.as_str())
            }
        };

        debug!("[Probe] {} => {}", self, outcome);

        Ok(outcome)
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Probe::Predicate(predicate) => write!(f, "{}", predicate),
            Probe::TextEquals {
                expression,
                expected,
                ..
            } => write!(f, "{} = '{}'", expression, expected),
            Probe::TextPresent { expression, .. } => write!(f, "{} IS NOT EMPTY", expression),
            Probe::TextMatches {
                expression,
                pattern,
                ..
            } => write!(f, "{} ~ /{}/", expression, pattern),
            Probe::CatalogEcho { table } => write!(f, "echo FROM {}", table),
        }
    }
}

impl PartialEq for Probe {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Probe::Predicate(a), Probe::Predicate(b)) => a == b,
            (
                Probe::TextEquals {
                    expression: a,
                    mode: ma,
                    expected: ea,
                },
                Probe::TextEquals {
                    expression: b,
                    mode: mb,
                    expected: eb,
                },
            ) => a == b && ma == mb && ea == eb,
            (
                Probe::TextPresent { expression: a, mode: ma },
                Probe::TextPresent { expression: b, mode: mb },
            ) => a == b && ma == mb,
            (
                Probe::TextMatches {
                    expression: a,
                    mode: ma,
                    pattern: pa,
                },
                Probe::TextMatches {
                    expression: b,
                    mode: mb,
                    pattern: pb,
                },
            ) => a == b && ma == mb && pa.as_str() == pb.as_str(),
            (Probe::CatalogEcho { table: a }, Probe::CatalogEcho { table: b }) => a == b,
            _ => false,
        }
    }
}

/// Scalar results already fetched during one walk, keyed by expression and mode.
/// Oracle answers are consistent within a session, so a repeated expression is
/// never re-fetched.
#[derive(Debug, Default)]
pub struct TextMemo {
    values: HashMap<(String, DecodeMode), Option<String>>,
    oracle_calls: usize,
}

impl TextMemo {
    pub fn oracle_calls(&self) -> usize {
        self.oracle_calls
    }

    async fn fetch<O: Oracle + ?Sized>(
        &mut self,
        oracle: &O,
        expression: &str,
        mode: DecodeMode,
    ) -> FingerprintResult<Option<String>> {
        let key = (expression.to_string(), mode);
        if let Some(value) = self.values.get(&key) {
            return Ok(value.clone());
        }

        self.oracle_calls += 1;
        let value = oracle.evaluate_text(expression, mode).await?;
        self.values.insert(key, value.clone());

        Ok(value)
    }
}

/// Single random digit for catalog echo probes
fn fresh_digit() -> u32 {
    rand::rng().random_range(1..=9)
}

/// Four-digit random integer for comment-injection predicates
pub(crate) fn fresh_int() -> u32 {
    rand::rng().random_range(1000..10000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use regex::Regex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes catalog markers and answers a fixed value for everything else
    struct EchoOracle {
        value: Option<String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Oracle for EchoOracle {
        async fn evaluate(&self, _predicate: &str) -> FingerprintResult<bool> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(true)
        }

        async fn evaluate_text(
            &self,
            expression: &str,
            _mode: DecodeMode,
        ) -> FingerprintResult<Option<String>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            let echo = Regex::new(r"^SELECT (\d+) FROM").unwrap();
            if let Some(caps) = echo.captures(expression) {
                return Ok(Some(caps[1].to_string()));
            }
            Ok(self.value.clone())
        }
    }

    fn oracle(value: Option<&str>) -> EchoOracle {
        EchoOracle {
            value: value.map(str::to_string),
            calls: AtomicUsize::new(0),
        }
    }

    #[tokio::test]
    async fn test_catalog_echo_matches_marker() {
        let oracle = oracle(None);
        let mut memo = TextMemo::default();
        let probe = Probe::catalog_echo("information_schema.TABLES");
        assert!(probe.evaluate(&oracle, &mut memo).await.unwrap());
        assert_eq!(memo.oracle_calls(), 1);
    }

    #[tokio::test]
    async fn test_text_memo_avoids_repeat_calls() {
        let oracle = oracle(Some("2"));
        let mut memo = TextMemo::default();

        let three = Probe::text_equals("SELECT COERCIBILITY(USER())", DecodeMode::Digits, "3");
        let two = Probe::text_equals("SELECT COERCIBILITY(USER())", DecodeMode::Digits, "2");

        assert!(!three.evaluate(&oracle, &mut memo).await.unwrap());
        assert!(two.evaluate(&oracle, &mut memo).await.unwrap());
        assert_eq!(memo.oracle_calls(), 1);
        assert_eq!(oracle.calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_text_present_rejects_empty_and_null() {
        let mut memo = TextMemo::default();
        let probe = Probe::text_present("SELECT CURRENT_USER()");
        assert!(!probe.evaluate(&oracle(Some("")), &mut memo).await.unwrap());

        let mut memo = TextMemo::default();
        assert!(!probe.evaluate(&oracle(None), &mut memo).await.unwrap());

        let mut memo = TextMemo::default();
        assert!(probe.evaluate(&oracle(Some("root@localhost")), &mut memo).await.unwrap());
    }

    #[tokio::test]
    async fn test_text_matches_user_host() {
        let probe = Probe::try_text_matches("SELECT USER()", r"@[\w.\-_]+").unwrap();

        let mut memo = TextMemo::default();
        assert!(probe.evaluate(&oracle(Some("root@db-01.local")), &mut memo).await.unwrap());

        let mut memo = TextMemo::default();
        assert!(!probe.evaluate(&oracle(Some("root")), &mut memo).await.unwrap());
    }

    #[test]
    fn test_invalid_pattern_rejected_at_construction() {
        let err = Probe::try_text_matches("SELECT USER()", "([").unwrap_err();
        assert!(matches!(err, FingerprintError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_compiled_pattern_reused_across_evaluations() {
        let probe = Probe::try_text_matches("SELECT USER()", r"@[\w.\-_]+").unwrap();
        let Probe::TextMatches { pattern, .. } = &probe else {
            panic!("expected a pattern probe");
        };
        assert_eq!(pattern.as_str(), r"@[\w.\-_]+");

        for (value, expected) in [("root@localhost", true), ("root", false)] {
            let mut memo = TextMemo::default();
            assert_eq!(probe.evaluate(&oracle(Some(value)), &mut memo).await.unwrap(), expected);
        }

        let same = Probe::try_text_matches("SELECT USER()", r"@[\w.\-_]+").unwrap();
        assert_eq!(probe, same);
        assert_ne!(probe, Probe::try_text_matches("SELECT USER()", "@").unwrap());
    }

    #[test]
    fn test_fresh_values_in_range() {
        for _ in 0..100 {
            assert!((1..=9).contains(&fresh_digit()));
            assert!((1000..10000).contains(&fresh_int()));
        }
    }
}
