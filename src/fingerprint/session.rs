// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Fingerprint Session
 * One invocation against one target: active tree walk, comment injection
 * scan and OS probe, with the result handed to the session store once
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use super::mysql::{is_mysql_alias, mysql_decision_tree, INFORMATION_SCHEMA_FLOOR};
use super::os::{CleanupHook, NoopCleanup, OsHintProbe};
use super::ranges::VersionRangeProbe;
use super::store::SessionStore;
use super::tree::{DecisionTree, Leaf, Stage};
use crate::config::FingerprintConfig;
use crate::errors::FingerprintResult;
use crate::oracle::{CountingOracle, Oracle};
use crate::reporting::types::FingerprintSignal;
use crate::types::{DbmsOs, FingerprintMode, VersionBracket, VersionCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Server banner captured by the caller, with the release it advertises
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BannerInfo {
    pub text: String,
    pub derived: Option<VersionBracket>,
}

impl BannerInfo {
    /// Derive the release from the leading dotted version of the banner
    pub fn parse(text: &str) -> Self {
        let derived = VersionCode::parse_dotted(text)
            .map(|code| VersionBracket::exact(code.value()));

        Self {
            text: text.to_string(),
            derived,
        }
    }

    pub fn logging_enabled(&self) -> bool {
        self.text.trim_end().ends_with("-log")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Confirmed,
    #[default]
    NotThisEngine,
}

/// Final result of one session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DbmsFingerprint {
    pub session_id: String,
    pub mode: FingerprintMode,
    pub verdict: Verdict,
    pub active: Option<VersionBracket>,
    pub comment_injection: Option<VersionBracket>,
    pub banner: Option<BannerInfo>,
    pub os: Option<DbmsOs>,
    pub has_information_schema: bool,
    pub oracle_calls: usize,
    pub complete: bool,
    pub interruption: Option<String>,
}

impl DbmsFingerprint {
    pub fn is_confirmed(&self) -> bool {
        self.verdict == Verdict::Confirmed
    }

    /// Signals for the report builder, in collection order
    pub fn signals(&self) -> Vec<FingerprintSignal> {
        let mut signals = Vec::new();

        if !self.is_confirmed() {
            signals.push(FingerprintSignal::NotThisEngine);
        }
        if let Some(bracket) = self.active {
            signals.push(FingerprintSignal::ActiveProbe(bracket));
        }
        if let Some(bracket) = self.comment_injection {
            signals.push(FingerprintSignal::CommentInjection(bracket));
        }
        if let Some(banner) = &self.banner {
            signals.push(FingerprintSignal::Banner {
                text: banner.text.clone(),
                derived: banner.derived,
            });
        }
        if let Some(os) = self.os {
            signals.push(FingerprintSignal::DbmsOs(os.label().to_string()));
        }

        signals
    }
}

pub struct FingerprintSession<O: Oracle> {
    oracle: CountingOracle<O>,
    config: FingerprintConfig,
    tree: DecisionTree,
    ranges: VersionRangeProbe,
    os_probe: OsHintProbe,
    store: Option<Arc<dyn SessionStore>>,
    cleanup: Arc<dyn CleanupHook>,
    result: DbmsFingerprint,
}

impl<O: Oracle> FingerprintSession<O> {
    pub fn new(
        session_id: impl Into<String>,
        oracle: O,
        config: FingerprintConfig,
    ) -> FingerprintResult<Self> {
        let ranges = match &config.version_ranges {
            Some(ranges) => VersionRangeProbe::new(ranges.clone())?,
            None => VersionRangeProbe::mysql(),
        };

        let result = DbmsFingerprint {
            session_id: session_id.into(),
            mode: config.mode,
            complete: true,
            ..DbmsFingerprint::default()
        };

        Ok(Self {
            oracle: CountingOracle::new(oracle),
            config,
            tree: mysql_decision_tree(),
            ranges,
            os_probe: OsHintProbe::new(),
            store: None,
            cleanup: Arc::new(NoopCleanup),
            result,
        })
    }

    pub fn with_banner(mut self, banner: BannerInfo) -> Self {
        self.result.banner = Some(banner);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_cleanup(mut self, cleanup: Arc<dyn CleanupHook>) -> Self {
        self.cleanup = cleanup;
        self
    }

    pub fn result(&self) -> &DbmsFingerprint {
        &self.result
    }

    pub fn oracle_calls(&self) -> usize {
        self.oracle.calls()
    }

    /// Confirm the engine family and bracket its release.
    ///
    /// Returns `Ok(false)` when the target is definitely not MySQL. Fails only
    /// when the oracle dropped out before anything was confirmed.
    pub async fn check_dbms(&mut self) -> FingerprintResult<bool> {
        info!("[FingerprintSession] Testing MySQL");

        if self.banner_short_circuit() && !self.config.is_extensive() {
            return Ok(true);
        }

        info!("[FingerprintSession] Confirming MySQL");

        let stop_at = match self.config.mode {
            FingerprintMode::Basic => Some(Stage::Generation),
            FingerprintMode::Extensive => None,
        };

        let walk = match self.tree.walk(&self.oracle, stop_at).await {
            Ok(walk) => walk,
            // the banner already confirmed the engine
            Err(e) if e.is_oracle_unavailable() && self.result.active.is_some() => {
                warn!("[FingerprintSession] Active fingerprint aborted: {}", e);
                self.mark_interrupted(Some(e.to_string()));
                return Ok(true);
            }
            Err(e) => return Err(e),
        };

        let bracket = match walk.leaf {
            Leaf::NotThisEngine => {
                warn!("[FingerprintSession] The back-end DBMS is not MySQL");
                self.result.verdict = Verdict::NotThisEngine;
                self.result.active = None;
                return Ok(false);
            }
            Leaf::Bracket { bracket } => bracket,
        };

        info!(
            oracle_calls = walk.oracle_calls,
            "[FingerprintSession] The back-end DBMS is MySQL {}", bracket
        );

        self.result.verdict = Verdict::Confirmed;
        self.result.active = Some(self.result.active.map_or(bracket, |seeded| seeded.refine(bracket)));
        self.result.has_information_schema = self.result.has_information_schema
            || bracket
                .floor()
                .is_some_and(|floor| floor.value() >= INFORMATION_SCHEMA_FLOOR);

        if !walk.complete {
            self.mark_interrupted(walk.interruption);
        }

        Ok(true)
    }

    /// Forced MySQL plus a banner-derived release: record it without probing
    fn banner_short_circuit(&mut self) -> bool {
        let forced = self
            .config
            .forced_dbms
            .as_deref()
            .is_some_and(is_mysql_alias);

        let derived = self
            .result
            .banner
            .as_ref()
            .and_then(|banner| banner.derived)
            .filter(|bracket| bracket.floor().is_some());

        let Some(bracket) = derived.filter(|_| forced) else {
            return false;
        };

        info!("[FingerprintSession] Using banner release MySQL {}", bracket);

        self.result.verdict = Verdict::Confirmed;
        self.result.active = Some(bracket);
        self.result.has_information_schema = bracket.floor().is_some_and(|floor| floor.major() >= 5);

        true
    }

    /// Comment injection refinement; an oracle failure keeps whatever was reached
    pub async fn comment_check(&mut self) -> FingerprintResult<Option<VersionBracket>> {
        let outcome = self.ranges.run(&self.oracle).await;
        let scan = match outcome {
            Ok(scan) => scan,
            Err(e) if e.is_oracle_unavailable() => {
                warn!("[FingerprintSession] Comment injection fingerprint aborted: {}", e);
                self.mark_interrupted(Some(e.to_string()));
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if !scan.complete {
            self.mark_interrupted(Some("oracle unavailable during comment injection scan".to_string()));
        }

        let bracket = Some(scan.bracket).filter(VersionBracket::is_known);
        self.result.comment_injection = bracket;

        Ok(bracket)
    }

    pub async fn detect_os(&mut self) -> FingerprintResult<Option<DbmsOs>> {
        let outcome = self.os_probe.detect(&self.oracle, self.cleanup.as_ref()).await;
        match outcome {
            Ok(os) => {
                self.result.os = Some(os);
                Ok(Some(os))
            }
            Err(e) if e.is_oracle_unavailable() => {
                warn!("[FingerprintSession] OS fingerprint aborted: {}", e);
                self.mark_interrupted(Some(e.to_string()));
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn mark_interrupted(&mut self, reason: Option<String>) {
        self.result.complete = false;
        if self.result.interruption.is_none() {
            self.result.interruption = reason;
        }
    }

    /// Run every stage the configuration enables and record the result once
    pub async fn run(mut self) -> FingerprintResult<DbmsFingerprint> {
        if self.check_dbms().await? {
            if self.config.is_extensive() && self.config.comment_check {
                self.comment_check().await?;
            }

            if self.config.detect_os {
                self.detect_os().await?;
            }
        }

        self.result.oracle_calls = self.oracle.calls();

        info!(
            session_id = %self.result.session_id,
            oracle_calls = self.result.oracle_calls,
            complete = self.result.complete,
            "[FingerprintSession] Fingerprint finished"
        );

        if let Some(store) = &self.store {
            store.record(&self.result)?;
        }

        Ok(self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FingerprintError;
    use crate::fingerprint::store::MemoryStore;
    use crate::oracle::DecodeMode;
    use async_trait::async_trait;

    /// Every probe fails, so any call at all shows up as an error
    struct SilentOracle;

    #[async_trait]
    impl Oracle for SilentOracle {
        async fn evaluate(&self, _predicate: &str) -> FingerprintResult<bool> {
            Err(FingerprintError::oracle_unavailable("silent"))
        }

        async fn evaluate_text(
            &self,
            _expression: &str,
            _mode: DecodeMode,
        ) -> FingerprintResult<Option<String>> {
            Err(FingerprintError::oracle_unavailable("silent"))
        }
    }

    fn forced_mysql() -> FingerprintConfig {
        FingerprintConfig {
            forced_dbms: Some("MySQL".to_string()),
            detect_os: false,
            ..FingerprintConfig::default()
        }
    }

    #[test]
    fn test_banner_parse() {
        let banner = BannerInfo::parse("5.0.45-log");
        assert_eq!(banner.derived, Some(VersionBracket::exact(50045)));
        assert!(banner.logging_enabled());

        let banner = BannerInfo::parse("MariaDB");
        assert_eq!(banner.derived, None);
        assert!(!banner.logging_enabled());
    }

    #[tokio::test]
    async fn test_banner_short_circuit_skips_oracle() {
        let store = Arc::new(MemoryStore::new());
        let session = FingerprintSession::new("s1", SilentOracle, forced_mysql())
            .unwrap()
            .with_banner(BannerInfo::parse("5.1.42"))
            .with_store(store.clone());

        let fingerprint = session.run().await.unwrap();

        assert!(fingerprint.is_confirmed());
        assert_eq!(fingerprint.active, Some(VersionBracket::exact(50142)));
        assert!(fingerprint.has_information_schema);
        assert_eq!(fingerprint.oracle_calls, 0);
        assert!(store.get("s1").is_some());
    }

    #[tokio::test]
    async fn test_oracle_failure_before_confirmation_is_error() {
        let session = FingerprintSession::new("s2", SilentOracle, FingerprintConfig::default()).unwrap();
        let err = session.run().await.unwrap_err();
        assert!(err.is_oracle_unavailable());
    }

    #[test]
    fn test_invalid_range_override_rejected() {
        let config = FingerprintConfig {
            version_ranges: Some(vec![crate::types::VersionRange::new(10, 5)]),
            ..FingerprintConfig::default()
        };
        assert!(FingerprintSession::new("s3", SilentOracle, config).is_err());
    }

    #[test]
    fn test_signals_order() {
        let fingerprint = DbmsFingerprint {
            verdict: Verdict::Confirmed,
            active: Some(VersionBracket::at_least(50000)),
            banner: Some(BannerInfo::parse("5.0.45")),
            os: Some(DbmsOs::Posix),
            ..DbmsFingerprint::default()
        };

        let signals = fingerprint.signals();
        assert_eq!(signals.len(), 3);
        assert_eq!(signals[0], FingerprintSignal::ActiveProbe(VersionBracket::at_least(50000)));
        assert_eq!(signals[2], FingerprintSignal::DbmsOs("Linux".to_string()));
    }
}
