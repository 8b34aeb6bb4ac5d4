// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use crate::errors::FingerprintResult;
use crate::oracle::{DecodeMode, Oracle};
use crate::types::DbmsOs;
use tokio::sync::OnceCell;
use tracing::info;

/// First character of the data directory path
pub const DATADIR_PROBE: &str = "SELECT MID(@@datadir, 1, 1)";

/// Invoked once the OS probe has finished with the target
pub trait CleanupHook: Send + Sync {
    fn cleanup(&self, only_file_table: bool);
}

/// Hook for callers with nothing to clean up
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCleanup;

impl CleanupHook for NoopCleanup {
    fn cleanup(&self, _only_file_table: bool) {}
}

/// `/` starts a POSIX path; anything else, including no value, is taken as Windows
pub fn classify(first_char: Option<&str>) -> DbmsOs {
    match first_char {
        Some("/") => DbmsOs::Posix,
        _ => DbmsOs::Windows,
    }
}

/// Single-shot host OS probe, cached for the lifetime of the session
#[derive(Debug, Default)]
pub struct OsHintProbe {
    detected: OnceCell<DbmsOs>,
}

impl OsHintProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self) -> Option<DbmsOs> {
        self.detected.get().copied()
    }

    pub async fn detect<O: Oracle + ?Sized>(
        &self,
        oracle: &O,
        hook: &dyn CleanupHook,
    ) -> FingerprintResult<DbmsOs> {
        if let Some(os) = self.cached() {
            return Ok(os);
        }

        let os = *self
            .detected
            .get_or_try_init(|| async {
                info!("[OsHintProbe] Fingerprinting the back-end DBMS operating system");

                let first = oracle.evaluate_text(DATADIR_PROBE, DecodeMode::Default).await?;
                let os = classify(first.as_deref());

                info!("[OsHintProbe] The back-end DBMS operating system is {}", os);
                hook.cleanup(true);

                Ok::<_, crate::errors::FingerprintError>(os)
            })
            .await?;

        Ok(os)
    }
}
