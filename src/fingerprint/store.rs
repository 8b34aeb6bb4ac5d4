// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use super::session::DbmsFingerprint;
use crate::errors::{FingerprintError, FingerprintResult};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Receives the final fingerprint of each session, exactly once
pub trait SessionStore: Send + Sync {
    fn record(&self, fingerprint: &DbmsFingerprint) -> FingerprintResult<()>;
}

/// In-process store keyed by session id
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, DbmsFingerprint>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, session_id: &str) -> Option<DbmsFingerprint> {
        self.entries.read().get(session_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn record(&self, fingerprint: &DbmsFingerprint) -> FingerprintResult<()> {
        let mut entries = self.entries.write();

        if entries.contains_key(&fingerprint.session_id) {
            return Err(FingerprintError::SessionStore(format!(
                "session {} already recorded",
                fingerprint.session_id
            )));
        }

        entries.insert(fingerprint.session_id.clone(), fingerprint.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::session::Verdict;
    use crate::types::VersionBracket;

    fn fingerprint(id: &str) -> DbmsFingerprint {
        DbmsFingerprint {
            session_id: id.to_string(),
            verdict: Verdict::Confirmed,
            active: Some(VersionBracket::exact(50045)),
            ..DbmsFingerprint::default()
        }
    }

    #[test]
    fn test_record_once() {
        let store = MemoryStore::new();
        store.record(&fingerprint("s1")).unwrap();
        assert!(store.record(&fingerprint("s1")).is_err());
        store.record(&fingerprint("s2")).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(
            store.get("s1").and_then(|f| f.active),
            Some(VersionBracket::exact(50045))
        );
    }
}
