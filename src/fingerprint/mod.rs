// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

pub mod mysql;
pub mod os;
pub mod probe;
pub mod ranges;
pub mod session;
pub mod store;
pub mod tree;

pub use mysql::{mysql_decision_tree, MYSQL_ALIASES, MYSQL_VERSION_RANGES};
pub use os::{CleanupHook, NoopCleanup, OsHintProbe};
pub use probe::Probe;
pub use ranges::{RangeScan, VersionRangeProbe};
pub use session::{BannerInfo, DbmsFingerprint, FingerprintSession, Verdict};
pub use store::{MemoryStore, SessionStore};
pub use tree::{DecisionNode, DecisionTree, Leaf, Stage, TreeWalk};
