// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - DBMS Fingerprint Library
 * Blind boolean-oracle MySQL version fingerprinting
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

pub mod config;
pub mod errors;
pub mod types;

// Oracle contract and reference channels
pub mod oracle;
pub mod http_client;

// Decision tree, comment injection scan, OS probe and sessions
pub mod fingerprint;

pub mod reporting;

pub use errors::{FingerprintError, FingerprintResult};
pub use fingerprint::{BannerInfo, DbmsFingerprint, FingerprintSession};
pub use oracle::{DecodeMode, Oracle};
pub use types::{FingerprintMode, VersionBracket, VersionCode, VersionRange};
