// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal release number, e.g. `50502` for 5.5.2 or `32314` for 3.23.14
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionCode(pub u32);

impl VersionCode {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        VersionCode(major * 10000 + minor * 100 + patch)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn major(&self) -> u32 {
        self.0 / 10000
    }

    /// Parse the leading `major.minor.patch` of a release string such as `5.0.45-log`
    pub fn parse_dotted(text: &str) -> Option<Self> {
        let numeric: String = text
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        let mut parts = numeric.split('.').filter(|p| !p.is_empty());
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next().map(str::parse::<u32>).transpose().ok()?.unwrap_or(0);
        let patch = parts.next().map(str::parse::<u32>).transpose().ok()?.unwrap_or(0);

        if minor > 99 || patch > 99 {
            return None;
        }

        Some(Self::new(major, minor, patch))
    }

    /// Dotted form using the digit-split rule of the release numbering:
    /// `3xxyy` splits as `3.xx.yy`, everything else as `d0.d2.d3..`
    pub fn dotted(&self) -> String {
        let digits = self.0.to_string();
        let major = &digits[..1];

        let minor = if major == "3" {
            digits.get(1..3).or_else(|| digits.get(1..))
        } else {
            digits.get(2..3)
        }
        .unwrap_or("");

        let patch = digits.get(3..).unwrap_or("");

        let mut dotted = major.to_string();
        if !minor.is_empty() {
            dotted.push('.');
            dotted.push_str(minor);
        }
        if !patch.is_empty() {
            let trimmed = patch.trim_start_matches('0');
            dotted.push('.');
            dotted.push_str(if trimmed.is_empty() { "0" } else { trimmed });
        }

        dotted
    }
}

impl fmt::Display for VersionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

impl From<u32> for VersionCode {
    fn from(code: u32) -> Self {
        VersionCode(code)
    }
}

/// Inclusive interval of release codes belonging to one minor family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRange {
    pub lower: VersionCode,
    pub upper: VersionCode,
}

impl VersionRange {
    pub const fn new(lower: u32, upper: u32) -> Self {
        Self {
            lower: VersionCode(lower),
            upper: VersionCode(upper),
        }
    }

    pub fn codes(&self) -> impl Iterator<Item = VersionCode> {
        (self.lower.0..=self.upper.0).map(VersionCode)
    }

    pub fn len(&self) -> usize {
        if self.upper < self.lower {
            0
        } else {
            (self.upper.0 - self.lower.0 + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Interval of possible releases of the back-end engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VersionBracket {
    Exact {
        version: VersionCode,
    },
    /// Lower bound inclusive, upper bound exclusive
    Bounded {
        lower: Option<VersionCode>,
        upper: Option<VersionCode>,
    },
    Unknown,
}

impl VersionBracket {
    pub fn exact(code: u32) -> Self {
        VersionBracket::Exact {
            version: VersionCode(code),
        }
    }

    pub fn at_least(code: u32) -> Self {
        VersionBracket::Bounded {
            lower: Some(VersionCode(code)),
            upper: None,
        }
    }

    pub fn below(code: u32) -> Self {
        VersionBracket::Bounded {
            lower: None,
            upper: Some(VersionCode(code)),
        }
    }

    pub fn between(lower: u32, upper: u32) -> Self {
        VersionBracket::Bounded {
            lower: Some(VersionCode(lower)),
            upper: Some(VersionCode(upper)),
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, VersionBracket::Exact { .. })
    }

    pub fn is_known(&self) -> bool {
        !matches!(
            self,
            VersionBracket::Unknown
                | VersionBracket::Bounded {
                    lower: None,
                    upper: None
                }
        )
    }

    pub fn contains(&self, code: VersionCode) -> bool {
        match self {
            VersionBracket::Exact { version } => *version == code,
            VersionBracket::Bounded { lower, upper } => {
                lower.map_or(true, |l| code >= l) && upper.map_or(true, |u| code < u)
            }
            VersionBracket::Unknown => true,
        }
    }

    /// Lowest release the bracket admits, if bounded below
    pub fn floor(&self) -> Option<VersionCode> {
        match self {
            VersionBracket::Exact { version } => Some(*version),
            VersionBracket::Bounded { lower, .. } => *lower,
            VersionBracket::Unknown => None,
        }
    }

    /// Replace this bracket with a narrower one. An exact bracket is never widened.
    pub fn refine(self, narrower: VersionBracket) -> VersionBracket {
        if self.is_exact() {
            self
        } else {
            narrower
        }
    }
}

impl Default for VersionBracket {
    fn default() -> Self {
        VersionBracket::Unknown
    }
}

impl fmt::Display for VersionBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionBracket::Exact { version } => write!(f, "{}", version),
            VersionBracket::Bounded {
                lower: Some(lower),
                upper: Some(upper),
            } => write!(f, ">= {} and < {}", lower, upper),
            VersionBracket::Bounded {
                lower: Some(lower),
                upper: None,
            } => write!(f, ">= {}", lower),
            VersionBracket::Bounded {
                lower: None,
                upper: Some(upper),
            } => write!(f, "< {}", upper),
            VersionBracket::Bounded {
                lower: None,
                upper: None,
            }
            | VersionBracket::Unknown => Ok(()),
        }
    }
}

/// Fingerprint depth, mirrors the basic/extensive switch of the scanner
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintMode {
    Basic,
    Extensive,
}

impl Default for FingerprintMode {
    fn default() -> Self {
        FingerprintMode::Basic
    }
}

impl FingerprintMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FingerprintMode::Basic => "basic",
            FingerprintMode::Extensive => "extensive",
        }
    }

    pub fn is_extensive(&self) -> bool {
        matches!(self, FingerprintMode::Extensive)
    }
}

impl fmt::Display for FingerprintMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FingerprintMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(FingerprintMode::Basic),
            "extensive" | "full" => Ok(FingerprintMode::Extensive),
            _ => Err(format!("Invalid fingerprint mode: {}", s)),
        }
    }
}

/// Host operating system family of the back-end DBMS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbmsOs {
    Posix,
    Windows,
}

impl DbmsOs {
    pub fn label(&self) -> &'static str {
        match self {
            DbmsOs::Posix => "Linux",
            DbmsOs::Windows => "Windows",
        }
    }
}

impl fmt::Display for DbmsOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
