// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use crate::types::{FingerprintMode, VersionBracket};
use serde::{Deserialize, Serialize};

/// One piece of evidence about the back-end DBMS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum FingerprintSignal {
    ActiveProbe(VersionBracket),
    CommentInjection(VersionBracket),
    Banner {
        text: String,
        derived: Option<VersionBracket>,
    },
    HtmlError(String),
    WebServer(String),
    DbmsOs(String),
    /// The target answered as some other engine
    NotThisEngine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    WebServer,
    DbmsOs,
    /// The `back-end DBMS` line
    Header,
    ActiveProbe,
    CommentInjection,
    Banner,
    HtmlError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSection {
    pub kind: SectionKind,
    pub label: String,
    pub value: String,
}

impl ReportSection {
    pub fn new(kind: SectionKind, label: &str, value: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.to_string(),
            value: value.into(),
        }
    }

    /// Detail sections are printed under the header line
    pub fn is_detail(&self) -> bool {
        matches!(
            self.kind,
            SectionKind::ActiveProbe
                | SectionKind::CommentInjection
                | SectionKind::Banner
                | SectionKind::HtmlError
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerprintReport {
    pub mode: FingerprintMode,
    pub sections: Vec<ReportSection>,
}

impl FingerprintReport {
    pub fn section(&self, kind: SectionKind) -> Option<&ReportSection> {
        self.sections.iter().find(|section| section.kind == kind)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            _ => Err(format!("Invalid report format: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    pub format: ReportFormat,
    /// Session id used in the output filename
    pub session_id: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            session_id: "fingerprint".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportOutput {
    pub format: ReportFormat,
    pub data: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}
