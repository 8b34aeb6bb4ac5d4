// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use crate::fingerprint::mysql::DBMS_NAME;
use crate::reporting::formats::{json::JsonReportGenerator, text::TextReportGenerator};
use crate::reporting::types::*;
use crate::types::{FingerprintMode, VersionBracket};
use anyhow::{Context, Result};

pub const WEB_SERVER_LABEL: &str = "web server operating system: ";
pub const DBMS_OS_LABEL: &str = "back-end DBMS operating system: ";
pub const HEADER_LABEL: &str = "back-end DBMS: ";
pub const ACTIVE_LABEL: &str = "active fingerprint: ";
pub const COMMENT_LABEL: &str = "comment injection fingerprint: ";
pub const BANNER_LABEL: &str = "banner parsing fingerprint: ";
pub const HTML_ERROR_LABEL: &str = "html error message fingerprint: ";
pub const NOT_THIS_ENGINE: &str = "not MySQL";

/// Pure aggregation of signals into ordered report sections
pub struct ReportBuilder;

impl ReportBuilder {
    pub fn build(signals: &[FingerprintSignal], mode: FingerprintMode) -> FingerprintReport {
        let mut sections = Vec::new();

        for kind in [SectionKind::WebServer, SectionKind::DbmsOs] {
            for signal in signals {
                let section = match (kind, signal) {
                    (SectionKind::WebServer, FingerprintSignal::WebServer(text)) => {
                        ReportSection::new(kind, WEB_SERVER_LABEL, text.as_str())
                    }
                    (SectionKind::DbmsOs, FingerprintSignal::DbmsOs(text)) => {
                        ReportSection::new(kind, DBMS_OS_LABEL, text.as_str())
                    }
                    _ => continue,
                };
                sections.push(section);
            }
        }

        if signals.contains(&FingerprintSignal::NotThisEngine) {
            sections.push(ReportSection::new(SectionKind::Header, HEADER_LABEL, NOT_THIS_ENGINE));
            return FingerprintReport { mode, sections };
        }

        match mode {
            FingerprintMode::Basic => {
                sections.push(ReportSection::new(
                    SectionKind::Header,
                    HEADER_LABEL,
                    Self::best_version(signals),
                ));
            }
            FingerprintMode::Extensive => {
                sections.push(ReportSection::new(SectionKind::Header, HEADER_LABEL, DBMS_NAME));
                Self::push_details(&mut sections, signals);
            }
        }

        FingerprintReport { mode, sections }
    }

    /// Active probe, else comment injection, else banner, else the bare engine name
    pub fn best_version(signals: &[FingerprintSignal]) -> String {
        let known = |wanted: fn(&FingerprintSignal) -> Option<VersionBracket>| {
            signals
                .iter()
                .filter_map(wanted)
                .find(VersionBracket::is_known)
        };

        known(|s| match s {
            FingerprintSignal::ActiveProbe(bracket) => Some(*bracket),
            _ => None,
        })
        .or_else(|| {
            known(|s| match s {
                FingerprintSignal::CommentInjection(bracket) => Some(*bracket),
                _ => None,
            })
        })
        .or_else(|| {
            known(|s| match s {
                FingerprintSignal::Banner { derived, .. } => *derived,
                _ => None,
            })
        })
        .map_or_else(|| DBMS_NAME.to_string(), |bracket| format_dbms(&bracket))
    }

    fn push_details(sections: &mut Vec<ReportSection>, signals: &[FingerprintSignal]) {
        let order = [
            SectionKind::ActiveProbe,
            SectionKind::CommentInjection,
            SectionKind::Banner,
            SectionKind::HtmlError,
        ];

        for kind in order {
            for signal in signals {
                let section = match (kind, signal) {
                    (SectionKind::ActiveProbe, FingerprintSignal::ActiveProbe(bracket)) => {
                        ReportSection::new(kind, ACTIVE_LABEL, format_dbms(bracket))
                    }
                    (SectionKind::CommentInjection, FingerprintSignal::CommentInjection(bracket)) => {
                        ReportSection::new(kind, COMMENT_LABEL, format_dbms(bracket))
                    }
                    (SectionKind::Banner, FingerprintSignal::Banner { text, derived }) => {
                        let mut value = match derived {
                            Some(bracket) => format_dbms(bracket),
                            None => format!("{} {}", DBMS_NAME, text.trim()),
                        };
                        if text.trim_end().ends_with("-log") {
                            value.push_str(", logging enabled");
                        }
                        ReportSection::new(kind, BANNER_LABEL, value)
                    }
                    (SectionKind::HtmlError, FingerprintSignal::HtmlError(text)) => {
                        ReportSection::new(kind, HTML_ERROR_LABEL, text.as_str())
                    }
                    _ => continue,
                };
                sections.push(section);
            }
        }
    }
}

/// `MySQL >= 5.0.0`, or the bare name when nothing is known
pub fn format_dbms(bracket: &VersionBracket) -> String {
    if bracket.is_known() {
        format!("{} {}", DBMS_NAME, bracket)
    } else {
        DBMS_NAME.to_string()
    }
}

/// Renders a built report in the requested format
pub struct ReportEngine;

impl ReportEngine {
    pub fn new() -> Self {
        Self
    }

    pub async fn generate_report(
        &self,
        report: &FingerprintReport,
        config: &ReportConfig,
    ) -> Result<ReportOutput> {
        match config.format {
            ReportFormat::Text => {
                let data = TextReportGenerator::new()
                    .generate(report)
                    .await
                    .context("Failed to generate text report")?;

                Ok(ReportOutput {
                    format: ReportFormat::Text,
                    data,
                    filename: format!("dbms-fingerprint-{}.txt", config.session_id),
                    mime_type: "text/plain".to_string(),
                })
            }
            ReportFormat::Json => {
                let data = JsonReportGenerator::new()
                    .generate(report)
                    .await
                    .context("Failed to generate JSON report")?;

                Ok(ReportOutput {
                    format: ReportFormat::Json,
                    data,
                    filename: format!("dbms-fingerprint-{}.json", config.session_id),
                    mime_type: "application/json".to_string(),
                })
            }
        }
    }
}

impl Default for ReportEngine {
    fn default() -> Self {
        Self::new()
    }
}
