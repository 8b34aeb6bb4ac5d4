// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use crate::reporting::types::{FingerprintReport, SectionKind};
use anyhow::Result;

/// Detail lines line up under the value of the `back-end DBMS: ` header
const DETAIL_INDENT: usize = 15;

pub struct TextReportGenerator;

impl TextReportGenerator {
    pub fn new() -> Self {
        Self
    }

    pub async fn generate(&self, report: &FingerprintReport) -> Result<Vec<u8>> {
        Ok(self.render(report).into_bytes())
    }

    pub fn render(&self, report: &FingerprintReport) -> String {
        let mut lines: Vec<String> = Vec::new();
        let mut header: Option<String> = None;
        let mut details: Vec<String> = Vec::new();

        for section in &report.sections {
            if section.is_detail() {
                details.push(format!("{}{}", section.label, section.value));
            } else if section.kind == SectionKind::Header {
                header = Some(format!("{}{}", section.label, section.value));
            } else {
                lines.push(format!("{}{}", section.label, section.value));
            }
        }

        if let Some(header) = header {
            if details.is_empty() {
                lines.push(header);
            } else {
                let label_end = header.find(": ").map_or(header.len(), |i| i + 2);
                let blank = " ".repeat(DETAIL_INDENT);
                lines.push(format!("{}{}", &header[..label_end], details.join(&format!("\n{}", blank))));
            }
        }

        lines.join("\n")
    }
}

impl Default for TextReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}
