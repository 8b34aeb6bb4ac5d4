// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

pub mod engine;
pub mod formats;
pub mod types;

pub use engine::{ReportBuilder, ReportEngine};
pub use types::{FingerprintReport, FingerprintSignal, ReportConfig, ReportFormat, ReportOutput};
