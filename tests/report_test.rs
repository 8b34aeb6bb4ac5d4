// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use dbms_fingerprint::fingerprint::{BannerInfo, DbmsFingerprint, Verdict};
use dbms_fingerprint::reporting::formats::text::TextReportGenerator;
use dbms_fingerprint::reporting::types::SectionKind;
use dbms_fingerprint::reporting::{
    FingerprintSignal, ReportBuilder, ReportConfig, ReportEngine, ReportFormat,
};
use dbms_fingerprint::types::{DbmsOs, FingerprintMode, VersionBracket};

#[tokio::test]
async fn test_basic_report_is_one_version_line() {
    let signals = vec![FingerprintSignal::ActiveProbe(VersionBracket::exact(50106))];
    let report = ReportBuilder::build(&signals, FingerprintMode::Basic);

    let output = ReportEngine::new()
        .generate_report(&report, &ReportConfig::default())
        .await
        .unwrap();
    let text = String::from_utf8(output.data).unwrap();

    assert_eq!(text.lines().count(), 1);
    assert_eq!(text, "back-end DBMS: MySQL 5.1.6");
    assert_eq!(output.format, ReportFormat::Text);
}

#[test]
fn test_banner_logging_annotation() {
    let fingerprint = DbmsFingerprint {
        verdict: Verdict::Confirmed,
        mode: FingerprintMode::Extensive,
        active: Some(VersionBracket::between(50038, 50102)),
        banner: Some(BannerInfo::parse("5.0.45-log")),
        ..DbmsFingerprint::default()
    };

    let report = ReportBuilder::build(&fingerprint.signals(), FingerprintMode::Extensive);
    let banner = report.section(SectionKind::Banner).expect("banner section");

    assert_eq!(banner.value, "MySQL 5.0.45, logging enabled");

    let text = TextReportGenerator::new().render(&report);
    assert!(text.contains("banner parsing fingerprint: MySQL 5.0.45, logging enabled"));
}

#[test]
fn test_banner_without_log_suffix() {
    let signals = vec![FingerprintSignal::Banner {
        text: "5.1.42-community".to_string(),
        derived: Some(VersionBracket::exact(50142)),
    }];

    let report = ReportBuilder::build(&signals, FingerprintMode::Extensive);
    assert_eq!(
        report.section(SectionKind::Banner).map(|s| s.value.as_str()),
        Some("MySQL 5.1.42")
    );
}

#[test]
fn test_full_extensive_report() {
    let fingerprint = DbmsFingerprint {
        verdict: Verdict::Confirmed,
        active: Some(VersionBracket::between(50038, 50102)),
        comment_injection: Some(VersionBracket::exact(50045)),
        banner: Some(BannerInfo::parse("5.0.45-log")),
        os: Some(DbmsOs::Posix),
        ..DbmsFingerprint::default()
    };

    let mut signals = vec![FingerprintSignal::WebServer("Apache/2.2.14 (Ubuntu)".to_string())];
    signals.extend(fingerprint.signals());
    signals.push(FingerprintSignal::HtmlError("MySQL".to_string()));

    let report = ReportBuilder::build(&signals, FingerprintMode::Extensive);
    let text = TextReportGenerator::new().render(&report);
    let blank = " ".repeat(15);

    let expected = [
        "web server operating system: Apache/2.2.14 (Ubuntu)".to_string(),
        "back-end DBMS operating system: Linux".to_string(),
        "back-end DBMS: active fingerprint: MySQL >= 5.0.38 and < 5.1.2".to_string(),
        format!("{}comment injection fingerprint: MySQL 5.0.45", blank),
        format!("{}banner parsing fingerprint: MySQL 5.0.45, logging enabled", blank),
        format!("{}html error message fingerprint: MySQL", blank),
    ]
    .join("\n");

    assert_eq!(text, expected);
}

#[test]
fn test_conflicting_signals_side_by_side() {
    let signals = vec![
        FingerprintSignal::ActiveProbe(VersionBracket::below(50000)),
        FingerprintSignal::CommentInjection(VersionBracket::exact(50045)),
    ];

    let report = ReportBuilder::build(&signals, FingerprintMode::Extensive);
    assert_eq!(
        report.section(SectionKind::ActiveProbe).map(|s| s.value.as_str()),
        Some("MySQL < 5.0.0")
    );
    assert_eq!(
        report.section(SectionKind::CommentInjection).map(|s| s.value.as_str()),
        Some("MySQL 5.0.45")
    );
}

#[tokio::test]
async fn test_json_report_round_trips_sections() {
    let report = ReportBuilder::build(
        &[FingerprintSignal::ActiveProbe(VersionBracket::at_least(50500))],
        FingerprintMode::Extensive,
    );

    let output = ReportEngine::new()
        .generate_report(
            &report,
            &ReportConfig {
                format: ReportFormat::Json,
                session_id: "s1".to_string(),
            },
        )
        .await
        .unwrap();

    let parsed: dbms_fingerprint::reporting::FingerprintReport =
        serde_json::from_slice(&output.data).unwrap();
    assert_eq!(parsed, report);
}

#[tokio::test]
async fn test_other_engine_is_not_reported_as_mysql() {
    let fingerprint = DbmsFingerprint {
        verdict: Verdict::NotThisEngine,
        banner: Some(BannerInfo::parse("5.0.45")),
        ..DbmsFingerprint::default()
    };

    let mut signals = vec![FingerprintSignal::WebServer("nginx/1.18.0".to_string())];
    signals.extend(fingerprint.signals());

    for mode in [FingerprintMode::Basic, FingerprintMode::Extensive] {
        let report = ReportBuilder::build(&signals, mode);
        let output = ReportEngine::new()
            .generate_report(&report, &ReportConfig::default())
            .await
            .unwrap();

        assert_eq!(
            String::from_utf8(output.data).unwrap(),
            "web server operating system: nginx/1.18.0\nback-end DBMS: not MySQL"
        );
    }
}

#[test]
fn test_server_and_os_precede_header_regardless_of_input_order() {
    let fingerprint = DbmsFingerprint {
        verdict: Verdict::Confirmed,
        active: Some(VersionBracket::at_least(50500)),
        os: Some(DbmsOs::Windows),
        ..DbmsFingerprint::default()
    };

    // session signals first, web server appended last
    let mut signals = fingerprint.signals();
    signals.push(FingerprintSignal::WebServer("Microsoft-IIS/7.5".to_string()));

    let text = TextReportGenerator::new().render(&ReportBuilder::build(&signals, FingerprintMode::Basic));
    assert_eq!(
        text,
        [
            "web server operating system: Microsoft-IIS/7.5",
            "back-end DBMS operating system: Windows",
            "back-end DBMS: MySQL >= 5.5.0",
        ]
        .join("\n")
    );
}
