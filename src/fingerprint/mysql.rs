// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - MySQL Fingerprint Tables
 * Feature probes ordered by release chronology, and the known release table
 *
 * References:
 * - http://dev.mysql.com/doc/refman/5.0/en/news-5-0-x.html (up to 5.0.89)
 * - http://dev.mysql.com/doc/refman/5.1/en/news-5-1-x.html (up to 5.1.42)
 * - http://dev.mysql.com/doc/refman/5.4/en/news-5-4-x.html (up to 5.4.4)
 * - http://dev.mysql.com/doc/refman/5.5/en/news-5-5-x.html (up to 5.5.0)
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use super::probe::Probe;
use super::tree::{DecisionNode, DecisionTree, Stage};
use crate::oracle::DecodeMode;
use crate::types::{VersionBracket, VersionRange};
use once_cell::sync::Lazy;
use regex::Regex;

pub const DBMS_NAME: &str = "MySQL";

/// Names that select MySQL when the operator forces the DBMS
pub const MYSQL_ALIASES: &[&str] = &["mysql", "my"];

/// Released MySQL versions, updated on 01/2010
pub const MYSQL_VERSION_RANGES: &[VersionRange] = &[
    VersionRange::new(32200, 32234), // MySQL 3.22
    VersionRange::new(32300, 32360), // MySQL 3.23
    VersionRange::new(40000, 40032), // MySQL 4.0
    VersionRange::new(40100, 40123), // MySQL 4.1
    VersionRange::new(50000, 50090), // MySQL 5.0
    VersionRange::new(50100, 50142), // MySQL 5.1
    VersionRange::new(50400, 50405), // MySQL 5.4
    VersionRange::new(50500, 50502), // MySQL 5.5
    VersionRange::new(60000, 60011), // MySQL 6.0
];

/// First release shipping `information_schema`
pub const INFORMATION_SCHEMA_FLOOR: u32 = 50000;

pub const FAMILY_PREDICATE: &str = "CONNECTION_ID()=CONNECTION_ID()";
pub const DIALECT_PREDICATE: &str = "ISNULL(1/0)";
pub const GENERATION_CATALOG: &str = "information_schema.TABLES";

/// `USER()` carries a host part from 3.22.11 on
static USER_HOST_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"@[\w.\-_]+").unwrap());

pub fn is_mysql_alias(dbms: &str) -> bool {
    let dbms = dbms.trim().to_lowercase();
    MYSQL_ALIASES.iter().any(|alias| *alias == dbms)
}

/// The MySQL feature tree
pub fn mysql_decision_tree() -> DecisionTree {
    DecisionTree::new(DecisionNode::branch(
        Probe::predicate(FAMILY_PREDICATE),
        DecisionNode::branch(
            Probe::predicate(DIALECT_PREDICATE),
            DecisionNode::checkpoint(
                VersionBracket::Unknown,
                Stage::Engine,
                DecisionNode::branch(
                    Probe::catalog_echo(GENERATION_CATALOG),
                    DecisionNode::checkpoint(
                        VersionBracket::at_least(INFORMATION_SCHEMA_FLOOR),
                        Stage::Generation,
                        post_floor_tree(),
                    ),
                    DecisionNode::checkpoint(
                        VersionBracket::below(INFORMATION_SCHEMA_FLOOR),
                        Stage::Generation,
                        pre_floor_tree(),
                    ),
                ),
            ),
            DecisionNode::not_this_engine(),
        ),
        DecisionNode::not_this_engine(),
    ))
}

/// MySQL >= 5.0.0
fn post_floor_tree() -> DecisionNode {
    DecisionNode::chain(
        vec![
            (
                Probe::text_equals("SELECT MID(TO_SECONDS(950501), 1, 1)", DecodeMode::Digits, "6"),
                DecisionNode::leaf(VersionBracket::at_least(50500)),
            ),
            (
                Probe::text_present("SELECT MID(@@table_open_cache, 1, 1)"),
                DecisionNode::checkpoint(
                    VersionBracket::between(50102, 50500),
                    Stage::Minor,
                    DecisionNode::chain(
                        vec![
                            (
                                Probe::catalog_echo("information_schema.GLOBAL_STATUS"),
                                DecisionNode::leaf(VersionBracket::between(50112, 50500)),
                            ),
                            (
                                Probe::catalog_echo("information_schema.PROCESSLIST"),
                                DecisionNode::leaf(VersionBracket::between(50107, 50112)),
                            ),
                            (
                                Probe::catalog_echo("information_schema.PARTITIONS"),
                                DecisionNode::leaf(VersionBracket::exact(50106)),
                            ),
                            (
                                Probe::catalog_echo("information_schema.PLUGINS"),
                                DecisionNode::leaf(VersionBracket::between(50105, 50106)),
                            ),
                        ],
                        DecisionNode::leaf(VersionBracket::between(50102, 50105)),
                    ),
                ),
            ),
            (
                Probe::text_present("SELECT MID(@@hostname, 1, 1)"),
                DecisionNode::leaf(VersionBracket::between(50038, 50102)),
            ),
            (
                Probe::text_equals("SELECT 1 FROM DUAL", DecodeMode::Digits, "1"),
                DecisionNode::leaf(VersionBracket::between(50011, 50038)),
            ),
            (
                Probe::text_present("SELECT DATABASE() LIKE SCHEMA()"),
                DecisionNode::leaf(VersionBracket::between(50002, 50011)),
            ),
        ],
        DecisionNode::leaf(VersionBracket::between(50000, 50002)),
    )
}

/// MySQL < 5.0.0
fn pre_floor_tree() -> DecisionNode {
    DecisionNode::chain(
        vec![
            (
                Probe::text_equals("SELECT COERCIBILITY(USER())", DecodeMode::Digits, "3"),
                DecisionNode::leaf(VersionBracket::between(40111, 50000)),
            ),
            (
                Probe::text_equals("SELECT COERCIBILITY(USER())", DecodeMode::Digits, "2"),
                DecisionNode::leaf(VersionBracket::between(40101, 40111)),
            ),
            (
                Probe::text_present("SELECT CURRENT_USER()"),
                DecisionNode::checkpoint(
                    VersionBracket::between(40006, 40101),
                    Stage::Minor,
                    DecisionNode::branch(
                        Probe::text_equals(
                            "SELECT CHARSET(CURRENT_USER())",
                            DecodeMode::Default,
                            "utf8",
                        ),
                        DecisionNode::leaf(VersionBracket::exact(40100)),
                        DecisionNode::leaf(VersionBracket::between(40006, 40100)),
                    ),
                ),
            ),
            (
                Probe::text_equals("SELECT FOUND_ROWS()", DecodeMode::Digits, "0"),
                DecisionNode::leaf(VersionBracket::between(40000, 40006)),
            ),
            (
                Probe::text_present("SELECT CONNECTION_ID()"),
                DecisionNode::leaf(VersionBracket::between(32314, 40000)),
            ),
            (
                Probe::text_matches("SELECT USER()", &USER_HOST_REGEX),
                DecisionNode::leaf(VersionBracket::between(32211, 32314)),
            ),
        ],
        DecisionNode::leaf(VersionBracket::below(32211)),
    )
}
