// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - DBMS Fingerprint CLI
 * Fingerprints the MySQL release behind a boolean-blind injectable parameter
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::Rng;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, EnvFilter, Registry};

use dbms_fingerprint::config::{ConfigLoader, ConfigValidator, FingerprintConfig, HttpChannelConfig};
use dbms_fingerprint::fingerprint::{BannerInfo, FingerprintSession, MemoryStore};
use dbms_fingerprint::oracle::{HttpBooleanChannel, InferenceOracle};
use dbms_fingerprint::reporting::{FingerprintSignal, ReportBuilder, ReportConfig, ReportEngine, ReportFormat};
use dbms_fingerprint::types::FingerprintMode;

/// Blind boolean-oracle MySQL version fingerprinting
#[derive(Parser)]
#[command(name = "dbms-fingerprint")]
#[command(author = "Bountyy Oy <info@bountyy.fi>")]
#[command(version)]
#[command(about = "Fingerprint the MySQL release behind a boolean-blind injection point", long_about = None)]
struct Cli {
    /// Target URL, e.g. http://target/item.php
    #[arg(short, long)]
    url: Option<String>,

    /// Injectable GET parameter
    #[arg(short, long)]
    param: Option<String>,

    /// Original parameter value
    #[arg(long)]
    value: Option<String>,

    /// Configuration file (yaml, toml or json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extensive fingerprint: full decision tree and comment injection scan
    #[arg(short, long)]
    extensive: bool,

    /// Server banner already captured, e.g. 5.0.45-log
    #[arg(short, long)]
    banner: Option<String>,

    /// Assert the back-end DBMS, e.g. mysql
    #[arg(long)]
    dbms: Option<String>,

    /// Skip the operating system probe
    #[arg(long)]
    no_os: bool,

    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter_handle = init_tracing();
    let config = build_config(&cli)?;
    apply_log_level(&filter_handle, &config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("fingerprint-worker")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli, config))
}

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Subscriber at `RUST_LOG` or info; the configured level is applied once the config is loaded
fn init_tracing() -> FilterHandle {
    let (filter, handle) = log_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    handle
}

fn log_filter(initial: EnvFilter) -> (reload::Layer<EnvFilter, Registry>, FilterHandle) {
    reload::Layer::new(initial)
}

/// `RUST_LOG` wins over the config file
fn apply_log_level(handle: &FilterHandle, config: &FingerprintConfig) -> Result<()> {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return Ok(());
    }
    handle
        .reload(EnvFilter::new(&config.observability.log_level))
        .context("Failed to apply configured log level")
}

fn build_config(cli: &Cli) -> Result<FingerprintConfig> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::new(path)?.load_config()?,
        None => FingerprintConfig::default(),
    };

    if cli.extensive {
        config.mode = FingerprintMode::Extensive;
    }

    if let Some(dbms) = &cli.dbms {
        config.forced_dbms = Some(dbms.clone());
    }

    if cli.no_os {
        config.detect_os = false;
    }

    if cli.url.is_some() || cli.param.is_some() || cli.value.is_some() {
        let http = config.http.get_or_insert_with(HttpChannelConfig::default);
        if let Some(url) = &cli.url {
            http.url = url.clone();
        }
        if let Some(param) = &cli.param {
            http.parameter = param.clone();
        }
        if let Some(value) = &cli.value {
            http.value = value.clone();
        }
    }

    ConfigValidator::validate_fingerprint_config(&config)?;

    Ok(config)
}

async fn async_main(cli: Cli, config: FingerprintConfig) -> Result<()> {
    let http = config
        .http
        .clone()
        .context("No target: pass --url and --param or an http section in the config file")?;

    info!("Fingerprinting {} via parameter '{}'", http.url, http.parameter);

    let channel = Arc::new(HttpBooleanChannel::new(http).context("Failed to build HTTP channel")?);
    let oracle = InferenceOracle::new(channel.clone()).with_max_length(config.inference.max_length);

    let session_id = format!("{:016x}", rand::rng().random::<u64>());
    let store = Arc::new(MemoryStore::new());
    let mode = config.mode;

    let mut session = FingerprintSession::new(session_id.clone(), oracle, config)?.with_store(store);
    if let Some(banner) = &cli.banner {
        session = session.with_banner(BannerInfo::parse(banner));
    }

    let fingerprint = session.run().await.context("Fingerprint failed")?;

    if !fingerprint.is_confirmed() {
        warn!("The back-end DBMS is not MySQL");
    }
    if let Some(reason) = &fingerprint.interruption {
        warn!("Fingerprint incomplete: {}", reason);
    }

    let mut signals = Vec::new();
    match channel.web_server().await {
        Ok(Some(server)) => signals.push(FingerprintSignal::WebServer(server)),
        Ok(None) => {}
        Err(e) => warn!("Web server banner unavailable: {}", e),
    }
    signals.extend(fingerprint.signals());
    if let Some(dbms) = channel.html_error() {
        signals.push(FingerprintSignal::HtmlError(dbms));
    }

    let report = ReportBuilder::build(&signals, mode);
    let output = ReportEngine::new()
        .generate_report(
            &report,
            &ReportConfig {
                format: cli.format.into(),
                session_id,
            },
        )
        .await?;

    println!("{}", String::from_utf8_lossy(&output.data));

    info!(
        oracle_calls = fingerprint.oracle_calls,
        "Fingerprint finished"
    );

    Ok(())
}
