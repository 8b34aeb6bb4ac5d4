// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::errors::{FingerprintError, FingerprintResult};

/// Browser User-Agent sent with every oracle request
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Maximum response body size (10MB) to prevent memory exhaustion
const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct HttpClient {
    client: Arc<Client>,
    max_retries: u32,
    max_body_size: usize,
}

impl HttpClient {
    pub fn new(timeout_secs: u64, max_retries: u32) -> FingerprintResult<Self> {
        // Self-signed targets only; never enable against production hosts
        let accept_invalid_certs = std::env::var("ACCEPT_INVALID_CERTS")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .danger_accept_invalid_certs(accept_invalid_certs)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(BROWSER_USER_AGENT)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                FingerprintError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client: Arc::new(client),
            max_retries,
            max_body_size: MAX_BODY_SIZE,
        })
    }

    /// Send GET request, retrying transport failures up to `max_retries` times
    pub async fn get(&self, url: &str) -> FingerprintResult<HttpResponse> {
        let mut attempts = 0;

        loop {
            let started = Instant::now();

            match self.client.get(url).send().await {
                Ok(response) => {
                    let status_code = response.status().as_u16();

                    let headers = {
                        let headers = response.headers();
                        let mut map = HashMap::with_capacity(headers.len());
                        for (k, v) in headers.iter() {
                            if let Ok(value_str) = v.to_str() {
                                map.insert(k.as_str().to_string(), value_str.to_string());
                            }
                        }
                        map
                    };

                    let body_bytes = response.bytes().await?;
                    let body = if body_bytes.len() > self.max_body_size {
                        String::from_utf8_lossy(&body_bytes[..self.max_body_size]).to_string()
                    } else {
                        String::from_utf8_lossy(&body_bytes).to_string()
                    };

                    return Ok(HttpResponse {
                        status_code,
                        body,
                        headers,
                        duration_ms: started.elapsed().as_millis() as u64,
                    });
                }
                Err(e) => {
                    attempts += 1;
                    if attempts > self.max_retries {
                        return Err(e.into());
                    }

                    debug!("GET {} failed (attempt {}): {}", url, attempts, e);
                    tokio::time::sleep(Duration::from_millis(100 * attempts as u64)).await;
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: String,
    pub headers: HashMap<String, String>,
    pub duration_ms: u64,
}

impl HttpResponse {
    pub fn contains(&self, pattern: &str) -> bool {
        self.body.contains(pattern)
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers.get(&name.to_lowercase()).cloned()
    }
}
