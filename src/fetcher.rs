use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::FetchError;

/// Anything that can turn a URL into page markup.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<String>;
}

/// Plain HTTP GET via reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("fi,en;q=0.8"));

        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .timeout(settings.timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String> {
        let res = self.client.get(url).send().await?.error_for_status()?;
        Ok(res.text().await?)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            attempts: settings.fetch_attempts.max(1),
            delay: settings.retry_delay(),
        }
    }
}

/// Fetch `url`, retrying with a fixed pause between attempts.
pub async fn fetch_with_retry<T>(
    transport: &T,
    url: &str,
    policy: &RetryPolicy,
) -> Result<String, FetchError>
where
    T: Transport + ?Sized,
{
    let attempts = policy.attempts.max(1);
    let mut last = None;

    for attempt in 1..=attempts {
        match transport.get(url).await {
            Ok(body) => {
                info!("Fetched {} ({} bytes)", url, body.len());
                return Ok(body);
            }
            Err(e) => {
                if attempt < attempts {
                    warn!(
                        "Fetch failed for {} (attempt {}/{}): {:#}, retrying in {:.1}s",
                        url,
                        attempt,
                        attempts,
                        e,
                        policy.delay.as_secs_f64()
                    );
                    tokio::time::sleep(policy.delay).await;
                }
                last = Some(e);
            }
        }
    }

    Err(FetchError::Exhausted {
        url: url.to_string(),
        attempts,
        cause: last.map(|e| format!("{:#}", e)).unwrap_or_default(),
    })
}
