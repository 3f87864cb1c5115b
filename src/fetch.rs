use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::BROWSER_HEADERS;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(7);
const READ_TIMEOUT: Duration = Duration::from_secs(25);
const MAX_RETRIES: u32 = 6;
const BASE_BACKOFF: Duration = Duration::from_secs(1);
const POOL_MAX_IDLE: usize = 10;

/// Rate limiting and transient upstream failures; everything else is
/// returned to the caller as data.
const RETRYABLE: &[StatusCode] = &[
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// One fetched page, redirects already followed. Non-2xx statuses are not
/// an error at this layer: the classifier decides what a 404 body means.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub final_url: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("giving up on {url}: still {status} after {attempts} attempts")]
    RetriesExhausted {
        url: String,
        status: u16,
        attempts: u32,
    },
}

/// Seam between the crawl loop and the network, so loop tests can script
/// page responses.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Pooled reqwest client with browser-emulating headers, split
/// connect/read timeouts and a bounded GET retry policy.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        for &(name, value) in BROWSER_HEADERS {
            headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        }
        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(READ_TIMEOUT)
            .pool_max_idle_per_host(POOL_MAX_IDLE)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.client.get(url).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if RETRYABLE.contains(&status) {
                        if attempt > MAX_RETRIES {
                            return Err(FetchError::RetriesExhausted {
                                url: url.to_string(),
                                status: status.as_u16(),
                                attempts: attempt,
                            });
                        }
                        let delay = retry_delay(attempt, retry_after_secs(resp.headers()));
                        warn!(
                            url,
                            status = status.as_u16(),
                            attempt,
                            delay_s = delay.as_secs_f64(),
                            "retryable status, backing off"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    let final_url = resp.url().to_string();
                    let body = resp.text().await?;
                    debug!(url, status = status.as_u16(), bytes = body.len(), "fetched");
                    return Ok(FetchedPage {
                        status: status.as_u16(),
                        final_url,
                        body,
                    });
                }
                Err(err) => {
                    if attempt > MAX_RETRIES {
                        return Err(FetchError::Transport(err));
                    }
                    warn!(url, error = %err, attempt, "connection error, backing off");
                    sleep(backoff(attempt)).await;
                }
            }
        }
    }
}

fn backoff(attempt: u32) -> Duration {
    BASE_BACKOFF * 2u32.pow(attempt.saturating_sub(1).min(16))
}

/// Numeric `Retry-After` seconds; the HTTP-date form is ignored.
fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()
}

/// Server-provided delay wins over exponential backoff when it is longer.
fn retry_delay(attempt: u32, retry_after: Option<u64>) -> Duration {
    backoff(attempt).max(Duration::from_secs(retry_after.unwrap_or(0)))
}
