use std::time::Duration;
use thiserror::Error;

/// Browser-like user agent so listing pages render their server-side HTML.
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Knobs for polite fetching, constructed once in the CLI and passed in.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Mandatory pause after every successful request to the same site.
    pub request_delay: Duration,
    /// Attempts per page before the page is abandoned.
    pub max_retries: u32,
    /// Per-request network timeout.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_delay: Duration::from_secs(2),
            max_retries: 3,
            timeout: Duration::from_secs(30),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("rate limited (HTTP 429)")]
    RateLimited,

    #[error("request timed out")]
    Timeout,

    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("retries exhausted after {0} attempts")]
    RetriesExhausted(u32),
}

/// One long-lived HTTP session, reused for every request to a site.
///
/// Requests are strictly sequential: each successful fetch is followed by
/// a blocking pause, and a rate-limit response triples that pause before
/// the retry. The retry loop is an explicit bounded counter, so the
/// failure budget is visible at the call site.
pub struct Session {
    client: reqwest::Client,
    config: FetchConfig,
}

impl Session {
    pub fn new(config: FetchConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// Fetch one page, retrying transient failures up to the configured
    /// bound. Returns the page body on success.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 1u32;
        loop {
            match self.try_fetch(url).await {
                Ok(html) => {
                    tokio::time::sleep(self.config.request_delay).await;
                    return Ok(html);
                }
                Err(FetchError::RateLimited) if attempt < self.config.max_retries => {
                    tracing::warn!(url = %url, attempt, "Rate limited, backing off");
                    tokio::time::sleep(self.config.request_delay * 3).await;
                }
                Err(FetchError::Timeout) if attempt < self.config.max_retries => {
                    tracing::warn!(url = %url, attempt, "Request timed out, retrying");
                    tokio::time::sleep(self.config.request_delay).await;
                }
                Err(e @ (FetchError::RateLimited | FetchError::Timeout)) => {
                    tracing::warn!(url = %url, attempts = attempt, error = %e, "Retries exhausted");
                    return Err(FetchError::RetriesExhausted(attempt));
                }
                Err(e) => return Err(e),
            }
            attempt += 1;
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<String, FetchError> {
        tracing::info!(url = %url, "Requesting");

        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return Err(FetchError::Timeout),
            Err(e) => return Err(FetchError::Network(e)),
        };

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited);
        }
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        Ok(response.text().await?)
    }
}
