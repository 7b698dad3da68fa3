//! HTTP client for the legislature's JSON feed and archive pages.

use std::future::Future;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

use crate::{retry::RetryConfig, user_agent::get_user_agent, Error};

const DEFAULT_BASE_URL: &str = "http://search-prod.lis.state.oh.us";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the legislative information service.
///
/// Relative links found inside feed payloads are resolved against
/// `base_url`; absolute URLs (archive pages, spreadsheets) are used as given.
/// Transient failures are retried according to [`RetryConfig`].
#[derive(Debug, Clone)]
pub struct Client {
    /// Base URL for feed links. Defaults to `http://search-prod.lis.state.oh.us`.
    base_url: String,
    timeout: Duration,
    retry: RetryConfig,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Creates a client pointing at the production feed, with retries read from the environment.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::from_env(),
        }
    }

    /// Creates a client with a custom base URL and retries disabled. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::disabled(),
        }
    }

    /// Overrides the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the retry policy.
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolves a feed link (`/solarapi/v1/...`) to an absolute URL.
    pub fn url(&self, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") {
            link.to_string()
        } else if link.starts_with('/') {
            format!("{}{}", self.base_url, link)
        } else {
            format!("{}/{}", self.base_url, link)
        }
    }

    /// Fetches `url` and decodes the body as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, Error> {
        let body = self.get_text(url).await?;
        serde_json::from_str::<T>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::error!("Failed to parse resource {}: {} | body: {}", url, e, snippet);
            Error::Decode(e.to_string())
        })
    }

    /// Fetches `url` and returns the body as text.
    pub async fn get_text(&self, url: &str) -> Result<String, Error> {
        self.with_retry(url, || async move {
            let resp = self.send(Method::GET, url).await?;
            resp.text().await.map_err(|e| {
                tracing::error!("Failed to read response body from {}: {}", url, e);
                Error::RequestFailed
            })
        })
        .await
    }

    /// Fetches `url` and returns the raw body bytes.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, Error> {
        self.with_retry(url, || async move {
            let resp = self.send(Method::GET, url).await?;
            resp.bytes().await.map(|b| b.to_vec()).map_err(|e| {
                tracing::error!("Failed to read response body from {}: {}", url, e);
                Error::RequestFailed
            })
        })
        .await
    }

    /// Issues a HEAD request; `Ok(())` means the resource exists.
    pub async fn head(&self, url: &str) -> Result<(), Error> {
        self.with_retry(url, || async move {
            self.send(Method::HEAD, url).await.map(|_| ())
        })
        .await
    }

    async fn send(&self, method: Method, url: &str) -> Result<reqwest::Response, Error> {
        let url = Url::parse(url).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::RequestFailed
        })?;
        let client = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .timeout(self.timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })?;
        let resp = client
            .request(method, url.clone())
            .header("accept", "application/json, text/html, */*")
            .header("accept-language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to get resource {}: {}", url, e);
                Error::RequestFailed
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let snippet = truncate_body(&body);
            tracing::debug!("Request to {} failed with status {}: {}", url, status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }
        Ok(resp)
    }

    async fn with_retry<T, F, Fut>(&self, url: &str, mut f: F) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let mut attempt = 0usize;
        loop {
            match f().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    if attempt > self.retry.max_retries || !err.is_retryable() {
                        return Err(err);
                    }
                    let delay = self.retry.delay_for_attempt(attempt);
                    tracing::warn!(
                        "{} request failed (attempt {}/{}), retrying in {:.1}s",
                        url,
                        attempt,
                        self.retry.max_retries,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_resolves_relative_links() {
        let client = Client::with_base_url("http://example.test/");
        assert_eq!(
            client.url("/solarapi/v1/general_assembly_131/bills"),
            "http://example.test/solarapi/v1/general_assembly_131/bills"
        );
        assert_eq!(client.url("bills"), "http://example.test/bills");
        assert_eq!(client.url("https://other.test/x"), "https://other.test/x");
    }

    #[test]
    fn truncate_long_body() {
        let body = "x".repeat(2500);
        let out = truncate_body(&body);
        assert!(out.ends_with("...[truncated]"));
        assert_eq!(out.len(), 2000 + "...[truncated]".len());
    }
}
