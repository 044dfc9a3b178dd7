//! Document fetching and politeness delays.
//!
//! # Architecture
//!
//! - [`DocumentFetcher`]: core trait, URL in, document text out
//! - [`HttpFetcher`]: reqwest-backed implementation with fixed request headers
//! - [`PoliteFetcher`]: decorator that sleeps a random interval after each call
//!
//! There is no retry: a failed fetch is reported once and the caller
//! degrades the affected record.

use crate::config::CrawlConfig;
use crate::error::{ConfigError, FetchError};
use rand::{Rng, rng};
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// Trait for retrieving raw documents.
///
/// Implementors fetch one URL and return its body text. This abstraction lets
/// the crawl session run against the network or an in-memory page set.
pub trait DocumentFetcher {
    /// Fetch `url` and return the response body.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetcher backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client carrying the configured User-Agent, Accept-Language and timeout.
    pub fn new(config: &CrawlConfig) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&config.accept_language) {
            headers.insert(ACCEPT_LANGUAGE, value);
        } else {
            warn!(accept_language = %config.accept_language, "Ignoring invalid Accept-Language header");
        }

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

impl DocumentFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Non-success response");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::network(url, e))?;
        debug!(
            %url,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched document"
        );
        Ok(body)
    }
}

/// Inclusive range for a randomized pause.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayBounds {
    pub min: Duration,
    pub max: Duration,
}

impl DelayBounds {
    /// Build bounds from seconds, rejecting negative or inverted ranges.
    pub fn from_secs(name: &'static str, min: f64, max: f64) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::DelayBounds { name, min, max };
        if !(min >= 0.0 && max >= min) {
            return Err(invalid());
        }
        Ok(Self {
            min: Duration::try_from_secs_f64(min).map_err(|_| invalid())?,
            max: Duration::try_from_secs_f64(max).map_err(|_| invalid())?,
        })
    }

    /// Draw a delay uniformly from the bounds, at millisecond resolution.
    pub fn sample(&self) -> Duration {
        let lo = self.min.as_millis() as u64;
        let hi = self.max.as_millis() as u64;
        Duration::from_millis(rng().random_range(lo..=hi))
    }
}

/// Wrapper that sleeps a random interval after every fetch, success or not.
///
/// This is only load shaping for the target site. It never retries.
pub struct PoliteFetcher<T> {
    inner: T,
    bounds: DelayBounds,
}

impl<T> PoliteFetcher<T> {
    pub fn new(inner: T, bounds: DelayBounds) -> Self {
        Self { inner, bounds }
    }
}

impl<T> fmt::Debug for PoliteFetcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoliteFetcher")
            .field("bounds", &self.bounds)
            .finish()
    }
}

impl<T> DocumentFetcher for PoliteFetcher<T>
where
    T: DocumentFetcher,
{
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let result = self.inner.fetch(url).await;
        let delay = self.bounds.sample();
        if !delay.is_zero() {
            debug!(?delay, "Politeness delay");
            sleep(delay).await;
        }
        result
    }
}
