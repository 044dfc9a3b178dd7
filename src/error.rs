//! Error types for the crawler.
//!
//! Only configuration, output-directory and client-construction failures are
//! fatal to a run. Everything raised while crawling (fetch failures, unparsable
//! dates) is recovered at the point where it happens.

use thiserror::Error;

/// Failure to retrieve a single document.
///
/// Recovered by the aggregator, which turns it into a degraded record.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The request never produced a usable response.
    #[error("network error for {url}: {detail}")]
    Network {
        /// Requested URL
        url: String,
        /// Transport-level description
        detail: String,
    },
}

impl FetchError {
    /// Wrap a reqwest error raised while requesting `url`.
    pub fn network(url: &str, err: reqwest::Error) -> Self {
        FetchError::Network {
            url: url.to_string(),
            detail: err.to_string(),
        }
    }
}

/// Problems assembling the crawl configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid base URL {0}")]
    BaseUrl(String),

    #[error("invalid delay bounds for {name}: min {min}s, max {max}s")]
    DelayBounds { name: &'static str, min: f64, max: f64 },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Failure writing the output files.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// A published-date string that is not a recognizable ISO-8601 date.
#[derive(Debug, Error)]
#[error("unparsable published date {0:?}")]
pub struct DateParseError(pub String);
