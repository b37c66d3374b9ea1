// src/fetch/mod.rs

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use thiserror::Error;
use tracing::{debug, trace};
use url::Url;

use crate::config::CrawlerConfig;

pub mod listing;
pub mod variant;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: Url, status: StatusCode },
    #[error("reading body from {url}: {source}")]
    Body {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
}

/// Everything the crawler needs from the network. One GET for bodies and one
/// header-only probe for sizes.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the full body of `url`.
    async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>, FetchError>;

    /// Probe `url` for its advertised `Content-Length`; `Ok(None)` when the
    /// server does not report one.
    async fn content_length(&self, url: &Url) -> Result<Option<u64>, FetchError>;
}

/// `Fetcher` backed by a shared reqwest client. No retries, no timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlerConfig) -> anyhow::Result<Self> {
        let client = Client::builder().user_agent(&config.user_agent).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        debug!(%url, "GET");
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status,
            });
        }
        let bytes = resp.bytes().await.map_err(|source| FetchError::Body {
            url: url.clone(),
            source,
        })?;
        trace!(%url, len = bytes.len(), "received body");
        Ok(bytes.to_vec())
    }

    async fn content_length(&self, url: &Url) -> Result<Option<u64>, FetchError> {
        debug!(%url, "HEAD");
        let resp = self
            .client
            .head(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status,
            });
        }
        // read the header itself; reqwest's body size hint is 0 for HEAD
        Ok(resp
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok()))
    }
}
