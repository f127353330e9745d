//! Specification retrieval
//!
//! Fetchers only move bytes; parsing the body as JSON is left to the caller.
//! Every fetch is a single attempt.

use async_trait::async_trait;
use reqwest::Client;
use tokio::fs;
use tracing::{debug, warn};
use url::Url;

use crate::core::{Error, Result};

/// Retrieves a raw specification document
#[async_trait]
pub trait SpecFetcher: Send + Sync {
    /// Fetch the document behind `source` as UTF-8 text
    async fn fetch(&self, source: &str) -> Result<String>;
}

/// Fetches specifications from HTTP/HTTPS URLs
#[derive(Debug, Clone)]
pub struct HttpSpecFetcher {
    client: Client,
}

impl HttpSpecFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| Error::fetch("", format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Use an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SpecFetcher for HttpSpecFetcher {
    async fn fetch(&self, source: &str) -> Result<String> {
        let response = self.client.get(source).send().await.map_err(|e| {
            warn!(api = %source, error = %e, "Failed to fetch spec");
            Error::fetch(source, e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(api = %source, %status, "Spec request was not successful");
            return Err(Error::fetch(source, format!("HTTP {status}")));
        }

        response.text().await.map_err(|e| {
            warn!(api = %source, error = %e, "Failed to read spec response body");
            Error::fetch(source, format!("Failed to read response body: {e}"))
        })
    }
}

/// Reads specifications from local files
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSpecFetcher;

impl FileSpecFetcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SpecFetcher for FileSpecFetcher {
    async fn fetch(&self, source: &str) -> Result<String> {
        let path = source.strip_prefix("file://").unwrap_or(source);
        fs::read_to_string(path).await.map_err(|e| {
            warn!(api = %source, error = %e, "Failed to read spec file");
            Error::fetch(source, e)
        })
    }
}

/// Dispatches to the HTTP fetcher for web URLs and to the file fetcher otherwise
#[derive(Debug, Clone)]
pub struct CompositeSpecFetcher {
    http: HttpSpecFetcher,
    file: FileSpecFetcher,
}

impl CompositeSpecFetcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: HttpSpecFetcher::new()?,
            file: FileSpecFetcher::new(),
        })
    }
}

fn is_web_url(source: &str) -> bool {
    Url::parse(source).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

#[async_trait]
impl SpecFetcher for CompositeSpecFetcher {
    async fn fetch(&self, source: &str) -> Result<String> {
        if is_web_url(source) {
            debug!(api = %source, "Using HTTP fetcher");
            self.http.fetch(source).await
        } else {
            debug!(api = %source, "Using file fetcher");
            self.file.fetch(source).await
        }
    }
}
