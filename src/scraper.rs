use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use tracing::{debug, instrument};
use url::Url;

use crate::config::Config;
use crate::error::{ConfigError, FetchError};

const MAX_REDIRECTS: usize = 10;

/// Retrieves the raw HTML of a page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// Parses the caller's URL string, accepting only http(s).
pub fn parse_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::UnsupportedScheme(other.to_string())),
    }
}

/// Single-attempt HTTP fetcher backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let builder = ClientBuilder::new()
            .user_agent(config.fetch_user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(config.fetch_timeout);

        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self::new(client))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip_all, fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::UnsupportedScheme(url.scheme().to_string()));
        }

        let response = self
            .client
            .get(url.clone())
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }

        let html = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Body(e.to_string())
            }
        })?;
        debug!(status = status.as_u16(), bytes = html.len(), "Fetched page");

        Ok(html)
    }
}
