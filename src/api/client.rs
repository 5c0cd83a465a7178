use super::types::{Article, ArticleRecord, ContentRecord, ContentSummary, Strategy};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

/// Public TabNews API root.
pub const DEFAULT_API_BASE: &str = "https://www.tabnews.com.br/api/v1";

const MAX_RESPONSE_SIZE: usize = 8 * 1024 * 1024; // 8MB

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Unexpected response format: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
}

/// The two remote calls the browser needs.
///
/// Implemented by [`ContentApiClient`] for the real API and by in-memory fakes
/// in tests. Calls carry no retry logic: one failure is returned to the caller
/// as is.
#[allow(async_fn_in_trait)]
pub trait ContentSource {
    /// Fetch one listing page (`page` is 1-indexed).
    async fn list_content(
        &self,
        page: u32,
        strategy: Strategy,
        page_size: u32,
    ) -> Result<Vec<ContentSummary>, ApiError>;

    /// Fetch the full article published by `owner` under `slug`.
    async fn get_article(&self, owner: &str, slug: &str) -> Result<Article, ApiError>;
}

/// HTTP client for the TabNews contents endpoints.
#[derive(Debug, Clone)]
pub struct ContentApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ContentApiClient {
    /// Build a client with its own connection pool.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("tn/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(2)
            .build()?;
        Self::with_client(http, base_url)
    }

    /// Build a client around an existing `reqwest::Client`.
    ///
    /// The base URL must be HTTPS; plain HTTP is accepted only for
    /// `localhost`/`127.0.0.1` so tests can point at a mock server.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        let base = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;

        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        if base.scheme() != "https" {
            let is_localhost = base.scheme() == "http"
                && matches!(base.host_str(), Some("localhost") | Some("127.0.0.1"));
            if !is_localhost {
                tracing::error!(base_url = %base, "Rejecting non-HTTPS API base URL");
                return Err(ApiError::InsecureBaseUrl);
            }
            tracing::warn!(base_url = %base, "Using non-HTTPS API base URL (localhost only)");
        }

        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `{base}/contents/{segments...}`, each segment percent-encoded.
    fn contents_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // cannot_be_a_base was rejected in the constructor
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("contents").extend(segments);
        }
        url
    }

    pub(crate) fn listing_url(&self, page: u32, strategy: Strategy, page_size: u32) -> Url {
        let mut url = self.contents_url(&[]);
        url.query_pairs_mut()
            .append_pair("per_page", &page_size.to_string())
            .append_pair("page", &page.max(1).to_string())
            .append_pair("strategy", strategy.as_query());
        url
    }

    pub(crate) fn article_url(&self, owner: &str, slug: &str) -> Url {
        self.contents_url(&[owner, slug])
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        tracing::debug!(url = %url, "GET");
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "Non-success response");
            return Err(ApiError::HttpStatus(status.as_u16()));
        }

        let bytes = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl ContentSource for ContentApiClient {
    async fn list_content(
        &self,
        page: u32,
        strategy: Strategy,
        page_size: u32,
    ) -> Result<Vec<ContentSummary>, ApiError> {
        let url = self.listing_url(page, strategy, page_size);
        let records: Vec<ContentRecord> = self.fetch_json(url).await?;
        tracing::debug!(page, strategy = %strategy, count = records.len(), "Listing fetched");
        Ok(records.into_iter().map(ContentSummary::from).collect())
    }

    async fn get_article(&self, owner: &str, slug: &str) -> Result<Article, ApiError> {
        let url = self.article_url(owner, slug);
        let record: ArticleRecord = self.fetch_json(url).await?;
        Ok(Article::from(record))
    }
}

async fn read_limited_bytes(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, ApiError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
