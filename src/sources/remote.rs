//! Remote HTTP/HTTPS configuration fetching with an on-disk ETag cache.

use crate::error::{ConfigError, Result};
use async_trait::async_trait;
use reqwest::header::{ETAG, IF_NONE_MATCH};
use reqwest::{Client, StatusCode, Url};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the bytes of a [`FetchResult`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    /// Fresh response body from the server.
    Network,
    /// Previously cached content (304, or fallback after an error).
    Cache,
}

/// Raw remote document plus its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// Document bytes.
    pub data: Vec<u8>,
    /// Whether `data` came from the network or the cache.
    pub origin: FetchOrigin,
}

impl FetchResult {
    /// Whether the content was served from the cache.
    pub fn from_cache(&self) -> bool {
        self.origin == FetchOrigin::Cache
    }
}

/// Fetches a remote configuration document.
///
/// Implement this trait to substitute the HTTP transport, e.g. in tests.
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// Fetch the document at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither the network nor the cache can provide it.
    async fn fetch(&self, url: &Url) -> Result<FetchResult>;
}

/// Cache file locations for one remote URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePaths {
    /// Cached document (`<sha256>.yml`).
    pub content: PathBuf,
    /// Last ETag seen for the document (`<sha256>.etag`).
    pub etag: PathBuf,
}

impl CachePaths {
    /// Derive the cache paths for `url` inside `cache_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CacheUnavailable`] if `cache_dir` is blank.
    pub fn for_url(cache_dir: &Path, url: &Url) -> Result<Self> {
        if cache_dir.to_string_lossy().trim().is_empty() {
            return Err(ConfigError::CacheUnavailable);
        }

        let name = hex::encode(Sha256::digest(url.as_str().as_bytes()));
        Ok(Self {
            content: cache_dir.join(format!("{name}.yml")),
            etag: cache_dir.join(format!("{name}.etag")),
        })
    }
}

/// Outcome of one conditional GET.
enum RemoteResponse {
    Fresh { body: Vec<u8>, etag: String },
    NotModified,
}

/// HTTP-based remote fetcher.
///
/// Sends `If-None-Match` when an ETag is cached, answers 304 from the cache,
/// and falls back to the last cached copy when the request fails or the
/// server returns anything other than 200/304.
///
/// # Examples
///
/// ```rust,no_run
/// use golangcix::sources::{HttpFetcher, RemoteFetcher};
/// use reqwest::Url;
/// use std::time::Duration;
///
/// # async fn example() -> golangcix::error::Result<()> {
/// let fetcher = HttpFetcher::builder()
///     .with_cache_dir("/home/me/.cache/golangci-wrapper")
///     .with_timeout(Duration::from_secs(10))
///     .build()?;
///
/// let url = Url::parse("https://config.example.com/golangci.yml").unwrap();
/// let result = fetcher.fetch(&url).await?;
/// println!("{} bytes, cached: {}", result.data.len(), result.from_cache());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    cache_dir: Option<PathBuf>,
}

impl HttpFetcher {
    /// Create a new builder for constructing an HTTP fetcher.
    pub fn builder() -> HttpFetcherBuilder {
        HttpFetcherBuilder::new()
    }

    fn cache_paths(&self, url: &Url) -> Result<CachePaths> {
        let dir = self.cache_dir.as_deref().ok_or(ConfigError::CacheUnavailable)?;
        CachePaths::for_url(dir, url)
    }

    async fn fetch_from_remote(&self, url: &Url, etag_path: &Path) -> Result<RemoteResponse> {
        let mut request = self.client.get(url.clone());
        if let Some(etag) = read_etag(etag_path).await {
            request = request.header(IF_NONE_MATCH, etag);
        }

        let response = request.send().await?;

        match response.status() {
            StatusCode::OK => {
                let etag = response
                    .headers()
                    .get(ETAG)
                    .and_then(|v| v.to_str().ok())
                    .map(|v| v.trim().to_string())
                    .unwrap_or_default();
                let body = response.bytes().await?.to_vec();
                Ok(RemoteResponse::Fresh { body, etag })
            }
            StatusCode::NOT_MODIFIED => Ok(RemoteResponse::NotModified),
            status => Err(ConfigError::UnexpectedStatus(status.as_u16())),
        }
    }

    /// Store a fresh body and its ETag.
    ///
    /// The old ETag is removed before the body is replaced, so a partial
    /// write never pairs new content with a stale validator.
    async fn write_cache(&self, paths: &CachePaths, body: &[u8], etag: &str) -> Result<()> {
        if let Some(dir) = paths.content.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        match tokio::fs::remove_file(&paths.etag).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tokio::fs::write(&paths.content, body).await?;
        tokio::fs::write(&paths.etag, etag).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResult> {
        let paths = self.cache_paths(url)?;

        match self.fetch_from_remote(url, &paths.etag).await {
            Ok(RemoteResponse::Fresh { body, etag }) => {
                if let Err(e) = self.write_cache(&paths, &body, &etag).await {
                    tracing::warn!(
                        cache_path = %paths.content.display(),
                        etag_path = %paths.etag.display(),
                        error = %e,
                        "Failed to write new cache"
                    );
                }
                Ok(FetchResult {
                    data: body,
                    origin: FetchOrigin::Network,
                })
            }
            Ok(RemoteResponse::NotModified) => {
                let data = tokio::fs::read(&paths.content).await.map_err(|source| {
                    ConfigError::CacheRead {
                        path: paths.content.clone(),
                        source,
                    }
                })?;
                Ok(FetchResult {
                    data,
                    origin: FetchOrigin::Cache,
                })
            }
            Err(fetch_err) => {
                tracing::warn!(url = %url, error = %fetch_err, "Failed to fetch from remote");
                match tokio::fs::read(&paths.content).await {
                    Ok(data) => {
                        tracing::warn!(
                            path = %paths.content.display(),
                            "Falling back to cached remote configuration"
                        );
                        Ok(FetchResult {
                            data,
                            origin: FetchOrigin::Cache,
                        })
                    }
                    Err(_) => Err(fetch_err),
                }
            }
        }
    }
}

/// Cached ETag, if present and non-blank.
async fn read_etag(path: &Path) -> Option<String> {
    let raw = tokio::fs::read_to_string(path).await.ok()?;
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Builder for constructing an [`HttpFetcher`].
#[derive(Debug)]
pub struct HttpFetcherBuilder {
    cache_dir: Option<PathBuf>,
    timeout: Duration,
}

impl HttpFetcherBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            cache_dir: None,
            timeout: Duration::from_secs(15),
        }
    }

    /// Set the directory holding cached documents and ETags.
    ///
    /// Without a cache directory every fetch fails with
    /// [`ConfigError::CacheUnavailable`].
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Set the cache directory from an optional value.
    pub fn with_optional_cache_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.cache_dir = dir;
        self
    }

    /// Set the per-request timeout.
    ///
    /// Default is 15 seconds.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the HTTP fetcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<HttpFetcher> {
        let client = Client::builder().timeout(self.timeout).build()?;

        Ok(HttpFetcher {
            client,
            cache_dir: self.cache_dir,
        })
    }
}

impl Default for HttpFetcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
