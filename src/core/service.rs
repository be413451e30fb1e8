//! Resolution pipeline producing the generated configuration file.

use super::{Document, GENERATED_FILE_NAME, extract_remote_url, generated_path, header, merge, normalize};
use crate::error::{ConfigError, Result};
use crate::sources::RemoteFetcher;
use async_trait::async_trait;
use reqwest::Url;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

/// Default deadline for a remote fetch.
const DEFAULT_FETCH_DEADLINE: Duration = Duration::from_secs(20);

static NO_REMOTE: Document = Document::Null;

/// Produces the generated configuration for a local configuration file.
#[async_trait]
pub trait ConfigService: Send + Sync {
    /// Build the generated file for `local_config` and return its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the local file cannot be read or parsed, or the
    /// generated file cannot be written consistently.
    async fn prepare(&self, local_config: &Path) -> Result<PathBuf>;
}

/// How the remote part of a resolution pass ended.
///
/// Every variant except [`RemoteResolution::Merged`] means the generated
/// file holds the local document only.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteResolution {
    /// The local file has no (valid) remote directive.
    NotConfigured,
    /// The remote document could not be fetched.
    FetchFailed {
        /// Directive URL
        url: Url,
    },
    /// The remote document was fetched but is not valid YAML.
    ParseFailed {
        /// Directive URL
        url: Url,
    },
    /// The remote document was fetched but holds no configuration.
    Empty {
        /// Directive URL
        url: Url,
    },
    /// The remote document is used as the merge base.
    Merged {
        /// Directive URL
        url: Url,
        /// Normalized remote document
        document: Document,
        /// Whether the content came from the cache
        from_cache: bool,
    },
}

impl RemoteResolution {
    /// Directive URL, if one was found.
    pub fn url(&self) -> Option<&Url> {
        match self {
            Self::NotConfigured => None,
            Self::FetchFailed { url }
            | Self::ParseFailed { url }
            | Self::Empty { url }
            | Self::Merged { url, .. } => Some(url),
        }
    }

    /// Remote document to merge under the local one.
    fn base(&self) -> &Document {
        match self {
            Self::Merged { document, .. } => document,
            _ => &NO_REMOTE,
        }
    }
}

/// Config service backed by a [`RemoteFetcher`] and the local filesystem.
///
/// # Examples
///
/// ```rust,no_run
/// use golangcix::core::{ConfigService, Service};
/// use golangcix::sources::HttpFetcher;
/// use std::path::Path;
///
/// # async fn example() -> golangcix::error::Result<()> {
/// let fetcher = HttpFetcher::builder()
///     .with_cache_dir("/tmp/golangcix-cache")
///     .build()?;
/// let service = Service::new(Box::new(fetcher));
///
/// let generated = service.prepare(Path::new(".golangci.local.yml")).await?;
/// println!("wrote {}", generated.display());
/// # Ok(())
/// # }
/// ```
pub struct Service {
    fetcher: Box<dyn RemoteFetcher>,
    root: PathBuf,
    fetch_deadline: Duration,
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("root", &self.root)
            .field("fetch_deadline", &self.fetch_deadline)
            .finish_non_exhaustive()
    }
}

impl Service {
    /// Create a service that cleans stale files under the current directory.
    pub fn new(fetcher: Box<dyn RemoteFetcher>) -> Self {
        Self {
            fetcher,
            root: PathBuf::from("."),
            fetch_deadline: DEFAULT_FETCH_DEADLINE,
        }
    }

    /// Set the working tree scanned for stale generated files.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Set the deadline for fetching the remote document.
    ///
    /// When it expires the fetch is abandoned and only the local
    /// configuration is used.
    pub fn with_fetch_deadline(mut self, deadline: Duration) -> Self {
        self.fetch_deadline = deadline;
        self
    }

    /// Work out the remote base document for the local file contents.
    ///
    /// Never fails: every remote problem degrades to local-only and is
    /// logged as a warning.
    pub async fn resolve_remote(&self, local_data: &[u8]) -> RemoteResolution {
        let url = match extract_remote_url(local_data) {
            Ok(url) => url,
            Err(_) => {
                tracing::warn!(
                    "Remote configuration directive not found. Using local configuration only."
                );
                return RemoteResolution::NotConfigured;
            }
        };

        tracing::info!(url = %url, "Remote configuration directive found");

        let fetched =
            match tokio::time::timeout(self.fetch_deadline, self.fetcher.fetch(&url)).await {
                Ok(result) => result,
                Err(_) => Err(ConfigError::Timeout),
            };

        let fetched = match fetched {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!(
                    url = %url,
                    error = %e,
                    "Unable to fetch remote configuration; using local config only"
                );
                return RemoteResolution::FetchFailed { url };
            }
        };

        if fetched.from_cache() {
            tracing::warn!(url = %url, "Using cached remote configuration");
        }

        let document = match normalize(&fetched.data) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(
                    url = %url,
                    error = %e,
                    "Failed to parse remote configuration; using local config only"
                );
                return RemoteResolution::ParseFailed { url };
            }
        };

        if !document.has_content() {
            tracing::warn!(url = %url, "Remote configuration is empty; using local config only");
            return RemoteResolution::Empty { url };
        }

        RemoteResolution::Merged {
            url,
            document,
            from_cache: fetched.from_cache(),
        }
    }

    /// Remove every generated file under the root except `current`.
    fn cleanup_generated_files(&self, current: &Path) -> Result<()> {
        let current = absolute(current)?;

        for entry in WalkDir::new(&self.root) {
            let entry = entry?;
            if entry.file_type().is_dir() || entry.file_name() != GENERATED_FILE_NAME {
                continue;
            }

            let path = entry.path();
            if absolute(path)? == current {
                continue;
            }

            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(ConfigError::RemoveStale {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            }

            tracing::info!(path = %path.display(), "Removed old generated config");
        }

        Ok(())
    }
}

#[async_trait]
impl ConfigService for Service {
    async fn prepare(&self, local_config: &Path) -> Result<PathBuf> {
        let data = tokio::fs::read(local_config)
            .await
            .map_err(|source| ConfigError::ReadLocalConfig {
                path: local_config.to_path_buf(),
                source,
            })?;

        let local = normalize(&data).map_err(|e| ConfigError::ParseLocalConfig {
            path: local_config.to_path_buf(),
            source: Box::new(e),
        })?;

        let remote = self.resolve_remote(&data).await;
        let merged = merge(remote.base(), &local);

        let generated = generated_path(local_config);
        self.cleanup_generated_files(&generated)
            .map_err(|e| e.context("cleanup generated files"))?;

        let body = merged.to_yaml()?;
        let header = header(remote.url(), local_config);
        write_file_atomic(&generated, &header, body.as_bytes())?;

        tracing::info!(path = %generated.display(), "Generated configuration file");

        Ok(generated)
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|source| ConfigError::ResolvePath {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `header` + `body` to a temp file beside `path`, then rename it over
/// `path`. Readers see either the old file or the complete new one.
fn write_file_atomic(path: &Path, header: &str, body: &[u8]) -> Result<()> {
    let to_err = |source| ConfigError::WriteGenerated {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut temp = tempfile::Builder::new()
        .prefix(GENERATED_FILE_NAME)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(to_err)?;
    temp.write_all(header.as_bytes()).map_err(to_err)?;
    temp.write_all(body).map_err(to_err)?;
    temp.as_file().sync_all().map_err(to_err)?;
    temp.persist(path).map_err(|e| to_err(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{FetchOrigin, FetchResult};
    use std::fs;
    use tempfile::TempDir;

    enum Reply {
        Body(&'static str, FetchOrigin),
        Fail,
        Hang,
    }

    struct StubFetcher(Reply);

    #[async_trait]
    impl RemoteFetcher for StubFetcher {
        async fn fetch(&self, _url: &Url) -> Result<FetchResult> {
            match &self.0 {
                Reply::Body(body, origin) => Ok(FetchResult {
                    data: body.as_bytes().to_vec(),
                    origin: *origin,
                }),
                Reply::Fail => Err(ConfigError::UnexpectedStatus(500)),
                Reply::Hang => std::future::pending().await,
            }
        }
    }

    const DIRECTIVE: &str = "# GOLANGCI_LINT_REMOTE_CONFIG: https://example.com/base.yml\n";

    fn service(reply: Reply) -> Service {
        Service::new(Box::new(StubFetcher(reply)))
    }

    #[tokio::test]
    async fn test_resolve_without_directive() {
        let resolution = service(Reply::Fail).resolve_remote(b"run: {}").await;
        assert_eq!(resolution, RemoteResolution::NotConfigured);
        assert!(resolution.url().is_none());
    }

    #[tokio::test]
    async fn test_resolve_fetch_failure() {
        let resolution = service(Reply::Fail).resolve_remote(DIRECTIVE.as_bytes()).await;
        assert!(matches!(resolution, RemoteResolution::FetchFailed { .. }));
        assert_eq!(
            resolution.url().map(Url::as_str),
            Some("https://example.com/base.yml")
        );
    }

    #[tokio::test]
    async fn test_resolve_parse_failure() {
        let resolution = service(Reply::Body("foo: [unclosed", FetchOrigin::Network))
            .resolve_remote(DIRECTIVE.as_bytes())
            .await;
        assert!(matches!(resolution, RemoteResolution::ParseFailed { .. }));
    }

    #[tokio::test]
    async fn test_resolve_empty_remote() {
        let resolution = service(Reply::Body("# nothing here\n", FetchOrigin::Network))
            .resolve_remote(DIRECTIVE.as_bytes())
            .await;
        assert!(matches!(resolution, RemoteResolution::Empty { .. }));
    }

    #[tokio::test]
    async fn test_resolve_from_cache() {
        let resolution = service(Reply::Body("run: {timeout: 5m}", FetchOrigin::Cache))
            .resolve_remote(DIRECTIVE.as_bytes())
            .await;
        match resolution {
            RemoteResolution::Merged {
                from_cache,
                document,
                ..
            } => {
                assert!(from_cache);
                assert!(document.get("run").is_some());
            }
            other => panic!("unexpected resolution: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_deadline_expires() {
        let resolution = service(Reply::Hang)
            .with_fetch_deadline(Duration::from_millis(50))
            .resolve_remote(DIRECTIVE.as_bytes())
            .await;
        assert!(matches!(resolution, RemoteResolution::FetchFailed { .. }));
    }

    #[tokio::test]
    async fn test_prepare_missing_local_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = service(Reply::Fail)
            .with_root(temp_dir.path())
            .prepare(&temp_dir.path().join("missing.yml"))
            .await;
        assert!(matches!(result, Err(ConfigError::ReadLocalConfig { .. })));
    }

    #[tokio::test]
    async fn test_prepare_malformed_local_file() {
        let temp_dir = TempDir::new().unwrap();
        let local = temp_dir.path().join(".golangci.yml");
        fs::write(&local, "linters: [unclosed").unwrap();

        let result = service(Reply::Fail)
            .with_root(temp_dir.path())
            .prepare(&local)
            .await;
        assert!(matches!(result, Err(ConfigError::ParseLocalConfig { .. })));
        assert!(!temp_dir.path().join(GENERATED_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_prepare_empty_local_file() {
        let temp_dir = TempDir::new().unwrap();
        let local = temp_dir.path().join(".golangci.yml");
        fs::write(&local, "").unwrap();

        let generated = service(Reply::Fail)
            .with_root(temp_dir.path())
            .prepare(&local)
            .await
            .unwrap();

        let written = fs::read(&generated).unwrap();
        assert_eq!(normalize(&written).unwrap(), Document::empty_mapping());
    }

    #[tokio::test]
    async fn test_prepare_blank_local_file_with_tabs() {
        let temp_dir = TempDir::new().unwrap();
        let local = temp_dir.path().join(".golangci.yml");
        fs::write(&local, "  \n\t\n").unwrap();

        let generated = service(Reply::Fail)
            .with_root(temp_dir.path())
            .prepare(&local)
            .await
            .unwrap();

        let written = fs::read(&generated).unwrap();
        assert_eq!(normalize(&written).unwrap(), Document::empty_mapping());
    }

    #[tokio::test]
    async fn test_resolve_blank_remote_with_tabs_is_empty() {
        let resolution = service(Reply::Body("\t\n  \t", FetchOrigin::Network))
            .resolve_remote(DIRECTIVE.as_bytes())
            .await;
        assert!(matches!(resolution, RemoteResolution::Empty { .. }));
    }

    #[tokio::test]
    async fn test_prepare_unwritable_generated_path() {
        let temp_dir = TempDir::new().unwrap();
        let local = temp_dir.path().join(".golangci.yml");
        fs::write(&local, "run: {}\n").unwrap();
        fs::create_dir(temp_dir.path().join(GENERATED_FILE_NAME)).unwrap();

        let result = service(Reply::Fail)
            .with_root(temp_dir.path())
            .prepare(&local)
            .await;

        assert!(matches!(result, Err(ConfigError::WriteGenerated { .. })));
        let mut names: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        names.sort();
        assert_eq!(names, vec![".golangci.generated.yml", ".golangci.yml"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_prepare_stale_file_not_removable() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let locked = temp_dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join(GENERATED_FILE_NAME), "run: {}\n").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Privileged users ignore directory permissions.
        if fs::write(locked.join("writable"), "").is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let local = temp_dir.path().join(".golangci.yml");
        fs::write(&local, "run: {}\n").unwrap();

        let result = service(Reply::Fail)
            .with_root(temp_dir.path())
            .prepare(&local)
            .await;
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let err = result.unwrap_err();
        assert!(matches!(err.root(), ConfigError::RemoveStale { .. }));
        assert!(!temp_dir.path().join(GENERATED_FILE_NAME).exists());
    }

    #[test]
    fn test_cleanup_keeps_current_and_other_names() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::create_dir_all(root.join(".hidden")).unwrap();

        let current = root.join(GENERATED_FILE_NAME);
        fs::write(&current, "current").unwrap();
        fs::write(root.join("a/b").join(GENERATED_FILE_NAME), "old").unwrap();
        fs::write(root.join(".hidden").join(GENERATED_FILE_NAME), "old").unwrap();
        fs::write(root.join("a/.golangci.yml"), "keep").unwrap();

        service(Reply::Fail)
            .with_root(root)
            .cleanup_generated_files(&current)
            .unwrap();

        assert!(current.exists());
        assert!(!root.join("a/b").join(GENERATED_FILE_NAME).exists());
        assert!(!root.join(".hidden").join(GENERATED_FILE_NAME).exists());
        assert!(root.join("a/.golangci.yml").exists());
    }

    #[test]
    fn test_write_file_atomic_replaces_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(GENERATED_FILE_NAME);
        fs::write(&path, "stale").unwrap();

        write_file_atomic(&path, "# header\n", b"run: {}\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "# header\nrun: {}\n");
        let leftovers = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
