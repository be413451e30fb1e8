//! Error types for golangcix.

use std::path::PathBuf;

/// Result type alias for golangcix operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while resolving, merging, or writing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A `-c`/`--config` flag was given without a following value.
    #[error("missing value for -c/--config flag")]
    MissingConfigValue,

    /// No usable remote configuration directive was found.
    #[error("no URL found")]
    NoUrlFound,

    /// The cache directory is not configured.
    #[error("cache directory is empty")]
    CacheUnavailable,

    /// The HTTP request for the remote configuration failed.
    #[error("HTTP request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The remote server answered with a status other than 200 or 304.
    #[error("unexpected HTTP status: {0}")]
    UnexpectedStatus(u16),

    /// Cached remote content could not be read.
    #[error("read cache file {}: {source}", path.display())]
    CacheRead {
        /// Path of the cache file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The remote fetch did not finish before its deadline.
    #[error("remote fetch timed out")]
    Timeout,

    /// The local configuration file could not be read.
    #[error("read local configuration {}: {source}", path.display())]
    ReadLocalConfig {
        /// Path of the local configuration
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The local configuration file is not valid YAML.
    #[error("parse local configuration {}: {source}", path.display())]
    ParseLocalConfig {
        /// Path of the local configuration
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: Box<ConfigError>,
    },

    /// A document could not be parsed as YAML.
    #[error("unmarshal yaml: {0}")]
    Parse(#[source] serde_yaml::Error),

    /// The merged document could not be encoded as YAML.
    #[error("encode merged configuration: {0}")]
    Encode(#[source] serde_yaml::Error),

    /// A path could not be made absolute.
    #[error("resolve path {}: {source}", path.display())]
    ResolvePath {
        /// Path that failed to resolve
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Walking the working tree failed.
    #[error("walk dir: {0}")]
    Walk(#[from] walkdir::Error),

    /// A stale generated file could not be removed.
    #[error("remove old generated config {}: {source}", path.display())]
    RemoveStale {
        /// Path of the stale file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The generated configuration could not be written or renamed into place.
    #[error("write generated configuration {}: {source}", path.display())]
    WriteGenerated {
        /// Destination path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Runtime settings could not be loaded.
    #[error("failed to load settings: {0}")]
    Settings(String),

    /// The external linter could not be found.
    #[error("golangci-lint not found: {0}")]
    LinterUnavailable(String),

    /// The external linter exited unsuccessfully.
    #[error("golangci-lint exited with status {code}")]
    LinterFailed {
        /// Exit code reported by the linter (1 when killed by a signal)
        code: i32,
    },

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error annotated with the step that produced it.
    #[error("{context}: {source}")]
    Context {
        /// Name of the failing step
        context: &'static str,
        /// The underlying error
        #[source]
        source: Box<ConfigError>,
    },
}

impl ConfigError {
    /// Wrap this error with the name of the step that failed.
    pub fn context(self, context: &'static str) -> Self {
        Self::Context {
            context,
            source: Box::new(self),
        }
    }

    /// Innermost error, looking through any [`ConfigError::Context`] wrappers.
    pub fn root(&self) -> &ConfigError {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Process exit code to report for this error.
    ///
    /// A failing linter run propagates the linter's own exit status so
    /// callers (CI, editors) see the same result as running it directly.
    pub fn exit_code(&self) -> i32 {
        match self.root() {
            Self::LinterFailed { code } => *code,
            _ => 1,
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Settings(err.to_string())
    }
}
