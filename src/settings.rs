//! Runtime settings for the wrapper.

use crate::error::Result;
use config::Environment;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Prefix of environment variables that override settings.
pub const ENV_PREFIX: &str = "GOLANGCIX";

const CACHE_DIR_NAME: &str = ".cache/golangci-wrapper";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;
const DEFAULT_FETCH_DEADLINE_SECS: u64 = 20;

/// Settings shared by the fetcher and the config service.
///
/// Built once per invocation and passed explicitly to the components that
/// need it.
///
/// # Examples
///
/// ```rust
/// use golangcix::settings::Settings;
///
/// // GOLANGCIX_CACHE_DIR=/tmp/cache -> cache_dir = /tmp/cache
/// let settings = Settings::load().unwrap();
/// assert!(settings.http_timeout().as_secs() > 0);
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    /// Directory holding cached remote documents. `None` disables the cache.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Timeout applied to each HTTP request.
    pub http_timeout_secs: u64,
    /// Deadline for the whole remote fetch, including cache fallback.
    pub fetch_deadline_secs: u64,
}

impl Settings {
    /// Load settings from defaults and `GOLANGCIX_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ConfigError::Settings`] if a variable holds a
    /// value of the wrong type.
    pub fn load() -> Result<Self> {
        Self::load_from(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    /// Load settings with a specific environment source.
    pub(crate) fn load_from(env: Environment) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("http_timeout_secs", DEFAULT_HTTP_TIMEOUT_SECS)?
            .set_default("fetch_deadline_secs", DEFAULT_FETCH_DEADLINE_SECS)?;

        if let Some(dir) = default_cache_dir() {
            builder = builder.set_default("cache_dir", dir.to_string_lossy().into_owned())?;
        }

        let settings = builder.add_source(env).build()?;
        Ok(settings.try_deserialize()?)
    }

    /// HTTP request timeout.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Deadline for one remote fetch.
    pub fn fetch_deadline(&self) -> Duration {
        Duration::from_secs(self.fetch_deadline_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            fetch_deadline_secs: DEFAULT_FETCH_DEADLINE_SECS,
        }
    }
}

fn default_cache_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CACHE_DIR_NAME))
}
