//! Local configuration file discovery.

use crate::core::{DEFAULT_CANDIDATES, parse_config_flag};
use crate::error::Result;
use std::path::PathBuf;

/// Finds the local configuration file for a linter invocation.
pub trait Locator: Send + Sync {
    /// Return the local configuration path, or `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments carry a malformed config flag.
    fn locate(&self, args: &[String]) -> Result<Option<PathBuf>>;
}

/// Locator that honours `-c`/`--config` and otherwise probes the default
/// filenames in a base directory.
///
/// # Examples
///
/// ```rust
/// use golangcix::sources::{FileLocator, Locator};
/// use std::path::PathBuf;
///
/// let locator = FileLocator::new(".");
/// let args = vec!["run".to_string(), "-c".to_string(), "ci.yml".to_string()];
/// assert_eq!(locator.locate(&args).unwrap(), Some(PathBuf::from("ci.yml")));
/// ```
#[derive(Debug, Clone)]
pub struct FileLocator {
    base_dir: PathBuf,
}

impl FileLocator {
    /// Create a locator probing default filenames under `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl Default for FileLocator {
    fn default() -> Self {
        Self::new(".")
    }
}

impl Locator for FileLocator {
    fn locate(&self, args: &[String]) -> Result<Option<PathBuf>> {
        let flag = parse_config_flag(args)?;
        if flag.provided {
            return Ok(Some(PathBuf::from(flag.path)));
        }

        let found = DEFAULT_CANDIDATES.iter().find_map(|candidate| {
            let path = if self.base_dir == PathBuf::from(".") {
                PathBuf::from(candidate)
            } else {
                self.base_dir.join(candidate)
            };
            path.exists().then_some(path)
        });

        Ok(found)
    }
}
