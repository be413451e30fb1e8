//! Top-level entry point tying locator, config service, and linter together.

use crate::core::{ConfigService, build_final_args};
use crate::error::Result;
use crate::lint::Linter;
use crate::sources::Locator;

/// Runs one wrapper invocation.
///
/// # Examples
///
/// ```rust,no_run
/// use golangcix::core::Service;
/// use golangcix::lint::ToolRunner;
/// use golangcix::runner::Runner;
/// use golangcix::sources::{FileLocator, HttpFetcher};
///
/// # async fn example() -> golangcix::error::Result<()> {
/// let fetcher = HttpFetcher::builder().with_cache_dir("/tmp/cache").build()?;
/// let mut runner = Runner::new(
///     Box::new(FileLocator::default()),
///     Box::new(Service::new(Box::new(fetcher))),
///     Box::new(ToolRunner::new()),
/// );
/// runner.run(&["run".to_string(), "./...".to_string()]).await?;
/// # Ok(())
/// # }
/// ```
pub struct Runner {
    locator: Box<dyn Locator>,
    service: Box<dyn ConfigService>,
    linter: Box<dyn Linter>,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner").finish_non_exhaustive()
    }
}

impl Runner {
    /// Create a runner from its collaborators.
    pub fn new(
        locator: Box<dyn Locator>,
        service: Box<dyn ConfigService>,
        linter: Box<dyn Linter>,
    ) -> Self {
        Self {
            locator,
            service,
            linter,
        }
    }

    /// Resolve the configuration and run the linter with the raw CLI `args`.
    ///
    /// # Errors
    ///
    /// Returns an error, annotated with the failing step, if locating or
    /// preparing the configuration fails, the linter is unavailable, or the
    /// linter reports a failure.
    pub async fn run(&mut self, args: &[String]) -> Result<()> {
        let local = self
            .locator
            .locate(args)
            .map_err(|e| e.context("locate config"))?
            .filter(|path| !path.as_os_str().is_empty());

        let generated = match &local {
            Some(path) => Some(
                self.service
                    .prepare(path)
                    .await
                    .map_err(|e| e.context("prepare config"))?,
            ),
            None => {
                tracing::warn!("Local configuration file not found; running without generated config");
                None
            }
        };

        self.linter
            .ensure_available()
            .await
            .map_err(|e| e.context("ensure linter available"))?;

        let to_arg = |p: Option<&std::path::PathBuf>| {
            p.map(|p| p.to_string_lossy().into_owned()).unwrap_or_default()
        };
        let final_args = build_final_args(args, &to_arg(generated.as_ref()), &to_arg(local.as_ref()));

        self.linter
            .run(&final_args)
            .await
            .map_err(|e| e.context("run linter"))
    }
}
