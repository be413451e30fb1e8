//! Invocation of the external golangci-lint binary.

use crate::error::{ConfigError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

const GO_TOOL_PATH: &str = "github.com/golangci/golangci-lint/v2/cmd/golangci-lint";
const BINARY_NAME: &str = "golangci-lint";

/// The external linter.
#[async_trait]
pub trait Linter: Send + Sync {
    /// Check that the linter can be executed, choosing how to launch it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LinterUnavailable`] if no runnable linter exists.
    async fn ensure_available(&mut self) -> Result<()>;

    /// Run the linter with `args`, streaming its output to ours.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LinterFailed`] if the linter exits unsuccessfully.
    async fn run(&self, args: &[String]) -> Result<()>;
}

/// How the linter is launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Launch {
    /// `go tool <module path>` from the module's tool dependencies.
    GoTool,
    /// `golangci-lint` found on `PATH`.
    Binary,
}

/// Runs golangci-lint through `go tool` when the module pins it, otherwise
/// from `PATH`.
#[derive(Debug, Default)]
pub struct ToolRunner {
    launch: Option<Launch>,
}

impl ToolRunner {
    /// Create a runner; call [`Linter::ensure_available`] before running.
    pub fn new() -> Self {
        Self::default()
    }

    fn command(launch: Launch) -> Command {
        match launch {
            Launch::GoTool => {
                let mut cmd = Command::new("go");
                cmd.args(["tool", GO_TOOL_PATH]).env("CGO_ENABLED", "0");
                cmd
            }
            Launch::Binary => Command::new(BINARY_NAME),
        }
    }

    async fn succeeds(mut cmd: Command) -> bool {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .is_ok_and(|status| status.success())
    }

    async fn go_tool_available() -> bool {
        let mut exists = Command::new("go");
        exists
            .args(["tool", "-n", GO_TOOL_PATH])
            .env("CGO_ENABLED", "0");
        if !Self::succeeds(exists).await {
            return false;
        }

        let mut version = Self::command(Launch::GoTool);
        version.arg("--version");
        Self::succeeds(version).await
    }
}

#[async_trait]
impl Linter for ToolRunner {
    async fn ensure_available(&mut self) -> Result<()> {
        if Self::go_tool_available().await {
            tracing::debug!("Using golangci-lint via go tool");
            self.launch = Some(Launch::GoTool);
            return Ok(());
        }

        let mut version = Self::command(Launch::Binary);
        version.arg("--version");
        if Self::succeeds(version).await {
            tracing::debug!("Using golangci-lint from PATH");
            self.launch = Some(Launch::Binary);
            return Ok(());
        }

        Err(ConfigError::LinterUnavailable(
            "neither via 'go tool' nor in PATH".to_string(),
        ))
    }

    async fn run(&self, args: &[String]) -> Result<()> {
        let launch = self.launch.ok_or_else(|| {
            ConfigError::LinterUnavailable("availability was not checked".to_string())
        })?;

        let status = Self::command(launch).args(args).status().await?;
        if status.success() {
            Ok(())
        } else {
            Err(ConfigError::LinterFailed {
                code: status.code().unwrap_or(1),
            })
        }
    }
}
