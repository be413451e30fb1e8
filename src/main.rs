//! golangcix CLI
//!
//! Drop-in wrapper for `golangci-lint` that layers the local configuration
//! over a shared remote base before running the linter.

use clap::Parser;
use golangcix::core::Service;
use golangcix::error::Result;
use golangcix::lint::ToolRunner;
use golangcix::runner::Runner;
use golangcix::settings::Settings;
use golangcix::sources::{FileLocator, HttpFetcher};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = "\
All arguments are passed to golangci-lint unchanged, except -c/--config which
is replaced by the generated configuration.

To inherit a shared base configuration, add a comment to the local file:

    # GOLANGCI_LINT_REMOTE_CONFIG: https://example.com/golangci.yml

Environment:
    GOLANGCIX_CACHE_DIR              cache for remote documents (default ~/.cache/golangci-wrapper)
    GOLANGCIX_HTTP_TIMEOUT_SECS      per-request HTTP timeout (default 15)
    GOLANGCIX_FETCH_DEADLINE_SECS    deadline for the whole remote fetch (default 20)
    RUST_LOG                         log filter (default info)";

#[derive(Parser)]
#[command(name = "golangcix")]
#[command(about = "golangci-lint wrapper with remote base configuration")]
#[command(after_help = AFTER_HELP)]
struct Cli {
    /// Arguments forwarded to golangci-lint
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli.args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e.exit_code();
            if !matches!(e.root(), golangcix::error::ConfigError::LinterFailed { .. }) {
                tracing::error!(error = %e, "golangcix failed");
            }
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(args: Vec<String>) -> Result<()> {
    let settings = Settings::load()?;

    let fetcher = HttpFetcher::builder()
        .with_optional_cache_dir(settings.cache_dir.clone())
        .with_timeout(settings.http_timeout())
        .build()?;
    let service = Service::new(Box::new(fetcher)).with_fetch_deadline(settings.fetch_deadline());

    let mut runner = Runner::new(
        Box::new(FileLocator::default()),
        Box::new(service),
        Box::new(ToolRunner::new()),
    );
    runner.run(&args).await
}
