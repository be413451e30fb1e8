//! # golangcix
//!
//! Layered configuration for `golangci-lint`: a local file inherits a shared
//! remote base and the result is written to a generated file the linter runs
//! with.
//!
//! ## Overview
//!
//! A run goes through these steps:
//! - Locate the local configuration (`-c`/`--config` or the default names)
//! - Look for a `GOLANGCI_LINT_REMOTE_CONFIG:` comment directive
//! - Fetch the remote document, revalidating an on-disk copy with ETags
//! - Deep-merge local over remote and write `.golangci.generated.yml`
//!
//! Remote problems never fail a run. They are logged and the local
//! configuration is used on its own.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use golangcix::prelude::*;
//! use std::path::Path;
//!
//! # async fn example() -> golangcix::error::Result<()> {
//! let fetcher = HttpFetcher::builder()
//!     .with_cache_dir("/tmp/golangcix-cache")
//!     .build()?;
//! let service = Service::new(Box::new(fetcher));
//!
//! let generated = service.prepare(Path::new(".golangci.local.yml")).await?;
//! println!("lint with {}", generated.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Merge rules
//!
//! Mappings merge key by key. Anything else in the local file (scalars,
//! sequences) replaces the remote value wholesale.
//!
//! ```rust
//! use golangcix::core::{merge, normalize};
//!
//! let remote = normalize(b"linters: {enable: [errcheck]}\nrun: {timeout: 5m}").unwrap();
//! let local = normalize(b"linters: {enable: [govet]}").unwrap();
//! let merged = merge(&remote, &local);
//!
//! assert_eq!(merged, normalize(b"linters: {enable: [govet]}\nrun: {timeout: 5m}").unwrap());
//! ```

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod lint;
pub mod runner;
pub mod settings;
pub mod sources;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{ConfigService, Document, Service, merge, normalize};
    pub use crate::error::{ConfigError, Result};
    pub use crate::lint::{Linter, ToolRunner};
    pub use crate::runner::Runner;
    pub use crate::settings::Settings;
    pub use crate::sources::{FileLocator, HttpFetcher, Locator, RemoteFetcher};
}
