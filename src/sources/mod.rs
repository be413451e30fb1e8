//! Collaborators that touch the outside world: the filesystem locator and the
//! remote fetcher.

mod locator;
mod remote;

pub use locator::{FileLocator, Locator};
pub use remote::{CachePaths, FetchOrigin, FetchResult, HttpFetcher, HttpFetcherBuilder, RemoteFetcher};
