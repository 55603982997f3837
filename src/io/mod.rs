//! Injected capabilities for reaching content bytes.
//!
//! - [`FileSystem`]: existence checks and reads for local files
//!   ([`LocalFs`] on disk, [`MemoryFs`] for tests)
//! - [`Fetcher`]: remote fetches ([`HttpFetcher`])
//! - [`Resolver`]: dispatches on [`ContentData`](crate::model::ContentData)

mod fetch;
mod fs;
mod resolve;

pub use fetch::{DEFAULT_FETCH_TIMEOUT, Fetcher, HttpFetcher};
pub use fs::{FileSystem, LocalFs, MemoryFs};
pub use resolve::Resolver;
