use std::io::Read;
use std::time::Duration;

use log::debug;
use url::Url;

use crate::error::{Error, Result};

/// Default upper bound on a single remote fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Byte-fetch capability for remote content.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>>;
}

/// Fetches over HTTP(S) with a per-request timeout and no retries.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_TIMEOUT)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        let fetch_error = |reason: String| Error::Fetch {
            url: url.to_string(),
            reason,
        };

        debug!("Fetching {url}");
        let response = self
            .agent
            .get(url.as_str())
            .call()
            .map_err(|e| fetch_error(e.to_string()))?;

        let mut data = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut data)
            .map_err(|e| fetch_error(e.to_string()))?;
        debug!("Fetched {} bytes from {url}", data.len());
        Ok(data)
    }
}
