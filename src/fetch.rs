//! HTTP fetching of catalogs and archives

use std::io::Read;

#[cfg(test)]
use mockall::automock;
use tracing::{debug, warn};

use crate::error::InstallError;

/// Unconsumed response body
pub type Body = Box<dyn Read + Send>;

/// Trait for fetching a URL as a byte stream
#[cfg_attr(test, automock)]
pub trait Fetcher: Send + Sync {
    /// Issues a single GET request for `url`
    ///
    /// # Returns
    /// * `Ok(Body)` - The response body on a success status, not yet read
    /// * `Err(InstallError::RuntimeUnavailable)` - The server answered with a non-success status
    /// * `Err(InstallError::FetchFailed)` - The request never got a response
    fn fetch(&self, url: &str) -> Result<Body, InstallError>;
}

/// Fetcher backed by a blocking reqwest client
///
/// Every request carries the configured user agent. The download endpoints
/// answer requests without it as not found.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Body, InstallError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| InstallError::FetchFailed {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} returned status {}", url, status);
            return Err(InstallError::RuntimeUnavailable {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(Box::new(response))
    }
}
