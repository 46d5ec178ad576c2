//! Remote version catalog

use tracing::debug;

use crate::error::InstallError;
use crate::fetch::Fetcher;

/// Fetches the list of versions published for a runtime.
///
/// The endpoint answers with a JSON array of version strings, e.g.
/// `["1.1.1", "3.3.3", "2.2.2"]`. Order is not significant.
pub fn fetch_catalog(fetcher: &dyn Fetcher, url: &str) -> Result<Vec<String>, InstallError> {
    let body = fetcher.fetch(url)?;

    let versions: Vec<String> =
        serde_json::from_reader(body).map_err(|source| InstallError::InvalidCatalog {
            url: url.to_string(),
            source,
        })?;

    debug!("Catalog {} lists {} versions", url, versions.len());
    Ok(versions)
}
