//! Resolve, download and unpack runtimes into a layer

use tracing::info;

use crate::archive::{ArchiveFormat, extract};
use crate::endpoints::Endpoints;
use crate::error::InstallError;
use crate::fetch::Fetcher;
use crate::layer::{Layer, already_installed};
use crate::runtime::Runtime;
use crate::version::catalog::fetch_catalog;
use crate::version::resolver::resolve;

/// Name recorded in layer metadata for SDK installs
pub const SDK_RUNTIME_NAME: &str = "dart-sdk";

/// What an install call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The archive was downloaded and extracted
    Installed(String),
    /// The layer metadata already recorded this version; nothing was downloaded
    AlreadyInstalled(String),
}

impl InstallOutcome {
    pub fn version(&self) -> &str {
        match self {
            InstallOutcome::Installed(version) | InstallOutcome::AlreadyInstalled(version) => {
                version
            }
        }
    }
}

/// Installs runtimes into layers using the configured endpoints
pub struct Installer<F: Fetcher> {
    fetcher: F,
    endpoints: Endpoints,
}

impl<F: Fetcher> Installer<F> {
    pub fn new(fetcher: F, endpoints: Endpoints) -> Self {
        Self { fetcher, endpoints }
    }

    /// Fetch the catalog for `runtime` and pick the version `specifier` selects
    pub fn resolve_version(
        &self,
        runtime: Runtime,
        specifier: &str,
    ) -> Result<String, InstallError> {
        let catalog = fetch_catalog(&self.fetcher, &self.endpoints.versions_url(runtime))?;
        let version = resolve(specifier, &catalog)?;
        info!("Resolved {} version {} for specifier {:?}", runtime, version, specifier);
        Ok(version)
    }

    /// Install a tarball runtime.
    ///
    /// # Process
    ///
    /// 1. Fetch the version catalog and resolve `specifier` against it
    /// 2. Stop if the layer metadata already records the resolved version
    /// 3. Download the `.tar.gz` for the resolved version
    /// 4. Extract it into the layer directory
    /// 5. Record the version in the layer metadata
    ///
    /// # Errors
    ///
    /// Every failure is returned as-is; no other version is tried. Files
    /// extracted before a failure are left in place.
    pub fn install_by_specifier(
        &self,
        runtime: Runtime,
        specifier: &str,
        layer: &mut Layer,
    ) -> Result<InstallOutcome, InstallError> {
        let version = self.resolve_version(runtime, specifier)?;
        let url = self.endpoints.tarball_url(runtime, &version);
        self.install_archive(runtime.as_str(), version, &url, ArchiveFormat::TarGz, layer)
    }

    /// Install an SDK published at a fixed version, without a catalog lookup.
    ///
    /// # Process
    ///
    /// 1. Stop if the layer metadata already records `version`
    /// 2. Download the `.zip` for `version`
    /// 3. Extract it into the layer directory
    /// 4. Record the version in the layer metadata
    pub fn install_fixed(
        &self,
        version: &str,
        layer: &mut Layer,
    ) -> Result<InstallOutcome, InstallError> {
        let url = self.endpoints.sdk_url(version);
        self.install_archive(
            SDK_RUNTIME_NAME,
            version.to_string(),
            &url,
            ArchiveFormat::Zip,
            layer,
        )
    }

    fn install_archive(
        &self,
        runtime_name: &str,
        version: String,
        url: &str,
        format: ArchiveFormat,
        layer: &mut Layer,
    ) -> Result<InstallOutcome, InstallError> {
        if already_installed(&layer.metadata, &version) {
            info!(
                "{} {} is already installed in {:?}, skipping download",
                runtime_name, version, layer.path
            );
            return Ok(InstallOutcome::AlreadyInstalled(version));
        }

        // Fail before downloading when the metadata has nowhere to go
        layer.metadata_path()?;

        info!("Installing {} {} from {}", runtime_name, version, url);
        let body = self.fetcher.fetch(url)?;
        extract(body, format, &layer.path)?;

        layer.metadata.version = Some(version.clone());
        layer.metadata.runtime = Some(runtime_name.to_string());
        layer.metadata.installed_at = Some(chrono::Utc::now().to_rfc3339());
        layer.write_metadata()?;

        info!("Installed {} {} into {:?}", runtime_name, version, layer.path);
        Ok(InstallOutcome::Installed(version))
    }
}
