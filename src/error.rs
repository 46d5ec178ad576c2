use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("No versions available in catalog")]
    NoVersionsAvailable,

    #[error("Version {version} not found in catalog")]
    VersionNotFound { version: String },

    #[error("No version in catalog matches {specifier}")]
    NoMatchingVersion { specifier: String },

    #[error("Invalid version specifier {specifier:?}: {reason}")]
    InvalidSpecifier { specifier: String, reason: String },

    #[error("Runtime unavailable: {url} returned {status}")]
    RuntimeUnavailable { url: String, status: u16 },

    #[error("Failed to fetch {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid version catalog from {url}: {source}")]
    InvalidCatalog {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Corrupt archive: {reason}")]
    CorruptArchive { reason: String },

    #[error("Failed to write {path:?}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Layer path {path:?} has no final component to name its metadata file")]
    InvalidLayerPath { path: PathBuf },

    #[error("Failed to read layer metadata {path:?}: {reason}")]
    MetadataReadFailed { path: PathBuf, reason: String },

    #[error("Failed to write layer metadata {path:?}: {reason}")]
    MetadataWriteFailed { path: PathBuf, reason: String },
}

impl InstallError {
    pub(crate) fn corrupt(reason: impl std::fmt::Display) -> Self {
        InstallError::CorruptArchive {
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
