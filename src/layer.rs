//! Install target directory and its persisted metadata

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::InstallError;

/// Provenance recorded after a successful install.
///
/// Unknown keys written by other tools are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_at: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A directory that receives one runtime install, with its metadata.
///
/// Metadata lives next to the directory, at `<path>.json`.
#[derive(Debug, Clone)]
pub struct Layer {
    pub path: PathBuf,
    pub metadata: LayerMetadata,
}

impl Layer {
    /// Layer with empty metadata; nothing is read from disk
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            metadata: LayerMetadata::default(),
        }
    }

    /// Open a layer, loading metadata persisted by an earlier install.
    ///
    /// A missing metadata file means nothing was installed yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, InstallError> {
        let path = path.into();
        let metadata_path = metadata_path(&path)?;

        let metadata = match fs::read_to_string(&metadata_path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                InstallError::MetadataReadFailed {
                    path: metadata_path.clone(),
                    reason: e.to_string(),
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => LayerMetadata::default(),
            Err(e) => {
                return Err(InstallError::MetadataReadFailed {
                    path: metadata_path,
                    reason: e.to_string(),
                });
            }
        };

        debug!("Opened layer {:?} with metadata {:?}", path, metadata);
        Ok(Self { path, metadata })
    }

    /// `<path>.json`; fails for paths such as `.` or `/` that have no name
    pub fn metadata_path(&self) -> Result<PathBuf, InstallError> {
        metadata_path(&self.path)
    }

    /// Persist the current metadata to `<path>.json`
    pub fn write_metadata(&self) -> Result<(), InstallError> {
        let metadata_path = self.metadata_path()?;
        let write_failed = |reason: String| InstallError::MetadataWriteFailed {
            path: metadata_path.clone(),
            reason,
        };

        let content =
            serde_json::to_string_pretty(&self.metadata).map_err(|e| write_failed(e.to_string()))?;
        fs::write(&metadata_path, content).map_err(|e| write_failed(e.to_string()))?;

        debug!("Wrote layer metadata {:?}", metadata_path);
        Ok(())
    }
}

fn metadata_path(layer_path: &Path) -> Result<PathBuf, InstallError> {
    let Some(name) = layer_path.file_name() else {
        return Err(InstallError::InvalidLayerPath {
            path: layer_path.to_path_buf(),
        });
    };
    let mut file_name = name.to_os_string();
    file_name.push(".json");
    Ok(layer_path.with_file_name(file_name))
}

/// Returns true if the metadata already records `resolved_version`.
///
/// Plain string equality: `1.0` and `1.0.0` are different installs.
pub fn already_installed(metadata: &LayerMetadata, resolved_version: &str) -> bool {
    metadata.version.as_deref() == Some(resolved_version)
}
