use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

// =============================================================================
// Defaults
// =============================================================================

/// User agent sent with every request; the download endpoints answer
/// requests without it as not found
pub const DEFAULT_USER_AGENT: &str = "runtime-installer";

/// Stack the prebuilt tarballs target
pub const DEFAULT_OS: &str = "ubuntu2204";

pub const DEFAULT_VERSIONS_URL: &str = "https://dl.google.com/runtimes/{os}/{runtime}/version.json";

pub const DEFAULT_TARBALL_URL: &str =
    "https://dl.google.com/runtimes/{os}/{runtime}/{runtime}-{version}.tar.gz";

pub const DEFAULT_SDK_URL: &str = "https://storage.googleapis.com/dart-archive/channels/stable/release/{version}/sdk/dartsdk-linux-x64-release.zip";

/// Installer configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct InstallerConfig {
    pub user_agent: String,
    pub os: String,
    pub endpoints: EndpointsConfig,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            os: DEFAULT_OS.to_string(),
            endpoints: EndpointsConfig::default(),
        }
    }
}

/// URL templates for the remote endpoints
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EndpointsConfig {
    pub versions_url: String,
    pub tarball_url: String,
    pub sdk_url: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            versions_url: DEFAULT_VERSIONS_URL.to_string(),
            tarball_url: DEFAULT_TARBALL_URL.to_string(),
            sdk_url: DEFAULT_SDK_URL.to_string(),
        }
    }
}

impl InstallerConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default config file is
    /// used when present, otherwise built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = config_path();
                if default_path.is_file() {
                    Self::from_file(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Returns the path to the config directory for runtime-installer.
/// Uses $XDG_CONFIG_HOME/runtime-installer if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/runtime-installer,
/// or ./runtime-installer if neither is available.
pub fn config_dir() -> PathBuf {
    config_dir_with_env(std::env::var("XDG_CONFIG_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the default config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

fn config_dir_with_env(xdg_config_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let config_dir = xdg_config_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));

    config_dir.join("runtime-installer")
}
