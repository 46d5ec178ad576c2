//! Resolve a runtime version against a remote catalog, download its archive,
//! unpack it into a layer directory and record what was installed so the next
//! run can skip the download.

pub mod archive;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod fetch;
pub mod installer;
pub mod layer;
pub mod runtime;
pub mod version;

pub use error::{ConfigError, InstallError};
pub use installer::{InstallOutcome, Installer};
pub use layer::{Layer, LayerMetadata};
pub use runtime::Runtime;
