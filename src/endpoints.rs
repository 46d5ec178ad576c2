//! Download URL templates
//!
//! Templates are plain strings with `{runtime}`, `{version}` and `{os}`
//! placeholders, e.g. `https://host/?runtime={runtime}&version={version}`.

use crate::config::EndpointsConfig;
use crate::runtime::Runtime;

/// URL templates for the catalog, tarball and SDK endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    versions_url: String,
    tarball_url: String,
    sdk_url: String,
    os: String,
}

impl Endpoints {
    pub fn new(config: &EndpointsConfig, os: &str) -> Self {
        Self {
            versions_url: config.versions_url.clone(),
            tarball_url: config.tarball_url.clone(),
            sdk_url: config.sdk_url.clone(),
            os: os.to_string(),
        }
    }

    /// URL listing all published versions of `runtime`
    pub fn versions_url(&self, runtime: Runtime) -> String {
        self.render(&self.versions_url, Some(runtime), None)
    }

    /// URL of the `.tar.gz` archive for `runtime` at `version`
    pub fn tarball_url(&self, runtime: Runtime, version: &str) -> String {
        self.render(&self.tarball_url, Some(runtime), Some(version))
    }

    /// URL of the `.zip` SDK archive at `version`
    pub fn sdk_url(&self, version: &str) -> String {
        self.render(&self.sdk_url, None, Some(version))
    }

    fn render(&self, template: &str, runtime: Option<Runtime>, version: Option<&str>) -> String {
        let mut url = template.replace("{os}", &self.os);
        if let Some(runtime) = runtime {
            url = url.replace("{runtime}", runtime.as_str());
        }
        if let Some(version) = version {
            url = url.replace("{version}", version);
        }
        url
    }
}
