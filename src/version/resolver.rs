//! Pick one concrete version from a catalog

use crate::error::InstallError;
use crate::version::dotted::{DottedVersion, find_highest};
use crate::version::specifier::{VersionSpecifier, satisfies_all};

/// Resolve a requested version against the versions available remotely.
///
/// # Arguments
/// * `requested` - Empty for the highest version, an exact catalog entry, or a constraint
/// * `catalog` - All versions listed by the remote endpoint, in any order
///
/// # Returns
/// The chosen catalog entry, unchanged. When several entries satisfy a
/// constraint the highest one wins.
pub fn resolve(requested: &str, catalog: &[String]) -> Result<String, InstallError> {
    match VersionSpecifier::parse(requested)? {
        VersionSpecifier::Latest => find_highest(catalog).ok_or(InstallError::NoVersionsAvailable),
        VersionSpecifier::Exact(version) => {
            if catalog.contains(&version) {
                Ok(version)
            } else {
                Err(InstallError::VersionNotFound { version })
            }
        }
        VersionSpecifier::Constraint(requirements) => catalog
            .iter()
            .filter_map(|v| DottedVersion::parse(v).map(|parsed| (v, parsed)))
            .filter(|(_, parsed)| satisfies_all(&requirements, parsed))
            .max_by(|(_, a), (_, b)| a.cmp(b))
            .map(|(original, _)| original.clone())
            .ok_or_else(|| InstallError::NoMatchingVersion {
                specifier: requested.trim().to_string(),
            }),
    }
}
