//! Dotted numeric version parsing and precedence

use std::cmp::Ordering;

use semver::Prerelease;

/// A version made of any number of numeric components, e.g. `3.3.3` or `11.0.20.1`.
///
/// Ordering compares components left-to-right as integers, padding the shorter
/// sequence with zeros, so `1.2` == `1.2.0`. A release outranks any pre-release
/// of the same components (`1.0.0` > `1.0.0-rc.1`).
#[derive(Debug, Clone)]
pub struct DottedVersion {
    release: Vec<u64>,
    pre: Prerelease,
}

impl DottedVersion {
    /// Parse a version string, accepting an optional `v` prefix and ignoring
    /// `+build` metadata.
    ///
    /// Examples:
    /// - "3.3.3" -> [3, 3, 3]
    /// - "v1.2" -> [1, 2]
    /// - "2.0.0-rc.1" -> [2, 0, 0] with pre-release "rc.1"
    pub fn parse(version: &str) -> Option<Self> {
        let version = version.trim();
        let version = version.strip_prefix('v').unwrap_or(version);
        let version = version.split_once('+').map_or(version, |(v, _)| v);

        let (release, pre) = match version.split_once('-') {
            Some((release, pre)) => (release, Prerelease::new(pre).ok()?),
            None => (version, Prerelease::EMPTY),
        };

        let release = release
            .split('.')
            .map(|part| part.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;

        Some(Self { release, pre })
    }

    /// Numeric component at `index`, zero when the version is shorter.
    pub fn component(&self, index: usize) -> u64 {
        self.release.get(index).copied().unwrap_or(0)
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }
}

impl Ord for DottedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.release.len().max(other.release.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.pre.cmp(&other.pre))
    }
}

impl PartialOrd for DottedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for DottedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DottedVersion {}

/// Find the highest-precedence entry in `versions`, returning the original string.
///
/// Unparseable entries are skipped. Pre-releases are only chosen when the list
/// holds no stable release.
pub fn find_highest(versions: &[String]) -> Option<String> {
    let parsed: Vec<(&String, DottedVersion)> = versions
        .iter()
        .filter_map(|v| DottedVersion::parse(v).map(|parsed| (v, parsed)))
        .collect();

    let has_stable = parsed.iter().any(|(_, v)| !v.is_prerelease());

    parsed
        .into_iter()
        .filter(|(_, v)| !has_stable || !v.is_prerelease())
        .max_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(original, _)| original.clone())
}
