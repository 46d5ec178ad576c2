//! Version specifier grammar
//!
//! A specifier is one of:
//! - empty - the highest available version
//! - `2.2.2` - exactly this catalog entry
//! - a constraint made of one or more requirements separated by commas or
//!   whitespace, all of which must hold:
//!   - `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3`, `=1.2.3` - comparison operators
//!   - `2.x.x`, `2.*`, `*` - wildcards (`x`, `X` and `*` are equivalent)
//!
//! Comparison operators take a fully numeric token. Pre-release catalog entries
//! only satisfy a constraint when one of its requirements names a pre-release.

use crate::error::InstallError;
use crate::version::dotted::DottedVersion;

/// Parsed form of a requested version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpecifier {
    /// No version requested: pick the highest available
    Latest,
    /// A single token with no operator or wildcard, matched by string equality
    Exact(String),
    /// One or more requirements that must all be satisfied
    Constraint(Vec<Requirement>),
}

/// A single requirement inside a constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Exact(DottedVersion),
    Gt(DottedVersion),
    Gte(DottedVersion),
    Lt(DottedVersion),
    Lte(DottedVersion),
    /// `2.x.x` keeps the numeric prefix `[2]`
    Wildcard(Vec<u64>),
    /// `*`
    Any,
}

impl VersionSpecifier {
    pub fn parse(spec: &str) -> Result<Self, InstallError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Ok(VersionSpecifier::Latest);
        }

        let parts = split_requirements(spec);
        if let [single] = parts.as_slice()
            && !starts_with_operator(single)
            && !has_wildcard(single)
        {
            return Ok(VersionSpecifier::Exact(single.clone()));
        }

        let requirements = parts
            .iter()
            .map(|part| {
                Requirement::parse(part).ok_or_else(|| InstallError::InvalidSpecifier {
                    specifier: spec.to_string(),
                    reason: format!("cannot parse requirement {part:?}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(VersionSpecifier::Constraint(requirements))
    }
}

impl Requirement {
    fn parse(part: &str) -> Option<Self> {
        if let Some(rest) = part.strip_prefix(">=") {
            DottedVersion::parse(rest).map(Requirement::Gte)
        } else if let Some(rest) = part.strip_prefix('>') {
            DottedVersion::parse(rest).map(Requirement::Gt)
        } else if let Some(rest) = part.strip_prefix("<=") {
            DottedVersion::parse(rest).map(Requirement::Lte)
        } else if let Some(rest) = part.strip_prefix('<') {
            DottedVersion::parse(rest).map(Requirement::Lt)
        } else {
            let rest = part.strip_prefix('=').unwrap_or(part);
            Self::parse_wildcard(rest)
                .or_else(|| DottedVersion::parse(rest).map(Requirement::Exact))
        }
    }

    /// Parse patterns like "2.x.x", "1.2.*" or "*"
    fn parse_wildcard(part: &str) -> Option<Self> {
        if !has_wildcard(part) {
            return None;
        }

        let part = part.strip_prefix('v').unwrap_or(part);
        let mut prefix = Vec::new();
        let mut seen_wildcard = false;
        for component in part.split('.') {
            if is_wildcard(component) {
                seen_wildcard = true;
            } else if seen_wildcard {
                // "2.x.3" is not a pattern
                return None;
            } else {
                prefix.push(component.parse::<u64>().ok()?);
            }
        }

        if prefix.is_empty() {
            Some(Requirement::Any)
        } else {
            Some(Requirement::Wildcard(prefix))
        }
    }

    /// Check if a version satisfies this requirement
    pub fn satisfies(&self, version: &DottedVersion) -> bool {
        match self {
            Requirement::Exact(v) => version == v,
            Requirement::Gt(v) => version > v,
            Requirement::Gte(v) => version >= v,
            Requirement::Lt(v) => version < v,
            Requirement::Lte(v) => version <= v,
            Requirement::Wildcard(prefix) => prefix
                .iter()
                .enumerate()
                .all(|(i, component)| version.component(i) == *component),
            Requirement::Any => true,
        }
    }

    fn names_prerelease(&self) -> bool {
        match self {
            Requirement::Exact(v)
            | Requirement::Gt(v)
            | Requirement::Gte(v)
            | Requirement::Lt(v)
            | Requirement::Lte(v) => v.is_prerelease(),
            Requirement::Wildcard(_) | Requirement::Any => false,
        }
    }
}

/// Check a version against every requirement of a constraint
pub fn satisfies_all(requirements: &[Requirement], version: &DottedVersion) -> bool {
    if version.is_prerelease() && !requirements.iter().any(Requirement::names_prerelease) {
        return false;
    }
    requirements.iter().all(|req| req.satisfies(version))
}

/// Split on commas and whitespace, re-attaching operators written apart from
/// their version (">= 2.0" -> ">=2.0").
fn split_requirements(spec: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut pending_op: Option<&str> = None;

    for word in spec
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|w| !w.is_empty())
    {
        if let Some(op) = pending_op.take() {
            parts.push(format!("{op}{word}"));
        } else if word.chars().all(|c| matches!(c, '<' | '>' | '=')) {
            pending_op = Some(word);
        } else {
            parts.push(word.to_string());
        }
    }

    if let Some(op) = pending_op {
        parts.push(op.to_string());
    }
    parts
}

fn starts_with_operator(part: &str) -> bool {
    part.starts_with(['<', '>', '='])
}

fn is_wildcard(component: &str) -> bool {
    matches!(component, "x" | "X" | "*")
}

fn has_wildcard(part: &str) -> bool {
    part.split('.').any(is_wildcard)
}
