use std::path::{Path, PathBuf};

use semver::Version;
use serde_json::{Map, Value};

use crate::kernel::constants;

/// One installed dependency, as resolved by the lock file and completed with
/// the `config` block of its own nested manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageDescriptor {
    /// Unique identifier in `vendor/name` form
    pub name: String,
    /// Normalized version string (leading `v` stripped)
    pub version: Option<String>,
    /// Free-text category, `library` when undeclared
    pub kind: String,
    pub description: Option<String>,
    /// Nested configuration block, empty when the package declares none
    pub config: Map<String, Value>,
    /// Listed under `packages-dev` in the lock file
    pub dev: bool,
    /// Directory holding the package inside the vendor directory
    pub path: PathBuf,
}

impl PackageDescriptor {
    /// Whether this package is a framework package eligible for auto-registration.
    pub fn is_framework_package(&self) -> bool {
        self.kind == constants::FRAMEWORK_PACKAGE_KIND
    }

    /// The package identifier named by the nested config, if any.
    pub fn package_identifier(&self) -> Option<&str> {
        self.config
            .get(constants::PACKAGE_CONFIG_KEY)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }

    /// The version parsed as semver, when it is one.
    pub fn semver(&self) -> Option<Version> {
        self.version.as_deref().and_then(|v| Version::parse(v).ok())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The root project as declared by the primary manifest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectDescriptor {
    pub name: Option<String>,
    pub version: Option<String>,
    pub kind: String,
    pub description: Option<String>,
    /// Direct dependency names, `require` first then `require-dev`
    pub requires: Vec<String>,
    pub config: Map<String, Value>,
}

/// Strip a leading `v` from tags such as `v1.2.0`.
pub(crate) fn normalize_version(version: &str) -> String {
    let trimmed = version.trim();
    match trimmed.strip_prefix('v').or_else(|| trimmed.strip_prefix('V')) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest.to_string(),
        _ => trimmed.to_string(),
    }
}
