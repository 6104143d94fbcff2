//! # Kiln Core Package System Errors
//!
//! [`PackageError`] covers registry-level failures (an identifier that does
//! not resolve to a package, a malformed `packages` configuration entry).
//! [`LifecycleError`] wraps a failure raised by a package's own hook and tags
//! it with the package identifier and the [`Phase`] it happened in.
use std::fmt;
use thiserror::Error;

/// Error type returned by package hooks.
pub type PackageFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("Invalid package '{identifier}': {reason}")]
    InvalidPackage { identifier: String, reason: String },

    #[error("Configuration key '{key}' must be a list of package identifiers, found {found}")]
    PackagesNotAList { key: String, found: &'static str },

    #[error("Package '{0}' is not registered")]
    NotRegistered(String),

    #[error("Failed to construct package '{identifier}': {source}")]
    Instantiation {
        identifier: String,
        #[source]
        source: PackageFailure,
    },

    #[error("No service bound for type '{0}'")]
    ServiceNotBound(&'static str),

    #[error("Factory for service '{service}' failed: {source}")]
    ServiceFactory {
        service: &'static str,
        #[source]
        source: PackageFailure,
    },
}

impl PackageError {
    pub fn invalid_package(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        PackageError::InvalidPackage {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }
}

/// The three ordered stages every package passes through during boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Config,
    Register,
    Init,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Config => write!(f, "config"),
            Phase::Register => write!(f, "register"),
            Phase::Init => write!(f, "init"),
        }
    }
}

#[derive(Debug, Error)]
#[error("Package '{package}' failed during {phase} phase: {source}")]
pub struct LifecycleError {
    pub package: String,
    pub phase: Phase,
    #[source]
    pub source: PackageFailure,
}

impl LifecycleError {
    pub fn new(package: impl Into<String>, phase: Phase, source: impl Into<PackageFailure>) -> Self {
        Self {
            package: package.into(),
            phase,
            source: source.into(),
        }
    }
}
