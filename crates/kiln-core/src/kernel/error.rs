//! # Kiln Core Kernel Errors
//!
//! Defines [`Error`], the top-level error surfaced by the kernel facade.
//! Each subsystem keeps its own typed error enum; this one wraps them so a
//! failed boot reports the first error encountered, whatever its origin.
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::error::ConfigError;
use crate::manifest::error::ManifestError;
use crate::package::error::{LifecycleError, PackageError};

#[derive(Debug, ThisError)]
pub enum Error {
    /// Missing or corrupt manifest, lock file or nested package manifest
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Malformed fragment, unsupported file or unresolved path variable
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Identifier failing the package contract, or a bad `packages` entry
    #[error("Package error: {0}")]
    Package(#[from] PackageError),

    /// Failure raised by a package hook
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("I/O error during operation '{operation}' on path '{path}': {source}")]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the boot cache failed. Reading a bad cache is never an error.
    #[error("Boot cache error on '{path}': {message}")]
    Cache { path: PathBuf, message: String },
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl Error {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::Io {
            source,
            operation: operation.into(),
            path,
        }
    }
}
