//! # Kiln Core Manifest Errors
//!
//! Defines [`ManifestError`], raised while reading the project manifest, its
//! paired lock file, or the nested manifest of an installed package.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Manifest not found at path: {0}")]
    ManifestNotFound(PathBuf),

    #[error("Lock file not found at path: {0}")]
    LockFileNotFound(PathBuf),

    #[error("I/O error while reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in '{path}': {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown package '{0}': not listed in the lock file")]
    UnknownPackage(String),

    #[error("Directory of package '{package}' not found: {path}")]
    PackageDirectoryNotFound { package: String, path: PathBuf },

    #[error("Manifest of package '{package}' not found: {path}")]
    NestedManifestNotFound { package: String, path: PathBuf },

    #[error("Invalid manifest '{path}': {message}")]
    Malformed { path: PathBuf, message: String },
}

impl ManifestError {
    pub fn io(source: std::io::Error, path: PathBuf) -> Self {
        ManifestError::Io { path, source }
    }
}
