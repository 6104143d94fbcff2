//! # Kiln Core Configuration Errors
//!
//! Defines [`ConfigError`], covering configuration file discovery, parsing,
//! path-variable expansion and merging. Every variant names the origin of the
//! offending fragment so a failing boot points at the file to fix.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error during operation '{operation}' on path '{path}': {source}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Deserialization of '{origin}' from '{format}' failed: {source}")]
    Deserialization {
        origin: String,
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Configuration fragment '{origin}' must have a map at its root, found {found}")]
    MalformedRoot { origin: String, found: &'static str },

    #[error("Unresolved path variable '%{variable}%' in fragment '{origin}'")]
    UnresolvedVariable { origin: String, variable: String },
}

impl ConfigError {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        ConfigError::Io {
            source,
            operation: operation.into(),
            path,
        }
    }

    pub fn deserialization<E>(origin: impl Into<String>, format: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ConfigError::Deserialization {
            origin: origin.into(),
            format: format.into(),
            source: Box::new(source),
        }
    }
}
