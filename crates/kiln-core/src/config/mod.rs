//! # Kiln Core Configuration
//!
//! Layered configuration: every source (core defaults, package-contributed
//! fragments, project files) becomes a [`ConfigFragment`] carrying a
//! [`Priority`], and the [`ConfigMerger`] folds them into one [`ConfigData`].
//!
//! - **[`format`]**: file format detection and parsing (JSON, YAML, TOML, INI).
//! - **[`loader`]**: discovery of configuration files under a directory.
//! - **[`variables`]**: `%name%` path variable expansion.
//! - **[`merger`]**: the deep merge and the [`ConfigLayers`] used during boot.
//! - **[`data`]**: the merged tree and its dotted-path lookups.
pub mod data;
pub mod error;
pub mod format;
pub mod fragment;
pub mod loader;
pub mod merger;
pub mod variables;

pub use data::ConfigData;
pub use error::ConfigError;
pub use format::ConfigFormat;
pub use fragment::{ConfigFragment, Origin, Priority};
pub use loader::ConfigLoader;
pub use merger::{deep_merge, ConfigLayers, ConfigMerger};
pub use variables::PathVariables;

#[cfg(test)]
mod tests;
