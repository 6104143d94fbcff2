//! # Kiln Core Manifest Reader
//!
//! Parses the dependency manifest (`composer.json`) and its lock file
//! (`composer.lock`) into [`PackageDescriptor`]s. The lock file is indexed
//! by package name up front; each package's nested manifest is only read
//! when its descriptor is first requested, then cached.
pub mod descriptor;
pub mod error;
pub mod reader;

pub use descriptor::{PackageDescriptor, ProjectDescriptor};
pub use error::ManifestError;
pub use reader::{Manifest, ManifestReader};
