pub mod config;
pub mod kernel;
pub mod manifest;
pub mod package;
pub mod utils;

// Re-export the types the binary and packages use most
pub use config::{ConfigData, ConfigFragment, Origin, Priority};
pub use kernel::error::{Error, Result};
pub use kernel::{Directories, Kernel, KernelBuilder};
pub use manifest::{Manifest, ManifestReader, PackageDescriptor};
pub use package::{
    InitContext, LifecycleError, Package, PackageCatalog, PackageError, PackageFailure, PackageSet, Phase,
    ServiceBinder, ServiceContainer,
};

#[cfg(test)]
mod tests;
