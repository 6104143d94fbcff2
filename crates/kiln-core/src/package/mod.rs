//! # Kiln Core Package System
//!
//! Packages are the framework's plugins. A package type implements the
//! [`Package`] trait and is made known to the kernel through a
//! [`PackageCatalog`], which maps the identifiers used in manifests and
//! configuration to [`PackageDefinition`]s.
//!
//! ## Key Components
//!
//! - **[`PackageSet`]**: the ordered, deduplicated registry for one boot. It
//!   also owns the lazily built package instances.
//! - **[`LifecycleRunner`]**: runs the config, register and init phases.
//! - **[`ServiceContainer`]** / **[`ServiceBinder`]**: the type-keyed service
//!   table packages bind into during the register phase.
//! - **[`InitContext`]**: what a package sees from its `init` hook.
pub mod container;
pub mod definition;
pub mod error;
pub mod lifecycle;
pub mod registry;
pub mod traits;

pub use container::{ServiceBinder, ServiceContainer};
pub use definition::{PackageCatalog, PackageDefinition, PackageInstance};
pub use error::{LifecycleError, PackageError, PackageFailure, Phase};
pub use lifecycle::{InitContext, LifecycleRunner};
pub use registry::PackageSet;
pub use traits::Package;

#[cfg(test)]
mod tests;
