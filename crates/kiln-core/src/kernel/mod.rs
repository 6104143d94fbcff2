//! # Kiln Core Kernel
//!
//! The `kernel` module composes the manifest reader, the configuration
//! layers and the package lifecycle into one boot.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Bootstrapping**: [`KernelBuilder`](bootstrap::KernelBuilder) reads the
//!   manifest, merges default and project configuration, resolves the package
//!   set and drives the config, register and init phases. The resulting
//!   [`Kernel`](bootstrap::Kernel) is only returned when every step succeeded.
//! - **Directories**: [`Directories`](directories::Directories) resolves the
//!   application layout and provides the `%name%` path variables.
//! - **Boot Cache**: [`BootCache`](cache::BootCache) persists the merged
//!   configuration and package list and reuses them while no source file changed.
//! - **Core Constants** and **Error Handling** (`constants`, `error`).
pub mod bootstrap;
pub mod cache;
pub mod constants;
pub mod directories;
pub mod error;

pub use bootstrap::{Kernel, KernelBuilder};
pub use cache::BootCache;
pub use directories::Directories;
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
