use std::any::Any;
use std::sync::Arc;

use crate::config::data::ConfigData;
use crate::config::fragment::Priority;
use crate::config::merger::ConfigLayers;
use crate::package::container::{ServiceBinder, ServiceContainer};
use crate::package::definition::PackageInstance;
use crate::package::error::{LifecycleError, PackageError, Phase};
use crate::package::registry::PackageSet;
use crate::package::traits::Package;

/// What a package's `init` hook can see.
pub struct InitContext<'a> {
    config: &'a ConfigData,
    container: &'a ServiceContainer,
    packages: &'a PackageSet,
}

impl<'a> InitContext<'a> {
    pub fn new(config: &'a ConfigData, container: &'a ServiceContainer, packages: &'a PackageSet) -> Self {
        Self {
            config,
            container,
            packages,
        }
    }

    pub fn config(&self) -> &ConfigData {
        self.config
    }

    pub fn container(&self) -> &ServiceContainer {
        self.container
    }

    pub fn service<T: Any + Send + Sync>(&self) -> Result<Arc<T>, PackageError> {
        self.container.get::<T>()
    }

    /// Another package's instance; the same one the init phase uses.
    pub fn instance<P: Package>(&self) -> Result<Arc<P>, PackageError> {
        self.packages.instance::<P>(self.container)
    }

    pub fn instance_of(&self, identifier: &str) -> Result<PackageInstance, PackageError> {
        self.packages.instance_of(identifier, self.container)
    }
}

/// Drives the packages of a [`PackageSet`] through config, register and init.
///
/// Each phase finishes for every package before the next one starts, and
/// packages are visited in registration order. The first failure aborts.
pub struct LifecycleRunner<'a> {
    packages: &'a PackageSet,
}

impl<'a> LifecycleRunner<'a> {
    pub fn new(packages: &'a PackageSet) -> Self {
        Self { packages }
    }

    /// Fold every package's fragment into `layers` at the package tier.
    ///
    /// The fragment is pushed as soon as it is returned, so later packages
    /// override earlier ones and project files still override both.
    pub fn config_phase(&self, layers: &mut ConfigLayers) -> Result<(), LifecycleError> {
        log::info!("Config phase: {} package(s)", self.packages.len());
        for definition in self.packages.definitions() {
            let identifier = definition.identifier();
            let fragment = definition
                .call_config()
                .map_err(|e| LifecycleError::new(identifier, Phase::Config, e))?;
            let Some(fragment) = fragment else {
                continue;
            };
            if fragment.priority != Priority::PACKAGE {
                log::debug!(
                    "Package '{}' returned a fragment at priority {}, using the package tier",
                    identifier,
                    fragment.priority
                );
            }
            layers
                .push(fragment.with_priority(Priority::PACKAGE))
                .map_err(|e| LifecycleError::new(identifier, Phase::Config, e))?;
            log::debug!("Merged configuration from package '{}'", identifier);
        }
        log::debug!("Config phase finished");
        Ok(())
    }

    pub fn register_phase(&self, container: &mut ServiceContainer, config: &ConfigData) -> Result<(), LifecycleError> {
        log::info!("Register phase: {} package(s)", self.packages.len());
        for definition in self.packages.definitions() {
            let identifier = definition.identifier();
            let mut binder = ServiceBinder::new(container, config, identifier);
            definition
                .call_register(&mut binder)
                .map_err(|e| LifecycleError::new(identifier, Phase::Register, e))?;
        }
        log::debug!("Register phase finished, {} service(s) bound", container.len());
        Ok(())
    }

    pub fn init_phase(&self, container: &ServiceContainer, config: &ConfigData) -> Result<(), LifecycleError> {
        log::info!("Init phase: {} package(s)", self.packages.len());
        for identifier in self.packages.identifiers() {
            self.init_package(identifier, container, config)?;
        }
        log::debug!("Init phase finished");
        Ok(())
    }

    /// Instantiate one package (memoized) and run its `init` hook once.
    pub fn init_package(
        &self,
        identifier: &str,
        container: &ServiceContainer,
        config: &ConfigData,
    ) -> Result<PackageInstance, LifecycleError> {
        let instance = self
            .packages
            .instance_of(identifier, container)
            .map_err(|e| LifecycleError::new(identifier, Phase::Init, e))?;

        if self.packages.mark_initialized(instance.identifier()) {
            let context = InitContext::new(config, container, self.packages);
            instance
                .package()
                .init(&context)
                .map_err(|e| LifecycleError::new(identifier, Phase::Init, e))?;
            log::debug!("Initialized package '{}'", identifier);
        }
        Ok(instance)
    }
}
