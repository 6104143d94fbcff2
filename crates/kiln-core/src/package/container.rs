use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::config::data::ConfigData;
use crate::package::error::{PackageError, PackageFailure};

type SharedService = Arc<dyn Any + Send + Sync>;
type Factory = Box<dyn Fn(&ServiceContainer) -> Result<SharedService, PackageFailure> + Send + Sync>;

enum Binding {
    Instance(SharedService),
    Factory {
        factory: Factory,
        resolved: OnceLock<SharedService>,
    },
}

struct ServiceSlot {
    type_name: &'static str,
    bound_by: Option<String>,
    binding: Binding,
}

/// Type-keyed service bindings shared by every package.
///
/// Stands in for a full dependency-injection container: services are bound
/// as ready instances or as lazy factories, and a factory runs at most once.
#[derive(Default)]
pub struct ServiceContainer {
    services: HashMap<TypeId, ServiceSlot>,
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a ready instance. Rebinding a type replaces the previous binding.
    pub fn bind_instance<T: Any + Send + Sync>(&mut self, instance: Arc<T>) {
        self.insert::<T>(Binding::Instance(instance), None);
    }

    /// Bind a factory, resolved on first lookup.
    pub fn bind_factory<T, F>(&mut self, factory: F)
    where
        T: Any + Send + Sync,
        F: Fn(&ServiceContainer) -> Result<T, PackageFailure> + Send + Sync + 'static,
    {
        let factory: Factory = Box::new(move |container| {
            let service: SharedService = Arc::new(factory(container)?);
            Ok(service)
        });
        self.insert::<T>(
            Binding::Factory {
                factory,
                resolved: OnceLock::new(),
            },
            None,
        );
    }

    fn insert<T: Any>(&mut self, binding: Binding, bound_by: Option<String>) {
        let slot = ServiceSlot {
            type_name: type_name::<T>(),
            bound_by,
            binding,
        };
        if let Some(previous) = self.services.insert(TypeId::of::<T>(), slot) {
            log::debug!(
                "Service '{}' rebound (previously bound by {})",
                previous.type_name,
                previous.bound_by.as_deref().unwrap_or("the kernel")
            );
        }
    }

    pub fn has<T: Any>(&self) -> bool {
        self.services.contains_key(&TypeId::of::<T>())
    }

    /// Resolve a service by type.
    pub fn get<T: Any + Send + Sync>(&self) -> Result<Arc<T>, PackageError> {
        let slot = self
            .services
            .get(&TypeId::of::<T>())
            .ok_or(PackageError::ServiceNotBound(type_name::<T>()))?;

        let shared = match &slot.binding {
            Binding::Instance(instance) => Arc::clone(instance),
            Binding::Factory { factory, resolved } => match resolved.get() {
                Some(service) => Arc::clone(service),
                None => {
                    let service = factory(self).map_err(|source| PackageError::ServiceFactory {
                        service: slot.type_name,
                        source,
                    })?;
                    Arc::clone(resolved.get_or_init(|| service))
                }
            },
        };

        shared
            .downcast::<T>()
            .map_err(|_| PackageError::ServiceNotBound(type_name::<T>()))
    }

    /// Type names of every bound service, sorted.
    pub fn service_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.services.values().map(|slot| slot.type_name).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("services", &self.service_names())
            .finish()
    }
}

/// The handle passed to [`Package::register`](crate::package::Package::register).
///
/// Only binding operations and read-only access to the finalized
/// configuration are exposed.
pub struct ServiceBinder<'a> {
    container: &'a mut ServiceContainer,
    config: &'a ConfigData,
    package: &'a str,
}

impl<'a> ServiceBinder<'a> {
    pub(crate) fn new(container: &'a mut ServiceContainer, config: &'a ConfigData, package: &'a str) -> Self {
        Self {
            container,
            config,
            package,
        }
    }

    pub fn config(&self) -> &ConfigData {
        self.config
    }

    /// Identifier of the package currently registering.
    pub fn package(&self) -> &str {
        self.package
    }

    pub fn bind_instance<T: Any + Send + Sync>(&mut self, instance: T) -> &mut Self {
        self.bind_arc(Arc::new(instance))
    }

    pub fn bind_arc<T: Any + Send + Sync>(&mut self, instance: Arc<T>) -> &mut Self {
        self.container
            .insert::<T>(Binding::Instance(instance), Some(self.package.to_string()));
        self
    }

    pub fn bind_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Fn(&ServiceContainer) -> Result<T, PackageFailure> + Send + Sync + 'static,
    {
        self.container.bind_factory::<T, F>(factory);
        if let Some(slot) = self.container.services.get_mut(&TypeId::of::<T>()) {
            slot.bound_by = Some(self.package.to_string());
        }
        self
    }

    pub fn is_bound<T: Any>(&self) -> bool {
        self.container.has::<T>()
    }
}
