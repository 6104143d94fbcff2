use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::fragment::ConfigFragment;
use crate::package::container::{ServiceBinder, ServiceContainer};
use crate::package::error::PackageFailure;
use crate::package::traits::Package;

type ConfigHook = fn() -> Result<Option<ConfigFragment>, PackageFailure>;
type RegisterHook = fn(&mut ServiceBinder<'_>) -> Result<(), PackageFailure>;
type CreateHook = fn(&ServiceContainer) -> Result<PackageInstance, PackageFailure>;

/// A package type erased into its hooks.
#[derive(Clone, Copy)]
pub struct PackageDefinition {
    identifier: &'static str,
    type_id: TypeId,
    config: ConfigHook,
    register: RegisterHook,
    create: CreateHook,
}

impl PackageDefinition {
    pub fn of<P: Package>() -> Self {
        Self {
            identifier: P::identifier(),
            type_id: TypeId::of::<P>(),
            config: P::config,
            register: P::register,
            create: create_instance::<P>,
        }
    }

    pub fn identifier(&self) -> &'static str {
        self.identifier
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub(crate) fn call_config(&self) -> Result<Option<ConfigFragment>, PackageFailure> {
        (self.config)()
    }

    pub(crate) fn call_register(&self, services: &mut ServiceBinder<'_>) -> Result<(), PackageFailure> {
        (self.register)(services)
    }

    pub(crate) fn instantiate(&self, container: &ServiceContainer) -> Result<PackageInstance, PackageFailure> {
        (self.create)(container)
    }
}

impl fmt::Debug for PackageDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageDefinition")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

fn create_instance<P: Package>(container: &ServiceContainer) -> Result<PackageInstance, PackageFailure> {
    let package = Arc::new(P::create(container)?);
    Ok(PackageInstance::new(P::identifier(), package))
}

/// A constructed package. Clones share the same underlying instance.
#[derive(Clone)]
pub struct PackageInstance {
    identifier: &'static str,
    any: Arc<dyn Any + Send + Sync>,
    package: Arc<dyn Package>,
}

impl PackageInstance {
    fn new<P: Package>(identifier: &'static str, package: Arc<P>) -> Self {
        Self {
            identifier,
            any: package.clone(),
            package,
        }
    }

    pub fn identifier(&self) -> &'static str {
        self.identifier
    }

    pub fn package(&self) -> &dyn Package {
        self.package.as_ref()
    }

    /// The concrete instance, when it is a `P`.
    pub fn downcast<P: Package>(&self) -> Option<Arc<P>> {
        Arc::clone(&self.any).downcast::<P>().ok()
    }

    /// Whether both handles point at the same instance.
    pub fn ptr_eq(&self, other: &PackageInstance) -> bool {
        Arc::ptr_eq(&self.any, &other.any)
    }
}

impl fmt::Debug for PackageInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageInstance")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

/// Maps the identifiers found in manifests and configuration to package types.
#[derive(Debug, Clone, Default)]
pub struct PackageCatalog {
    definitions: HashMap<&'static str, PackageDefinition>,
}

impl PackageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `P` resolvable by its identifier. Re-adding a type replaces it.
    pub fn register<P: Package>(&mut self) -> &mut Self {
        self.insert(PackageDefinition::of::<P>())
    }

    pub fn insert(&mut self, definition: PackageDefinition) -> &mut Self {
        self.definitions.insert(definition.identifier(), definition);
        self
    }

    pub fn resolve(&self, identifier: &str) -> Option<PackageDefinition> {
        self.definitions.get(identifier).copied()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.definitions.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
