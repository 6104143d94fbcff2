use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use crate::config::data::ConfigData;
use crate::config::merger::value_kind;
use crate::kernel::constants;
use crate::package::container::ServiceContainer;
use crate::package::definition::{PackageCatalog, PackageDefinition, PackageInstance};
use crate::package::error::PackageError;
use crate::package::traits::Package;

#[derive(Default)]
struct InstanceCache {
    instances: HashMap<&'static str, PackageInstance>,
    initialized: HashSet<&'static str>,
}

/// Deduplicated, insertion-ordered set of packages for one boot.
///
/// Identifiers are resolved through the [`PackageCatalog`] when added. Each
/// package is instantiated at most once; the instance is owned by the set
/// for the rest of the process.
pub struct PackageSet {
    catalog: PackageCatalog,
    entries: Vec<PackageDefinition>,
    index: HashSet<&'static str>,
    cache: Mutex<InstanceCache>,
}

impl PackageSet {
    pub fn new(catalog: PackageCatalog) -> Self {
        Self {
            catalog,
            entries: Vec::new(),
            index: HashSet::new(),
            cache: Mutex::new(InstanceCache::default()),
        }
    }

    /// Add a package by identifier. Adding an identifier twice is a no-op.
    pub fn add(&mut self, identifier: &str) -> Result<(), PackageError> {
        if self.index.contains(identifier) {
            log::debug!("Package '{}' already registered, ignoring", identifier);
            return Ok(());
        }
        let definition = self.catalog.resolve(identifier).ok_or_else(|| {
            PackageError::invalid_package(identifier, "no package type is known under this identifier")
        })?;
        self.push(definition);
        Ok(())
    }

    /// Add a typed definition, making it resolvable through the catalog too.
    pub fn add_definition(&mut self, definition: PackageDefinition) {
        if self.index.contains(definition.identifier()) {
            log::debug!("Package '{}' already registered, ignoring", definition.identifier());
            return;
        }
        self.catalog.insert(definition);
        self.push(definition);
    }

    pub fn add_package<P: Package>(&mut self) {
        self.add_definition(PackageDefinition::of::<P>());
    }

    fn push(&mut self, definition: PackageDefinition) {
        log::debug!("Registered package '{}'", definition.identifier());
        self.index.insert(definition.identifier());
        self.entries.push(definition);
    }

    /// Add every identifier listed under `key` in the configuration.
    ///
    /// A missing key is not an error; anything other than a list of strings is.
    pub fn add_from_config(&mut self, config: &ConfigData, key: &str) -> Result<usize, PackageError> {
        let Some(value) = config.get_value(key) else {
            return Ok(0);
        };
        let Value::Array(entries) = value else {
            return Err(PackageError::PackagesNotAList {
                key: key.to_string(),
                found: value_kind(value),
            });
        };

        let before = self.len();
        for entry in entries {
            match entry.as_str() {
                Some(identifier) => self.add(identifier)?,
                None => {
                    return Err(PackageError::invalid_package(
                        entry.to_string(),
                        format!("entries of '{}' must be strings, found {}", key, value_kind(entry)),
                    ));
                }
            }
        }
        Ok(self.len() - before)
    }

    /// Same as [`add_from_config`](Self::add_from_config) with the default `packages` key.
    pub fn add_configured(&mut self, config: &ConfigData) -> Result<usize, PackageError> {
        self.add_from_config(config, constants::PACKAGES_CONFIG_KEY)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifiers in registration order.
    pub fn identifiers(&self) -> Vec<&'static str> {
        self.entries.iter().map(|d| d.identifier()).collect()
    }

    pub fn definitions(&self) -> &[PackageDefinition] {
        &self.entries
    }

    pub fn get(&self, identifier: &str) -> Option<&PackageDefinition> {
        self.entries.iter().find(|d| d.identifier() == identifier)
    }

    pub fn catalog(&self) -> &PackageCatalog {
        &self.catalog
    }

    fn lock_cache(&self) -> MutexGuard<'_, InstanceCache> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The package's single instance, constructing it on first request.
    pub fn instance_of(&self, identifier: &str, container: &ServiceContainer) -> Result<PackageInstance, PackageError> {
        let definition = *self
            .get(identifier)
            .ok_or_else(|| PackageError::NotRegistered(identifier.to_string()))?;

        let mut cache = self.lock_cache();
        if let Some(instance) = cache.instances.get(definition.identifier()) {
            return Ok(instance.clone());
        }

        log::debug!("Instantiating package '{}'", definition.identifier());
        let instance = definition
            .instantiate(container)
            .map_err(|source| PackageError::Instantiation {
                identifier: definition.identifier().to_string(),
                source,
            })?;
        cache.instances.insert(definition.identifier(), instance.clone());
        Ok(instance)
    }

    /// Typed variant of [`instance_of`](Self::instance_of).
    pub fn instance<P: Package>(&self, container: &ServiceContainer) -> Result<Arc<P>, PackageError> {
        let instance = self.instance_of(P::identifier(), container)?;
        instance.downcast::<P>().ok_or_else(|| {
            PackageError::invalid_package(P::identifier(), "registered under this identifier with a different type")
        })
    }

    pub fn is_instantiated(&self, identifier: &str) -> bool {
        self.lock_cache().instances.contains_key(identifier)
    }

    pub fn is_initialized(&self, identifier: &str) -> bool {
        self.lock_cache().initialized.contains(identifier)
    }

    /// Record that `init` ran. Returns false when it had already been recorded.
    pub(crate) fn mark_initialized(&self, identifier: &'static str) -> bool {
        self.lock_cache().initialized.insert(identifier)
    }
}

impl std::fmt::Debug for PackageSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageSet")
            .field("packages", &self.identifiers())
            .finish_non_exhaustive()
    }
}
