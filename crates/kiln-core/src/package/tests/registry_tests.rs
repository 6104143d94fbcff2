use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;

use crate::config::data::ConfigData;
use crate::package::container::ServiceContainer;
use crate::package::definition::{PackageCatalog, PackageDefinition};
use crate::package::error::{PackageError, PackageFailure};
use crate::package::registry::PackageSet;
use crate::package::traits::Package;

struct Fake1Package;

impl Package for Fake1Package {
    fn identifier() -> &'static str {
        "Fake1Package"
    }

    fn create(_container: &ServiceContainer) -> Result<Self, PackageFailure> {
        Ok(Fake1Package)
    }
}

static CREATED: AtomicUsize = AtomicUsize::new(0);

struct CountingPackage;

impl Package for CountingPackage {
    fn identifier() -> &'static str {
        "CountingPackage"
    }

    fn create(_container: &ServiceContainer) -> Result<Self, PackageFailure> {
        CREATED.fetch_add(1, Ordering::SeqCst);
        Ok(CountingPackage)
    }
}

struct BrokenPackage;

impl Package for BrokenPackage {
    fn create(_container: &ServiceContainer) -> Result<Self, PackageFailure> {
        Err("missing dependency".into())
    }
}

fn catalog() -> PackageCatalog {
    let mut catalog = PackageCatalog::new();
    catalog
        .register::<Fake1Package>()
        .register::<CountingPackage>()
        .register::<BrokenPackage>();
    catalog
}

fn config(value: serde_json::Value) -> ConfigData {
    ConfigData::from_map(value.as_object().cloned().unwrap_or_default())
}

#[test]
fn test_add_is_idempotent() {
    let mut set = PackageSet::new(catalog());
    set.add("Fake1Package").unwrap();
    set.add("Fake1Package").unwrap();
    assert_eq!(set.len(), 1);
    assert!(set.contains("Fake1Package"));
}

#[test]
fn test_add_preserves_first_seen_order() {
    let mut set = PackageSet::new(catalog());
    set.add("CountingPackage").unwrap();
    set.add("Fake1Package").unwrap();
    set.add("CountingPackage").unwrap();
    assert_eq!(set.identifiers(), vec!["CountingPackage", "Fake1Package"]);
}

#[test]
fn test_unknown_identifier_is_rejected() {
    let mut set = PackageSet::new(catalog());
    match set.add("Fake2Package") {
        Err(PackageError::InvalidPackage { identifier, .. }) => assert_eq!(identifier, "Fake2Package"),
        other => panic!("Expected InvalidPackage, got {:?}", other),
    }
    assert!(set.is_empty());
}

#[test]
fn test_default_identifier_is_the_type_name() {
    let definition = PackageDefinition::of::<BrokenPackage>();
    assert!(definition.identifier().ends_with("BrokenPackage"));
    assert!(catalog().contains(definition.identifier()));
}

#[test]
fn test_add_definition_extends_catalog() {
    let mut set = PackageSet::new(PackageCatalog::new());
    set.add_package::<Fake1Package>();
    set.add_package::<Fake1Package>();
    assert_eq!(set.len(), 1);
    assert!(set.catalog().contains("Fake1Package"));
    // Resolvable by name from now on
    set.add("Fake1Package").unwrap();
    assert_eq!(set.len(), 1);
}

#[test]
fn test_add_from_config() {
    let mut set = PackageSet::new(catalog());
    set.add("Fake1Package").unwrap();

    let added = set
        .add_configured(&config(json!({ "packages": ["CountingPackage", "Fake1Package"] })))
        .unwrap();
    assert_eq!(added, 1);
    assert_eq!(set.identifiers(), vec!["Fake1Package", "CountingPackage"]);
}

#[test]
fn test_missing_packages_key_adds_nothing() {
    let mut set = PackageSet::new(catalog());
    assert_eq!(set.add_configured(&config(json!({}))).unwrap(), 0);
}

#[test]
fn test_packages_key_must_be_a_list() {
    let mut set = PackageSet::new(catalog());
    match set.add_configured(&config(json!({ "packages": "Fake1Package" }))) {
        Err(PackageError::PackagesNotAList { key, found }) => {
            assert_eq!(key, "packages");
            assert_eq!(found, "a string");
        }
        other => panic!("Expected PackagesNotAList, got {:?}", other),
    }
}

#[test]
fn test_non_string_entry_is_invalid() {
    let mut set = PackageSet::new(catalog());
    let result = set.add_configured(&config(json!({ "packages": [42] })));
    assert!(matches!(result, Err(PackageError::InvalidPackage { .. })));
}

#[test]
fn test_instance_is_memoized() {
    let mut set = PackageSet::new(catalog());
    set.add("CountingPackage").unwrap();
    let container = ServiceContainer::new();

    assert!(!set.is_instantiated("CountingPackage"));
    let first = set.instance_of("CountingPackage", &container).unwrap();
    let second = set.instance_of("CountingPackage", &container).unwrap();
    assert!(first.ptr_eq(&second));
    assert_eq!(CREATED.load(Ordering::SeqCst), 1);

    let typed: Arc<CountingPackage> = set.instance::<CountingPackage>(&container).unwrap();
    assert!(Arc::ptr_eq(&typed, &first.downcast::<CountingPackage>().unwrap()));
    assert!(first.downcast::<Fake1Package>().is_none());
}

#[test]
fn test_instance_of_unregistered_package() {
    let set = PackageSet::new(catalog());
    let result = set.instance_of("Fake1Package", &ServiceContainer::new());
    assert!(matches!(result, Err(PackageError::NotRegistered(id)) if id == "Fake1Package"));
}

#[test]
fn test_failed_construction_is_not_cached() {
    let mut set = PackageSet::new(catalog());
    set.add_package::<BrokenPackage>();
    let id = BrokenPackage::identifier();

    let result = set.instance_of(id, &ServiceContainer::new());
    match result {
        Err(PackageError::Instantiation { identifier, source }) => {
            assert_eq!(identifier, id);
            assert_eq!(source.to_string(), "missing dependency");
        }
        other => panic!("Expected Instantiation error, got {:?}", other),
    }
    assert!(!set.is_instantiated(id));
}
