use std::fs;

use serde_json::json;

use super::common::{AppFixture, ExplodingPackage, ExtraPackage, Fake1Package, Greeter};
use crate::kernel::bootstrap::KernelBuilder;
use crate::kernel::directories::Directories;
use crate::kernel::error::Error;
use crate::manifest::error::ManifestError;
use crate::package::error::Phase;

#[test]
fn test_only_framework_packages_are_auto_registered() {
    let app = AppFixture::new();
    let kernel = app.builder().boot().unwrap();

    assert_eq!(kernel.packages().identifiers(), vec!["Fake1Package"]);
    assert!(!kernel.packages().contains("Fake2Package"));
    assert_eq!(kernel.framework_packages().unwrap().len(), 1);
    assert_eq!(kernel.installed_packages().unwrap().len(), 2);
}

#[test]
fn test_boot_merges_packages_and_project_config() {
    let app = AppFixture::new();
    app.write_config("app.json", &json!({ "fake1": { "greeting": "howdy" }, "name": "demo" }));

    let kernel = app.builder().boot().unwrap();
    let config = kernel.config();

    assert_eq!(config.get::<String>("fake1.greeting").unwrap(), "howdy");
    assert_eq!(config.get::<String>("name").unwrap(), "demo");
    let log_dir = app.path().join("var/log");
    assert_eq!(
        config.get::<String>("fake1.log").unwrap(),
        format!("{}/fake1.log", log_dir.display())
    );
    assert_eq!(
        config.get::<String>("directories.config_dir").unwrap(),
        app.path().join("config").display().to_string()
    );

    // The register phase saw the final configuration
    assert_eq!(kernel.service::<Greeter>().unwrap().0, "howdy");
    assert_eq!(kernel.instance::<Fake1Package>().unwrap().greeting, "howdy");
}

#[test]
fn test_configured_packages_follow_manifest_packages() {
    let app = AppFixture::new();
    app.write_config("packages.json", &json!({ "packages": ["ExtraPackage", "Fake1Package"] }));

    let kernel = app.builder().boot().unwrap();
    assert_eq!(kernel.packages().identifiers(), vec!["Fake1Package", "ExtraPackage"]);
    assert!(kernel.packages().is_initialized("ExtraPackage"));
}

#[test]
fn test_builtin_packages_come_first() {
    let app = AppFixture::new();
    let kernel = app.builder().package::<ExtraPackage>().boot().unwrap();
    assert_eq!(kernel.packages().identifiers(), vec!["ExtraPackage", "Fake1Package"]);
}

#[test]
fn test_config_phase_failure_aborts_boot() {
    let app = AppFixture::new();
    app.write_config("packages.json", &json!({ "packages": ["ExplodingPackage", "ExtraPackage"] }));

    match app.builder().boot() {
        Err(Error::Lifecycle(e)) => {
            assert_eq!(e.package, "ExplodingPackage");
            assert_eq!(e.phase, Phase::Config);
        }
        other => panic!("Expected a config phase failure, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_missing_manifest_fails_before_merge() {
    let app = AppFixture::new();
    fs::remove_file(app.path().join("composer.json")).unwrap();
    // Would fail the merge if it were ever read
    app.write_config("broken.json", &json!("not a map"));

    let result = app.builder().boot();
    assert!(matches!(result, Err(Error::Manifest(ManifestError::ManifestNotFound(_)))));
}

#[test]
fn test_unknown_configured_package_is_rejected() {
    let app = AppFixture::new();
    app.write_config("packages.json", &json!({ "packages": ["NoSuchPackage"] }));
    assert!(matches!(app.builder().boot(), Err(Error::Package(_))));
}

#[test]
fn test_unresolved_variable_is_a_config_error() {
    let app = AppFixture::new();
    app.write_config("app.json", &json!({ "path": "%nope_dir%/x" }));
    assert!(matches!(app.builder().boot(), Err(Error::Config(_))));
}

#[test]
fn test_directories_are_bound_as_a_service() {
    let app = AppFixture::new();
    let kernel = app.builder().boot().unwrap();

    let directories = kernel.service::<Directories>().unwrap();
    assert_eq!(directories.app_dir, app.path());
    assert_eq!(directories.vendor_dir, app.path().join("vendor"));
    assert_eq!(kernel.directories(), directories.as_ref());
}

#[test]
fn test_cache_round_trip() {
    let app = AppFixture::new();
    app.write_config("app.json", &json!({ "name": "cached" }));
    app.age_sources();

    let first = app.builder().cache(true).boot().unwrap();
    assert!(!first.is_from_cache());
    assert!(app.path().join("var/cache/kernel.json").is_file());

    let second = app.builder().cache(true).boot().unwrap();
    assert!(second.is_from_cache());
    assert_eq!(second.config(), first.config());
    assert_eq!(second.packages().identifiers(), first.packages().identifiers());
    // Register and init still ran
    assert_eq!(second.instance::<Fake1Package>().unwrap().greeting, "hello");
}

#[test]
fn test_cache_is_not_reused_from_another_working_dir() {
    let app = AppFixture::new();
    let elsewhere = tempfile::tempdir().unwrap();
    app.age_sources();

    let first = app.builder().cache(true).boot().unwrap();
    assert!(!first.is_from_cache());

    let second = app.builder().working_dir(elsewhere.path()).cache(true).boot().unwrap();
    assert!(!second.is_from_cache());
    assert_eq!(
        second.config().get::<String>("directories.working_dir").unwrap(),
        second.directories().working_dir.display().to_string()
    );
    assert_eq!(second.directories().working_dir, elsewhere.path());

    // The rewritten snapshot now belongs to the new layout
    let third = app.builder().working_dir(elsewhere.path()).cache(true).boot().unwrap();
    assert!(third.is_from_cache());
    assert_eq!(third.config(), second.config());
}

#[test]
fn test_cache_is_invalidated_by_a_new_config_file() {
    let app = AppFixture::new();
    app.write_config("app.json", &json!({ "name": "before" }));
    app.age_sources();
    app.builder().cache(true).boot().unwrap();

    app.write_config("later.json", &json!({ "name": "after" }));
    let kernel = app.builder().cache(true).boot().unwrap();
    assert!(!kernel.is_from_cache());
    assert_eq!(kernel.config().get::<String>("name").unwrap(), "after");
}

#[test]
fn test_corrupt_cache_is_a_miss() {
    let app = AppFixture::new();
    let cache_file = app.path().join("var/cache/kernel.json");
    fs::create_dir_all(cache_file.parent().unwrap()).unwrap();
    fs::write(&cache_file, "{ not json").unwrap();

    let kernel = KernelBuilder::new(app.path())
        .working_dir(app.path())
        .known_package::<Fake1Package>()
        .boot()
        .unwrap();
    assert!(!kernel.is_from_cache());
    assert_eq!(kernel.packages().identifiers(), vec!["Fake1Package"]);
}
