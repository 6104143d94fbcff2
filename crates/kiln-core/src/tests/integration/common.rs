use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};

use crate::config::fragment::{ConfigFragment, Priority};
use crate::kernel::bootstrap::KernelBuilder;
use crate::package::container::{ServiceBinder, ServiceContainer};
use crate::package::error::PackageFailure;
use crate::package::lifecycle::InitContext;
use crate::package::traits::Package;

// ===== MOCK PACKAGES =====

/// Declared by `acme/fake1`, a framework package.
pub struct Fake1Package {
    pub greeting: String,
}

pub struct Greeter(pub String);

impl Package for Fake1Package {
    fn identifier() -> &'static str {
        "Fake1Package"
    }

    fn config() -> Result<Option<ConfigFragment>, PackageFailure> {
        let data = json!({ "fake1": { "greeting": "hello", "log": "%log_dir%/fake1.log" } });
        Ok(Some(ConfigFragment::new("Fake1Package", Priority::PACKAGE, data)))
    }

    fn register(services: &mut ServiceBinder<'_>) -> Result<(), PackageFailure> {
        let greeting: String = services.config().get_or("fake1.greeting", "hi".to_string());
        services.bind_instance(Greeter(greeting));
        Ok(())
    }

    fn create(container: &ServiceContainer) -> Result<Self, PackageFailure> {
        Ok(Fake1Package {
            greeting: container.get::<Greeter>()?.0.clone(),
        })
    }
}

/// Declared by `acme/fake2`, a plain library: never auto-registered.
pub struct Fake2Package;

impl Package for Fake2Package {
    fn identifier() -> &'static str {
        "Fake2Package"
    }

    fn create(_container: &ServiceContainer) -> Result<Self, PackageFailure> {
        Ok(Fake2Package)
    }
}

/// Listed under `packages` in project configuration.
pub struct ExtraPackage;

impl Package for ExtraPackage {
    fn identifier() -> &'static str {
        "ExtraPackage"
    }

    fn create(_container: &ServiceContainer) -> Result<Self, PackageFailure> {
        Ok(ExtraPackage)
    }

    fn init(&self, context: &InitContext<'_>) -> Result<(), PackageFailure> {
        // Runs after Fake1Package, whose instance is shared
        let fake1 = context.instance::<Fake1Package>()?;
        if fake1.greeting.is_empty() {
            return Err("Fake1Package has no greeting".into());
        }
        Ok(())
    }
}

/// Fails while contributing configuration.
pub struct ExplodingPackage;

impl Package for ExplodingPackage {
    fn identifier() -> &'static str {
        "ExplodingPackage"
    }

    fn config() -> Result<Option<ConfigFragment>, PackageFailure> {
        Err("cannot provide configuration".into())
    }

    fn create(_container: &ServiceContainer) -> Result<Self, PackageFailure> {
        Ok(ExplodingPackage)
    }
}

// ===== FIXTURE =====

pub fn write_json(path: &Path, value: &Value) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).expect("Failed to write fixture");
}

/// An application directory with a manifest, a lock file and two vendor packages.
pub struct AppFixture {
    dir: TempDir,
}

impl AppFixture {
    pub fn new() -> Self {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path();
        write_json(
            &root.join("composer.json"),
            &json!({
                "name": "acme/app",
                "type": "project",
                "require": { "acme/fake1": "^1.0", "acme/fake2": "^1.0" }
            }),
        );
        write_json(
            &root.join("composer.lock"),
            &json!({
                "packages": [
                    { "name": "acme/fake1", "version": "1.0.0", "type": "kiln-package" },
                    { "name": "acme/fake2", "version": "1.2.0", "type": "library" }
                ]
            }),
        );
        write_json(
            &root.join("vendor/acme/fake1/composer.json"),
            &json!({ "name": "acme/fake1", "config": { "package": "Fake1Package" } }),
        );
        write_json(
            &root.join("vendor/acme/fake2/composer.json"),
            &json!({ "name": "acme/fake2", "config": { "package": "Fake2Package" } }),
        );
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self, name: &str) -> PathBuf {
        self.path().join("config").join(name)
    }

    pub fn write_config(&self, name: &str, value: &Value) {
        write_json(&self.config_path(name), value);
    }

    /// Builder knowing every mock package, with the boot cache off.
    pub fn builder(&self) -> KernelBuilder {
        KernelBuilder::new(self.path())
            .working_dir(self.path())
            .known_package::<Fake1Package>()
            .known_package::<Fake2Package>()
            .known_package::<ExtraPackage>()
            .known_package::<ExplodingPackage>()
            .cache(false)
    }

    /// Push the modification time of every fixture file and directory into
    /// the past, so a cache written now is strictly newer.
    pub fn age_sources(&self) {
        let past = SystemTime::now() - Duration::from_secs(60);
        let mut pending = vec![self.path().to_path_buf()];
        while let Some(path) = pending.pop() {
            if path.is_dir() {
                for entry in fs::read_dir(&path).unwrap() {
                    pending.push(entry.unwrap().path());
                }
            }
            set_modified(&path, past);
        }
    }
}

pub fn set_modified(path: &Path, time: SystemTime) {
    let file = if path.is_dir() {
        fs::File::open(path).unwrap()
    } else {
        fs::File::options().write(true).open(path).unwrap()
    };
    file.set_modified(time).unwrap();
}
