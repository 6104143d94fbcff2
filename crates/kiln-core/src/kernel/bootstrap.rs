use std::any::Any;
use std::env;
use std::path::{self, Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use serde_json::{Map, Value};

use crate::config::data::ConfigData;
use crate::config::fragment::{ConfigFragment, Priority};
use crate::config::loader::ConfigLoader;
use crate::config::merger::{ConfigLayers, ConfigMerger};
use crate::kernel::cache::BootCache;
use crate::kernel::constants;
use crate::kernel::directories::Directories;
use crate::kernel::error::{Error, Result};
use crate::manifest::descriptor::PackageDescriptor;
use crate::manifest::reader::{Manifest, ManifestReader};
use crate::package::container::ServiceContainer;
use crate::package::definition::{PackageCatalog, PackageDefinition};
use crate::package::lifecycle::LifecycleRunner;
use crate::package::registry::PackageSet;
use crate::package::traits::Package;

/// Built-in defaults, the lowest configuration tier.
fn core_defaults(directories: &Directories) -> ConfigFragment {
    let mut dirs = Map::new();
    for (name, _) in directories.entries() {
        dirs.insert(name.to_string(), Value::String(format!("%{}%", name)));
    }
    let mut data = Map::new();
    data.insert("directories".to_string(), Value::Object(dirs));
    data.insert(constants::PACKAGES_CONFIG_KEY.to_string(), Value::Array(Vec::new()));
    ConfigFragment::from_map("defaults", Priority::CORE, data)
}

/// Configures and runs one boot.
///
/// ```no_run
/// use kiln_core::KernelBuilder;
///
/// let kernel = KernelBuilder::new("/srv/app").cache(false).boot()?;
/// println!("{} packages", kernel.packages().len());
/// # Ok::<(), kiln_core::Error>(())
/// ```
pub struct KernelBuilder {
    app_dir: PathBuf,
    manifest_file: String,
    working_dir: Option<PathBuf>,
    catalog: PackageCatalog,
    builtin: Vec<PackageDefinition>,
    fragments: Vec<ConfigFragment>,
    use_cache: bool,
}

impl KernelBuilder {
    pub fn new(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_dir: app_dir.into(),
            manifest_file: constants::DEFAULT_MANIFEST_FILE.to_string(),
            working_dir: None,
            catalog: PackageCatalog::new(),
            builtin: Vec::new(),
            fragments: Vec::new(),
            use_cache: true,
        }
    }

    /// Manifest file name inside the application directory; the lock file
    /// shares its stem.
    pub fn manifest_file(mut self, name: impl Into<String>) -> Self {
        self.manifest_file = name.into();
        self
    }

    /// Defaults to the process working directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Identifiers manifests and configuration may refer to.
    pub fn catalog(mut self, catalog: PackageCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Make `P` resolvable by identifier without registering it.
    pub fn known_package<P: Package>(mut self) -> Self {
        self.catalog.register::<P>();
        self
    }

    /// Always register `P`, ahead of discovered packages.
    pub fn package<P: Package>(mut self) -> Self {
        self.builtin.push(PackageDefinition::of::<P>());
        self
    }

    /// An extra fragment merged at its own priority.
    pub fn fragment(mut self, fragment: ConfigFragment) -> Self {
        self.fragments.push(fragment);
        self
    }

    pub fn cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self
    }

    pub fn boot(self) -> Result<Kernel> {
        log::info!("Initializing {} v{}", constants::APP_NAME, constants::APP_VERSION);

        let working_dir = match &self.working_dir {
            Some(dir) => resolve(dir)?,
            None => env::current_dir().map_err(|e| Error::io(e, "current_dir", PathBuf::from(".")))?,
        };
        // A relative application directory is taken from the working directory
        let app_dir = resolve(&working_dir.join(&self.app_dir))?;

        let started_at = SystemTime::now();
        let manifest = ManifestReader::new().read(&app_dir.join(&self.manifest_file))?;
        let directories = Arc::new(Directories::for_manifest(&manifest, working_dir));
        log::info!("Using application directory: {}", directories.app_dir.display());

        let loader = ConfigLoader::new(Priority::PROJECT);
        let config_files = loader.discover(&directories.config_dir)?;
        let sources = cache_sources(&manifest, &directories.config_dir, &config_files);
        let cache_file = directories.boot_cache_file();

        let cached = if self.use_cache {
            BootCache::load(&cache_file).filter(|cache| self.accepts(cache, &directories, &sources))
        } else {
            None
        };
        let from_cache = cached.is_some();

        let mut packages = PackageSet::new(self.catalog);
        for definition in &self.builtin {
            packages.add_definition(*definition);
        }

        let config = match cached {
            Some(cache) => {
                log::info!("Boot cache hit: {}", cache_file.display());
                for identifier in &cache.packages {
                    packages.add(identifier)?;
                }
                cache.config
            }
            None => {
                let mut fragments = vec![core_defaults(&directories)];
                fragments.extend(self.fragments);
                for path in &config_files {
                    fragments.push(loader.load_file(path)?);
                }
                let mut layers = ConfigLayers::new(ConfigMerger::new(directories.variables()), fragments)?;

                for descriptor in manifest.framework_packages()? {
                    if let Some(identifier) = descriptor.package_identifier() {
                        log::debug!("Package '{}' declared by {}", identifier, descriptor.name);
                        packages.add(identifier)?;
                    }
                }
                let configured = packages.add_configured(layers.current())?;
                log::debug!("{} package(s) added from configuration", configured);

                LifecycleRunner::new(&packages).config_phase(&mut layers)?;
                layers.finalize()
            }
        };
        let config = Arc::new(config);

        let mut container = ServiceContainer::new();
        container.bind_instance(Arc::clone(&directories));
        container.bind_instance(Arc::clone(&config));

        let runner = LifecycleRunner::new(&packages);
        runner.register_phase(&mut container, &config)?;
        runner.init_phase(&container, &config)?;

        if self.use_cache && !from_cache {
            let identifiers = packages.identifiers().into_iter().map(String::from).collect();
            let snapshot = BootCache::new(
                started_at,
                Directories::clone(&directories),
                sources,
                ConfigData::clone(&config),
                identifiers,
            );
            if let Err(e) = snapshot.store(&cache_file) {
                log::warn!("Failed to write boot cache: {}", e);
            }
        }

        log::info!("Kernel booted with {} package(s)", packages.len());
        Ok(Kernel {
            manifest,
            directories,
            config,
            packages,
            container,
            from_cache,
        })
    }

    fn accepts(&self, cache: &BootCache, directories: &Directories, sources: &[PathBuf]) -> bool {
        if !cache.is_fresh(directories, sources) {
            log::info!("Boot cache miss");
            return false;
        }
        let known = |id: &str| self.catalog.contains(id) || self.builtin.iter().any(|d| d.identifier() == id);
        if let Some(unknown) = cache.packages.iter().find(|id| !known(id.as_str())) {
            log::warn!("Boot cache names unknown package '{}', rebuilding", unknown);
            return false;
        }
        true
    }
}

/// Absolute form of `dir` without `.` components.
fn resolve(dir: &Path) -> Result<PathBuf> {
    path::absolute(dir).map_err(|e| Error::io(e, "absolute", dir.to_path_buf()))
}

/// Manifest, lock file, the config directory itself (so added or removed
/// files count) and every config file.
fn cache_sources(manifest: &Manifest, config_dir: &Path, config_files: &[PathBuf]) -> Vec<PathBuf> {
    let mut sources = manifest.source_files();
    if config_dir.is_dir() {
        sources.push(config_dir.to_path_buf());
    }
    sources.extend(config_files.iter().cloned());
    sources
}

/// A booted kernel. Only ever handed out after every phase succeeded.
#[derive(Debug)]
pub struct Kernel {
    manifest: Manifest,
    directories: Arc<Directories>,
    config: Arc<ConfigData>,
    packages: PackageSet,
    container: ServiceContainer,
    from_cache: bool,
}

impl Kernel {
    /// Boot `app_dir` with default settings and no known packages.
    pub fn boot(app_dir: impl Into<PathBuf>) -> Result<Self> {
        KernelBuilder::new(app_dir).boot()
    }

    pub fn builder(app_dir: impl Into<PathBuf>) -> KernelBuilder {
        KernelBuilder::new(app_dir)
    }

    pub fn config(&self) -> &ConfigData {
        &self.config
    }

    pub fn packages(&self) -> &PackageSet {
        &self.packages
    }

    pub fn container(&self) -> &ServiceContainer {
        &self.container
    }

    pub fn directories(&self) -> &Directories {
        &self.directories
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Whether configuration and package list came from the boot cache.
    pub fn is_from_cache(&self) -> bool {
        self.from_cache
    }

    /// Framework packages declared by the manifest.
    pub fn framework_packages(&self) -> Result<Vec<&PackageDescriptor>> {
        Ok(self.manifest.framework_packages()?)
    }

    /// Every package installed according to the lock file.
    pub fn installed_packages(&self) -> Result<Vec<&PackageDescriptor>> {
        Ok(self.manifest.packages()?)
    }

    pub fn service<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        Ok(self.container.get::<T>()?)
    }

    /// A registered package's instance.
    pub fn instance<P: Package>(&self) -> Result<Arc<P>> {
        Ok(self.packages.instance::<P>(&self.container)?)
    }
}
