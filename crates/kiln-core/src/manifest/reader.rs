use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::kernel::constants;
use crate::manifest::descriptor::{normalize_version, PackageDescriptor, ProjectDescriptor};
use crate::manifest::error::ManifestError;

// --- Intermediate structs for deserialization ---

#[derive(Deserialize, Debug)]
struct RawManifest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    require: BTreeMap<String, Value>,
    #[serde(default, rename = "require-dev")]
    require_dev: BTreeMap<String, Value>,
    #[serde(default)]
    config: Map<String, Value>,
}

#[derive(Deserialize, Debug)]
struct RawLockEntry {
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, rename = "target-dir")]
    target_dir: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawLockFile {
    #[serde(default)]
    packages: Vec<RawLockEntry>,
    #[serde(default, rename = "packages-dev")]
    packages_dev: Vec<RawLockEntry>,
}

// --- End Intermediate structs ---

/// A resolved lock entry; its descriptor is built on first request.
#[derive(Debug)]
struct LockEntry {
    name: String,
    version: Option<String>,
    kind: String,
    description: Option<String>,
    target_dir: Option<String>,
    dev: bool,
    descriptor: OnceLock<PackageDescriptor>,
}

/// Reads a manifest/lock pair from disk.
#[derive(Debug, Clone, Default)]
pub struct ManifestReader;

impl ManifestReader {
    pub fn new() -> Self {
        Self
    }

    /// Parse `<name>.json` and its paired `<name>.lock`.
    ///
    /// Nested package manifests are not touched here; they are read when a
    /// descriptor is first requested through [`Manifest::package`].
    pub fn read(&self, manifest_path: &Path) -> Result<Manifest, ManifestError> {
        if !manifest_path.is_file() {
            return Err(ManifestError::ManifestNotFound(manifest_path.to_path_buf()));
        }
        let raw: RawManifest = read_json(manifest_path)?;

        let lock_path = manifest_path.with_extension(constants::LOCK_FILE_EXTENSION);
        if !lock_path.is_file() {
            return Err(ManifestError::LockFileNotFound(lock_path));
        }
        let lock: RawLockFile = read_json(&lock_path)?;

        let app_dir = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let vendor_dir = match raw.config.get("vendor-dir") {
            None => app_dir.join(constants::DEFAULT_VENDOR_DIR),
            Some(Value::String(dir)) => app_dir.join(dir),
            Some(_) => {
                return Err(ManifestError::Malformed {
                    path: manifest_path.to_path_buf(),
                    message: "config.vendor-dir must be a string".to_string(),
                });
            }
        };

        let mut entries = Vec::with_capacity(lock.packages.len() + lock.packages_dev.len());
        let mut index = HashMap::new();
        let all = lock
            .packages
            .into_iter()
            .map(|entry| (entry, false))
            .chain(lock.packages_dev.into_iter().map(|entry| (entry, true)));
        for (raw_entry, dev) in all {
            if index.contains_key(&raw_entry.name) {
                return Err(ManifestError::Malformed {
                    path: lock_path,
                    message: format!("package '{}' is listed more than once", raw_entry.name),
                });
            }
            index.insert(raw_entry.name.clone(), entries.len());
            entries.push(LockEntry {
                name: raw_entry.name,
                version: raw_entry.version.as_deref().map(normalize_version),
                kind: raw_entry
                    .kind
                    .unwrap_or_else(|| constants::DEFAULT_PACKAGE_KIND.to_string()),
                description: raw_entry.description,
                target_dir: raw_entry.target_dir,
                dev,
                descriptor: OnceLock::new(),
            });
        }

        let project = ProjectDescriptor {
            name: raw.name,
            version: raw.version.as_deref().map(normalize_version),
            kind: raw
                .kind
                .unwrap_or_else(|| constants::DEFAULT_PACKAGE_KIND.to_string()),
            description: raw.description,
            requires: raw.require.into_keys().chain(raw.require_dev.into_keys()).collect(),
            config: raw.config,
        };

        log::info!(
            "Loaded manifest {} with {} locked packages",
            manifest_path.display(),
            entries.len()
        );

        Ok(Manifest {
            manifest_path: manifest_path.to_path_buf(),
            lock_path,
            app_dir,
            vendor_dir,
            project,
            entries,
            index,
        })
    }
}

/// The parsed manifest/lock pair.
#[derive(Debug)]
pub struct Manifest {
    manifest_path: PathBuf,
    lock_path: PathBuf,
    app_dir: PathBuf,
    vendor_dir: PathBuf,
    project: ProjectDescriptor,
    entries: Vec<LockEntry>,
    index: HashMap<String, usize>,
}

impl Manifest {
    pub fn project(&self) -> &ProjectDescriptor {
        &self.project
    }

    /// Directory holding the manifest.
    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    pub fn vendor_dir(&self) -> &Path {
        &self.vendor_dir
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Files whose modification invalidates anything derived from this manifest.
    pub fn source_files(&self) -> Vec<PathBuf> {
        vec![self.manifest_path.clone(), self.lock_path.clone()]
    }

    /// Locked package names in lock order (`packages` then `packages-dev`).
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptor of one locked package, built and cached on first request.
    pub fn package(&self, name: &str) -> Result<&PackageDescriptor, ManifestError> {
        let idx = *self
            .index
            .get(name)
            .ok_or_else(|| ManifestError::UnknownPackage(name.to_string()))?;
        let entry = &self.entries[idx];
        if let Some(descriptor) = entry.descriptor.get() {
            return Ok(descriptor);
        }
        let descriptor = self.load_descriptor(entry)?;
        Ok(entry.descriptor.get_or_init(|| descriptor))
    }

    /// Every locked package, in lock order.
    pub fn packages(&self) -> Result<Vec<&PackageDescriptor>, ManifestError> {
        self.entries
            .iter()
            .map(|entry| self.package(&entry.name))
            .collect()
    }

    /// Framework packages whose nested config names a package identifier.
    ///
    /// Only entries of the framework kind have their nested manifest read.
    pub fn framework_packages(&self) -> Result<Vec<&PackageDescriptor>, ManifestError> {
        let mut found = Vec::new();
        for entry in &self.entries {
            if entry.kind != constants::FRAMEWORK_PACKAGE_KIND {
                continue;
            }
            let descriptor = self.package(&entry.name)?;
            if descriptor.package_identifier().is_some() {
                found.push(descriptor);
            } else {
                log::warn!(
                    "Framework package '{}' does not name a package in its config, skipping",
                    entry.name
                );
            }
        }
        Ok(found)
    }

    fn load_descriptor(&self, entry: &LockEntry) -> Result<PackageDescriptor, ManifestError> {
        let dir = self
            .vendor_dir
            .join(entry.target_dir.as_deref().unwrap_or(&entry.name));
        if !dir.is_dir() {
            return Err(ManifestError::PackageDirectoryNotFound {
                package: entry.name.clone(),
                path: dir,
            });
        }

        let file_name = self
            .manifest_path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_MANIFEST_FILE));
        let nested_path = dir.join(file_name);
        if !nested_path.is_file() {
            return Err(ManifestError::NestedManifestNotFound {
                package: entry.name.clone(),
                path: nested_path,
            });
        }
        let nested: RawManifest = read_json(&nested_path)?;
        log::debug!("Read nested manifest of '{}' from {}", entry.name, nested_path.display());

        Ok(PackageDescriptor {
            name: entry.name.clone(),
            version: entry.version.clone(),
            kind: entry.kind.clone(),
            description: entry.description.clone().or(nested.description),
            config: nested.config,
            dev: entry.dev,
            path: dir,
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ManifestError> {
    let content = fs::read_to_string(path).map_err(|e| ManifestError::io(e, path.to_path_buf()))?;
    serde_json::from_str(&content).map_err(|source| ManifestError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}
