use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::variables::PathVariables;
use crate::kernel::constants;
use crate::manifest::reader::Manifest;

/// Directories of one application, resolved once per boot.
///
/// Bound into the service container so packages can find them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directories {
    pub working_dir: PathBuf,
    pub app_dir: PathBuf,
    pub config_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub log_dir: PathBuf,
    pub debug_dir: PathBuf,
    pub vendor_dir: PathBuf,
}

impl Directories {
    /// Standard layout below `app_dir`.
    pub fn new(app_dir: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        let app_dir = app_dir.into();
        Self {
            working_dir: working_dir.into(),
            config_dir: app_dir.join(constants::CONFIG_DIR),
            cache_dir: app_dir.join(constants::CACHE_DIR),
            log_dir: app_dir.join(constants::LOG_DIR),
            debug_dir: app_dir.join(constants::DEBUG_DIR),
            vendor_dir: app_dir.join(constants::DEFAULT_VENDOR_DIR),
            app_dir,
        }
    }

    /// Layout for a parsed manifest; honors its vendor directory.
    pub fn for_manifest(manifest: &Manifest, working_dir: impl Into<PathBuf>) -> Self {
        let mut directories = Self::new(manifest.app_dir(), working_dir);
        directories.vendor_dir = manifest.vendor_dir().to_path_buf();
        directories
    }

    /// Path of the persisted boot cache.
    pub fn boot_cache_file(&self) -> PathBuf {
        self.cache_dir.join(constants::BOOT_CACHE_FILE)
    }

    /// `(name, path)` pairs, also the names of the `%name%` variables.
    pub fn entries(&self) -> [(&'static str, &Path); 7] {
        [
            ("working_dir", self.working_dir.as_path()),
            ("app_dir", self.app_dir.as_path()),
            ("config_dir", self.config_dir.as_path()),
            ("cache_dir", self.cache_dir.as_path()),
            ("log_dir", self.log_dir.as_path()),
            ("debug_dir", self.debug_dir.as_path()),
            ("vendor_dir", self.vendor_dir.as_path()),
        ]
    }

    pub fn variables(&self) -> PathVariables {
        let mut variables = PathVariables::new();
        for (name, path) in self.entries() {
            variables.insert(name, path.to_string_lossy());
        }
        variables
    }
}
