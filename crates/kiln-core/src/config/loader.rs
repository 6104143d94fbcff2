use std::fs;
use std::path::{Path, PathBuf};

use crate::config::error::ConfigError;
use crate::config::format::ConfigFormat;
use crate::config::fragment::{ConfigFragment, Origin, Priority};
use crate::utils::fs::find_files;

/// Turns the files of a configuration directory into fragments.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    priority: Priority,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(Priority::PROJECT)
    }
}

impl ConfigLoader {
    /// Loader assigning `priority` to every fragment it produces
    pub fn new(priority: Priority) -> Self {
        Self { priority }
    }

    /// Supported configuration files below `dir`, recursively, in sorted path order.
    ///
    /// A missing directory holds no configuration.
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
        let mut files = find_files(dir, &|path: &Path| ConfigFormat::from_path(path).is_some())
            .map_err(|e| ConfigError::io(e, "discover", dir.to_path_buf()))?;
        files.sort();
        Ok(files)
    }

    /// Parse one file into a fragment tagged with its origin.
    pub fn load_file(&self, path: &Path) -> Result<ConfigFragment, ConfigError> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::io(e, "read_to_string", path.to_path_buf()))?;
        let source = path.display().to_string();
        let data = format.parse(&content, &source)?;
        let origin = Origin::from_path(path);

        log::debug!(
            "Loaded {} config fragment {} (priority {}, {:?})",
            format.name(),
            source,
            self.priority,
            origin
        );
        Ok(ConfigFragment::new(source, self.priority, data).with_origin(origin))
    }

    /// Every fragment of `dir`, in discovery order.
    pub fn load_dir(&self, dir: &Path) -> Result<Vec<ConfigFragment>, ConfigError> {
        let files = self.discover(dir)?;
        if files.is_empty() {
            log::debug!("No configuration files found in {}", dir.display());
        }
        files.iter().map(|path| self.load_file(path)).collect()
    }
}
