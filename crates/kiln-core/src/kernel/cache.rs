use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::config::data::ConfigData;
use crate::kernel::directories::Directories;
use crate::kernel::error::{Error, Result};
use crate::utils::fs::latest_modification;

/// The `(config, packages)` pair of a finished boot, persisted as JSON.
///
/// The config was expanded against `directories`, so the snapshot only
/// applies to a boot resolving the same layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootCache {
    /// Milliseconds since the Unix epoch, taken before the sources were read
    pub built_at: u64,
    pub directories: Directories,
    /// Files the boot was derived from
    pub sources: Vec<PathBuf>,
    pub config: ConfigData,
    pub packages: Vec<String>,
}

fn millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl BootCache {
    /// Snapshot of a boot that started reading its sources at `built_at`.
    pub fn new(
        built_at: SystemTime,
        directories: Directories,
        sources: Vec<PathBuf>,
        config: ConfigData,
        packages: Vec<String>,
    ) -> Self {
        Self {
            built_at: millis(built_at),
            directories,
            sources,
            config,
            packages,
        }
    }

    /// Read a cache file. Anything unreadable is a miss, never an error.
    pub fn load(path: &Path) -> Option<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::debug!("No boot cache at {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(cache) => Some(cache),
            Err(e) => {
                log::warn!("Ignoring invalid boot cache {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Whether the snapshot is still valid for `directories` and `sources`.
    ///
    /// The layout and the source list must be unchanged and `built_at`
    /// strictly newer than the newest modification among the sources.
    pub fn is_fresh(&self, directories: &Directories, sources: &[PathBuf]) -> bool {
        if self.directories != *directories {
            log::debug!("Boot cache is stale: directory layout changed");
            return false;
        }
        if self.sources != sources {
            log::debug!("Boot cache is stale: configuration sources changed");
            return false;
        }
        match latest_modification(sources) {
            Ok(Some(latest)) => self.built_at > millis(latest),
            Ok(None) => true,
            Err(e) => {
                log::debug!("Boot cache is stale: {}", e);
                false
            }
        }
    }

    /// Write the snapshot atomically, creating the cache directory if needed.
    pub fn store(&self, path: &Path) -> Result<()> {
        let parent = path.parent().ok_or_else(|| Error::Cache {
            path: path.to_path_buf(),
            message: "cache file has no parent directory".to_string(),
        })?;
        fs::create_dir_all(parent).map_err(|e| Error::io(e, "create_dir_all", parent.to_path_buf()))?;

        let json = serde_json::to_vec_pretty(self).map_err(|e| Error::Cache {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut temp_file =
            NamedTempFile::new_in(parent).map_err(|e| Error::io(e, "create_temp_file", parent.to_path_buf()))?;
        temp_file
            .write_all(&json)
            .map_err(|e| Error::io(e, "write_to_temp_file", temp_file.path().to_path_buf()))?;
        temp_file
            .persist(path)
            .map_err(|e| Error::io(e.error, "persist_temp_file", path.to_path_buf()))?;

        log::debug!("Stored boot cache at {}", path.display());
        Ok(())
    }
}
