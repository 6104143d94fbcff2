use std::path::Path;

use serde_json::{Map, Value};

use crate::config::error::ConfigError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
    /// INI format (.ini) - requires "ini-config" feature
    #[cfg(feature = "ini-config")]
    Ini,
}

impl ConfigFormat {
    /// Short format name used in error messages and logs
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
            #[cfg(feature = "ini-config")]
            ConfigFormat::Ini => "ini",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                #[cfg(feature = "ini-config")]
                "ini" => Some(ConfigFormat::Ini),
                _ => None,
            })
    }

    /// Parse file content into a value tree. Blank content yields an empty map.
    ///
    /// The root is not checked here; the merger rejects non-map roots.
    pub fn parse(&self, content: &str, origin: &str) -> Result<Value, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        match self {
            ConfigFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::deserialization(origin, self.name(), e)),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| ConfigError::deserialization(origin, self.name(), e)),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(content)
                .map_err(|e| ConfigError::deserialization(origin, self.name(), e)),
            #[cfg(feature = "ini-config")]
            ConfigFormat::Ini => parse_ini(content, origin),
        }
    }
}

/// Sections become nested maps; keys before the first section sit at the root.
#[cfg(feature = "ini-config")]
fn parse_ini(content: &str, origin: &str) -> Result<Value, ConfigError> {
    let ini = ini::Ini::load_from_str(content)
        .map_err(|e| ConfigError::deserialization(origin, "ini", e))?;

    let mut root = Map::new();
    for (section, properties) in ini.iter() {
        let target = match section {
            None => &mut root,
            Some(name) => {
                let entry = root
                    .entry(name.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !entry.is_object() {
                    *entry = Value::Object(Map::new());
                }
                let Some(map) = entry.as_object_mut() else {
                    continue;
                };
                map
            }
        };
        for (key, value) in properties.iter() {
            target.insert(key.to_string(), Value::String(value.to_string()));
        }
    }
    Ok(Value::Object(root))
}
