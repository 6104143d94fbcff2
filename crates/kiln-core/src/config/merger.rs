use serde_json::{Map, Value};

use crate::config::data::ConfigData;
use crate::config::error::ConfigError;
use crate::config::fragment::ConfigFragment;
use crate::config::variables::PathVariables;

/// Folds prioritized fragments into one [`ConfigData`].
///
/// Fragments are stably sorted by `(priority, origin)`, so among equals the
/// one added last wins. Maps merge key by key at every depth; lists and
/// scalars are replaced wholesale. Path variables are expanded in each
/// fragment right before it is folded in.
#[derive(Debug, Clone, Default)]
pub struct ConfigMerger {
    variables: PathVariables,
}

impl ConfigMerger {
    pub fn new(variables: PathVariables) -> Self {
        Self { variables }
    }

    pub fn variables(&self) -> &PathVariables {
        &self.variables
    }

    pub fn merge(&self, fragments: &[ConfigFragment]) -> Result<ConfigData, ConfigError> {
        let mut ordered: Vec<&ConfigFragment> = fragments.iter().collect();
        ordered.sort_by(|a, b| a.merge_order(b));

        let mut merged = Map::new();
        for fragment in ordered {
            let Value::Object(root) = &fragment.data else {
                return Err(ConfigError::MalformedRoot {
                    origin: fragment.source.clone(),
                    found: value_kind(&fragment.data),
                });
            };
            let data = self.variables.expand_map(root, &fragment.source)?;
            log::trace!(
                "Merging fragment '{}' (priority {}, {:?})",
                fragment.source,
                fragment.priority,
                fragment.origin
            );
            deep_merge(&mut merged, data);
        }
        Ok(ConfigData::from_map(merged))
    }
}

/// Recursively apply `overlay` on top of `base`.
pub fn deep_merge(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        let incoming = match value {
            Value::Object(incoming) => incoming,
            scalar_or_list => {
                base.insert(key, scalar_or_list);
                continue;
            }
        };
        if let Some(Value::Object(existing)) = base.get_mut(&key) {
            deep_merge(existing, incoming);
            continue;
        }
        base.insert(key, Value::Object(incoming));
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}

/// The fragments of one boot, kept together with their current merge.
///
/// Every push re-folds all fragments, so a fragment added late still sits at
/// its own priority: a package fragment pushed after the project files never
/// overrides them.
#[derive(Debug, Clone)]
pub struct ConfigLayers {
    merger: ConfigMerger,
    fragments: Vec<ConfigFragment>,
    merged: ConfigData,
}

impl ConfigLayers {
    pub fn new(merger: ConfigMerger, fragments: Vec<ConfigFragment>) -> Result<Self, ConfigError> {
        let merged = merger.merge(&fragments)?;
        Ok(Self {
            merger,
            fragments,
            merged,
        })
    }

    pub fn push(&mut self, fragment: ConfigFragment) -> Result<(), ConfigError> {
        self.fragments.push(fragment);
        match self.merger.merge(&self.fragments) {
            Ok(merged) => {
                self.merged = merged;
                Ok(())
            }
            Err(e) => {
                self.fragments.pop();
                Err(e)
            }
        }
    }

    pub fn current(&self) -> &ConfigData {
        &self.merged
    }

    pub fn fragments(&self) -> &[ConfigFragment] {
        &self.fragments
    }

    /// Finish layering and hand back the final configuration.
    pub fn finalize(self) -> ConfigData {
        self.merged
    }
}
