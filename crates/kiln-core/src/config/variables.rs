use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::config::error::ConfigError;

/// Named values substituted into configuration strings as `%name%`.
///
/// `%%` produces a literal percent sign. A `%...%` span is only treated as a
/// variable when its content is a valid name (ASCII alphanumerics and `_`);
/// anything else, such as `50% of 20%`, is left as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathVariables {
    values: BTreeMap<String, String>,
}

impl PathVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Expand every string value in `value`, recursing through maps and lists.
    pub fn expand(&self, value: &Value, origin: &str) -> Result<Value, ConfigError> {
        Ok(match value {
            Value::String(s) => Value::String(self.expand_str(s, origin)?),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.expand(item, origin))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => Value::Object(self.expand_map(map, origin)?),
            other => other.clone(),
        })
    }

    /// Expand the values of a map. Keys are left as written.
    pub fn expand_map(&self, map: &Map<String, Value>, origin: &str) -> Result<Map<String, Value>, ConfigError> {
        let mut expanded = Map::with_capacity(map.len());
        for (key, item) in map {
            expanded.insert(key.clone(), self.expand(item, origin)?);
        }
        Ok(expanded)
    }

    /// Expand the variables of a single string.
    pub fn expand_str(&self, input: &str, origin: &str) -> Result<String, ConfigError> {
        if !input.contains('%') {
            return Ok(input.to_string());
        }

        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(start) = rest.find('%') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];

            if let Some(stripped) = after.strip_prefix('%') {
                out.push('%');
                rest = stripped;
                continue;
            }

            match after.find('%') {
                Some(end) if is_variable_name(&after[..end]) => {
                    let name = &after[..end];
                    let resolved = self.get(name).ok_or_else(|| ConfigError::UnresolvedVariable {
                        origin: origin.to_string(),
                        variable: name.to_string(),
                    })?;
                    out.push_str(resolved);
                    rest = &after[end + 1..];
                }
                _ => {
                    out.push('%');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}

fn is_variable_name(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}
