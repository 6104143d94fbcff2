use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

use serde_json::{Map, Value};

use crate::kernel::constants;

/// Priority tiers. Higher priorities override lower ones on key collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub i32);

impl Priority {
    /// Built-in core defaults
    pub const CORE: Priority = Priority(-100);
    /// Fragments contributed by packages during the config phase
    pub const PACKAGE: Priority = Priority(0);
    /// Files authored in the project's config directory
    pub const PROJECT: Priority = Priority(100);

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a fragment is authoritative or a distribution/example file.
///
/// Within one priority, distribution fragments always sort below
/// authoritative ones; the tag never moves a fragment into another tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Origin {
    Distribution,
    Authoritative,
}

impl Origin {
    /// Tag a file by its name: `app.dist.json` or `db.example.yaml` are distribution files.
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if constants::DISTRIBUTION_MARKERS
            .iter()
            .any(|marker| name.contains(marker))
        {
            Origin::Distribution
        } else {
            Origin::Authoritative
        }
    }
}

/// One prioritized source of configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFragment {
    /// Where the data came from (a file path, a package identifier, "defaults")
    pub source: String,
    pub priority: Priority,
    pub origin: Origin,
    /// Must be a map at the root; checked when merged
    pub data: Value,
}

impl ConfigFragment {
    pub fn new(source: impl Into<String>, priority: Priority, data: Value) -> Self {
        Self {
            source: source.into(),
            priority,
            origin: Origin::Authoritative,
            data,
        }
    }

    pub fn from_map(source: impl Into<String>, priority: Priority, data: Map<String, Value>) -> Self {
        Self::new(source, priority, Value::Object(data))
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Ordering used by the merger: priority first, then origin.
    pub(crate) fn merge_order(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then(self.origin.cmp(&other.origin))
    }
}
