//! Declared backup models and the identity the registry gives each one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Identity of a registered model: its declaration index in the registry.
///
/// Two models sharing a trigger and even a label still have distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub(crate) usize);

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One declared backup job.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Model {
    /// Trigger identifier. Not required to be unique.
    pub trigger: String,
    /// Human readable description.
    pub label: String,
    /// What the job does. Only the executor looks inside.
    #[serde(flatten)]
    pub dsl: ModelDsl,
}

/// Declarative job definition.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelDsl {
    /// Files or directories to back up. `~` and `$HOME` are expanded.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Directory the model's archive is written under.
    #[serde(default)]
    pub target: String,
    /// File name patterns to skip, `*` matching any run of characters.
    pub ignore: Option<Vec<String>>,
}

impl Model {
    pub fn new(trigger: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            label: label.into(),
            dsl: ModelDsl::default(),
        }
    }

    pub fn with_dsl(mut self, dsl: ModelDsl) -> Self {
        self.dsl = dsl;
        self
    }

    /// Directory this model's files are copied into: `<target>/<trigger>`.
    pub fn archive_dir(&self) -> PathBuf {
        crate::path::expand_path(&self.dsl.target).join(&self.trigger)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.trigger)
    }
}
