//! Label catalog
//!
//! The catalog is the authoritative list of labels the bot may create or
//! reconcile on a repository. Names outside the catalog are never
//! materialized.
//!
//! A label may also list path prefixes. A pull request touching a file under
//! one of them gets the label when it is opened or reopened.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const NEEDS_TRIAGE: &str = "needs-triage";
pub const APPROVED: &str = "approved";
pub const DO_NOT_MERGE: &str = "do-not-merge";
pub const CI_FAILURE: &str = "ci-failure";

/// A label declared in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSpec {
    pub name: String,
    /// Six hex digits, no leading `#`
    pub color: String,
    #[serde(default)]
    pub description: String,
    /// Path prefixes that select this label for a pull request
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<PathBuf>,
}

impl LabelSpec {
    /// Build a validated label spec
    ///
    /// A leading `#` on the color is accepted and stripped.
    pub fn new(
        name: impl Into<String>,
        color: impl AsRef<str>,
        description: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ConfigError::EmptyLabelName);
        }

        let raw = color.as_ref().trim();
        let color = raw.strip_prefix('#').unwrap_or(raw);
        if color.len() != 6 || !color.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::InvalidColor {
                name,
                color: raw.to_string(),
            });
        }

        Ok(Self {
            name,
            color: color.to_lowercase(),
            description: description.into(),
            paths: Vec::new(),
        })
    }

    pub fn with_paths(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Whether any changed file lies under one of the label's paths
    ///
    /// Matching is by whole path components, `src/api` covers
    /// `src/api/mod.rs` but not `src/api_v2.rs`.
    pub fn matches_any<P: AsRef<Path>>(&self, changed: &[P]) -> bool {
        self.paths
            .iter()
            .any(|prefix| changed.iter().any(|file| file.as_ref().starts_with(prefix)))
    }

    fn builtin(name: &str, color: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
            description: description.to_string(),
            paths: Vec::new(),
        }
    }
}

/// The set of labels this bot is permitted to create and maintain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelCatalog {
    labels: Vec<LabelSpec>,
}

impl LabelCatalog {
    /// Labels the bot's own commands and event handlers depend on
    pub fn builtin() -> Vec<LabelSpec> {
        vec![
            LabelSpec::builtin(NEEDS_TRIAGE, "fbca04", "Waiting for a maintainer to triage"),
            LabelSpec::builtin(APPROVED, "0e8a16", "Approved for merge"),
            LabelSpec::builtin(DO_NOT_MERGE, "b60205", "Merging is on hold"),
            LabelSpec::builtin(CI_FAILURE, "d93f0b", "The default branch workflow failed"),
        ]
    }

    /// Catalog of exactly the given labels (later duplicates win)
    pub fn from_specs(specs: impl IntoIterator<Item = LabelSpec>) -> Self {
        let mut catalog = Self::default();
        for spec in specs {
            catalog.insert(spec);
        }
        catalog
    }

    /// Built-in labels overlaid with the configured ones
    pub fn with_builtin(configured: impl IntoIterator<Item = LabelSpec>) -> Self {
        Self::from_specs(Self::builtin().into_iter().chain(configured))
    }

    fn insert(&mut self, spec: LabelSpec) {
        match self.labels.iter_mut().find(|l| l.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.labels.push(spec),
        }
    }

    /// Look up a label by exact name
    pub fn get(&self, name: &str) -> Option<&LabelSpec> {
        self.labels.iter().find(|l| l.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names of the labels whose paths cover any of `changed`, in catalog order
    pub fn matching_paths<P: AsRef<Path>>(&self, changed: &[P]) -> Vec<&str> {
        self.labels
            .iter()
            .filter(|label| label.matches_any(changed))
            .map(|label| label.name.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabelSpec> {
        self.labels.iter()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
