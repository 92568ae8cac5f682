//! Template root manifest types and parsing

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// File name of the manifest that sits at the top of every template root
pub const MANIFEST_FILE: &str = "template.yaml";

/// How an existing destination file is treated when a template writes over it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    /// Generated scaffolding that is safe to regenerate on every run
    AlwaysRefresh,
    /// Content the user is expected to edit; never clobbered silently
    Protect,
}

/// A resource specific variable declared by a template root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaVar {
    /// Raw value; strings may contain placeholders when `template` is set
    pub value: serde_yaml::Value,

    /// Render string values against the context before use
    #[serde(default)]
    pub template: bool,
}

/// Per-root manifest (templates/<root>/template.yaml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateManifest {
    /// Logical name of the root
    pub name: String,

    /// What the root scaffolds
    #[serde(default)]
    pub description: String,

    /// Minimum creator version this root was written for
    #[serde(default)]
    pub version: Option<String>,

    /// Paths regenerated on every run (CI config, build metadata)
    #[serde(default)]
    pub always_refresh: Vec<String>,

    /// Paths owned by the user; these win over `always_refresh`
    #[serde(default)]
    pub protect: Vec<String>,

    /// Extra variables merged into the context for this root only
    #[serde(default)]
    pub vars: BTreeMap<String, MetaVar>,
}

impl TemplateManifest {
    /// Check if a relative path matches any pattern in a list
    ///
    /// Supported forms: `dir/**` (anything below `dir`), `*suffix`,
    /// `prefix*` and exact paths.
    fn matches_any(rel_path: &str, patterns: &[String]) -> bool {
        patterns.iter().any(|pattern| {
            if let Some(dir) = pattern.strip_suffix("/**") {
                rel_path
                    .strip_prefix(dir)
                    .is_some_and(|rest| rest.starts_with('/'))
            } else if let Some(suffix) = pattern.strip_prefix('*') {
                rel_path.ends_with(suffix)
            } else if let Some(prefix) = pattern.strip_suffix('*') {
                rel_path.starts_with(prefix)
            } else {
                rel_path == pattern
            }
        })
    }

    /// Classify a file by its relative path inside the root
    ///
    /// Unlisted files are protected.
    pub fn classify(&self, rel_path: &str) -> Classification {
        if Self::matches_any(rel_path, &self.protect) {
            return Classification::Protect;
        }
        if Self::matches_any(rel_path, &self.always_refresh) {
            return Classification::AlwaysRefresh;
        }
        Classification::Protect
    }
}
