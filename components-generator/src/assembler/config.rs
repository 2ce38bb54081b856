//! Per-type JSON config

use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::error::{GeneratorError, Result};

/// Section naming files that override base files wholesale
pub const REPLACEMENT_FILES: &str = "replacement_files";
/// Section naming stylesheet includes
pub const SASS_REPLACE: &str = "sass_replace";
/// Section naming components to make available
pub const COMPONENTS: &str = "components";
/// Section naming page templates to copy
pub const TEMPLATES: &str = "templates";
/// Section naming scripts to copy
pub const JS: &str = "js";

/// One top-level entry of a type config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Section identifier
    pub name: String,
    /// String entries of the section's array
    pub entries: Vec<String>,
}

/// A parsed `type-<id>.json`, sections kept in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeConfig {
    sections: Vec<Section>,
}

impl TypeConfig {
    /// Read and parse the config at `path`
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::TypeConfig`] if the file cannot be read or is
    /// not a JSON object.
    pub fn load(type_id: &str, path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| GeneratorError::TypeConfig {
            type_id: type_id.to_string(),
            reason: format!("{}: {e}", path.display()),
        })?;
        Self::parse(type_id, &contents)
    }

    /// Parse config JSON
    ///
    /// Top-level keys become sections in the order written. Values that are
    /// not arrays, and array items that are not strings, are skipped with a
    /// warning.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::TypeConfig`] if the text is not a JSON object.
    pub fn parse(type_id: &str, json: &str) -> Result<Self> {
        let map: Map<String, Value> =
            serde_json::from_str(json).map_err(|e| GeneratorError::TypeConfig {
                type_id: type_id.to_string(),
                reason: e.to_string(),
            })?;

        let sections = map
            .into_iter()
            .map(|(name, value)| {
                let entries = match value {
                    Value::Array(items) => items
                        .into_iter()
                        .filter_map(|item| match item {
                            Value::String(s) => Some(s),
                            other => {
                                tracing::warn!(section = %name, value = %other, "skipping non-string entry");
                                None
                            }
                        })
                        .collect(),
                    other => {
                        tracing::warn!(section = %name, value = %other, "section is not an array");
                        Vec::new()
                    }
                };
                Section { name, entries }
            })
            .collect();

        Ok(Self { sections })
    }

    /// Sections in config order
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Entries of the first section called `name`
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&[String]> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.entries.as_slice())
    }

    /// Files the type overrides, empty when there is no such section
    #[must_use]
    pub fn replacement_files(&self) -> &[String] {
        self.section(REPLACEMENT_FILES).unwrap_or_default()
    }
}
