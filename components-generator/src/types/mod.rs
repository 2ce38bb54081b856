//! Theme type discovery and the types index
//!
//! Every `configs/type-<id>.json` file in the library defines one theme type.
//! The index written to `types.json` maps each id to a display title and is
//! what the `types` command lists.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GeneratorError, Result};

const CONFIG_PREFIX: &str = "type-";
const CONFIG_SUFFIX: &str = ".json";

/// A discovered theme type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Slug taken from the config file name
    pub id: String,
    /// Display title
    pub title: String,
    /// Path of the type's JSON config
    pub config_path: PathBuf,
}

impl TypeDescriptor {
    /// Build a descriptor from a config file path
    ///
    /// Returns `None` when the file name does not look like `type-<id>.json`.
    #[must_use]
    pub fn from_config_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let id = type_id_from_file_name(name)?;
        Some(Self {
            id: id.to_string(),
            title: title_from_slug(id),
            config_path: path.to_path_buf(),
        })
    }
}

/// Extract `<id>` from `type-<id>.json`
///
/// The id must be non-empty and contain no `.`.
#[must_use]
pub fn type_id_from_file_name(name: &str) -> Option<&str> {
    let id = name.strip_prefix(CONFIG_PREFIX)?.strip_suffix(CONFIG_SUFFIX)?;
    (!id.is_empty() && !id.contains('.')).then_some(id)
}

/// `business-plus` becomes `Business Plus`
///
/// Only the first character of each word is touched, so `seo-PRO` becomes
/// `Seo PRO`.
#[must_use]
pub fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Path of the config file for `type_id` inside a library
#[must_use]
pub fn config_path(library_dir: &Path, type_id: &str) -> PathBuf {
    library_dir
        .join("configs")
        .join(format!("{CONFIG_PREFIX}{type_id}{CONFIG_SUFFIX}"))
}

/// Scan `<library_dir>/configs` for type configs, sorted by file name
///
/// A missing or unreadable directory yields an empty list.
#[must_use]
pub fn discover(library_dir: &Path) -> Vec<TypeDescriptor> {
    let configs_dir = library_dir.join("configs");
    let Ok(entries) = fs::read_dir(&configs_dir) else {
        tracing::debug!(path = %configs_dir.display(), "configs directory not readable");
        return Vec::new();
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    paths
        .iter()
        .filter_map(|path| TypeDescriptor::from_config_path(path))
        .collect()
}

/// What a rebuild of the index did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    /// The index was written with this many types
    Written(usize),
    /// No configs were found; any existing index was left alone
    Skipped,
}

/// The id → title map persisted as `types.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypesIndex {
    types: BTreeMap<String, String>,
}

impl TypesIndex {
    /// Build an index from descriptors; later duplicates win
    #[must_use]
    pub fn from_descriptors(descriptors: &[TypeDescriptor]) -> Self {
        let types = descriptors
            .iter()
            .map(|d| (d.id.clone(), d.title.clone()))
            .collect();
        Self { types }
    }

    /// Number of types
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when no types are known
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Title for a type id
    #[must_use]
    pub fn title(&self, id: &str) -> Option<&str> {
        self.types.get(id).map(String::as_str)
    }

    /// `(id, title)` pairs ordered by id
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.types.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Read an index file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON object of strings.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| GeneratorError::io(path, e))?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write the index as pretty-printed JSON, replacing the file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| GeneratorError::io(path, e))
    }
}

/// Rebuild `index_path` from the configs of `library_dir`
///
/// When no type configs exist, an error is logged and nothing is written.
///
/// # Errors
///
/// Returns an error if the index file cannot be written.
pub fn rebuild_index(library_dir: &Path, index_path: &Path) -> Result<IndexOutcome> {
    let descriptors = discover(library_dir);
    if descriptors.is_empty() {
        tracing::error!(
            path = %library_dir.join("configs").display(),
            "Error: types.json was not rebuilt successfully because configs were not able to be read"
        );
        return Ok(IndexOutcome::Skipped);
    }

    let index = TypesIndex::from_descriptors(&descriptors);
    index.save(index_path)?;
    tracing::info!(
        path = %index_path.display(),
        types = index.len(),
        "types index rebuilt"
    );

    Ok(IndexOutcome::Written(index.len()))
}
