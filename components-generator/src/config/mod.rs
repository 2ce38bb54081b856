//! Configuration management for components-generator
//!
//! Configuration is loaded once at startup and passed by reference into every
//! component. Sources, in order of precedence:
//!
//! 1. Environment variables (highest priority, `COMPONENTS_` prefix)
//! 2. The file given on the command line, or `./components-generator.toml`
//! 3. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! # components-generator.toml
//! build_dir = "./build"
//! bypass_cache = false
//! logging = true
//! cache_ttl_secs = 1800
//! branch_override = "branchless-merge"
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Default local configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "components-generator.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "COMPONENTS_";

/// Generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Directory holding the extracted library, the caches and built themes
    pub build_dir: PathBuf,

    /// Remote archive URL (before the branch override is applied)
    pub repo_url: String,

    /// File name of the downloaded archive (before the branch override)
    pub repo_file_name: String,

    /// Branch substituted for `master` in the URL and names
    pub branch_override: Option<String>,

    /// Treat the cache as stale on every check
    pub bypass_cache: bool,

    /// Install the log subscriber
    pub logging: bool,

    /// Seconds before the fetched library is considered stale
    pub cache_ttl_secs: u64,

    /// Root-level library entries left out of the base copy
    pub exclude_from_build: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            build_dir: PathBuf::from("./build"),
            repo_url: "https://codeload.github.com/Automattic/theme-components/zip/master"
                .to_string(),
            repo_file_name: "theme-components-master.zip".to_string(),
            branch_override: Some("branchless-merge".to_string()),
            bypass_cache: false,
            logging: true,
            cache_ttl_secs: 1800, // 30 minutes
            exclude_from_build: [
                "assets",
                "components",
                "configs",
                "CONTRIBUTING.md",
                "README.md",
                "templates",
                "types",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from `./components-generator.toml` (if present)
    /// and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or a value has the wrong type.
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from a specific file
    ///
    /// A missing file is not an error; defaults and the environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or a value has the wrong type.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let defaults = toml::to_string(&Self::default())
            .map_err(|e| crate::error::GeneratorError::Config(e.to_string()))?;

        let config = Figment::new()
            .merge(Toml::string(&defaults))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).lowercase(true))
            .extract()?;

        Ok(config)
    }

    /// Archive URL with the branch override applied
    #[must_use]
    pub fn effective_url(&self) -> String {
        match (&self.branch_override, self.repo_url.strip_suffix("/master")) {
            (Some(branch), Some(base)) => format!("{base}/{branch}"),
            _ => self.repo_url.clone(),
        }
    }

    /// Archive file name with the branch override applied
    #[must_use]
    pub fn archive_file_name(&self) -> String {
        match (
            &self.branch_override,
            self.repo_file_name.strip_suffix("-master.zip"),
        ) {
            (Some(branch), Some(base)) => format!("{base}-{branch}.zip"),
            _ => self.repo_file_name.clone(),
        }
    }

    /// Name of the directory the archive extracts to
    #[must_use]
    pub fn library_dir_name(&self) -> String {
        let name = self.archive_file_name();
        name.strip_suffix(".zip").map_or(name.clone(), ToString::to_string)
    }

    /// Path of the extracted component library
    #[must_use]
    pub fn library_dir(&self) -> PathBuf {
        self.build_dir.join(self.library_dir_name())
    }

    /// Path of the downloaded archive
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.build_dir.join(self.archive_file_name())
    }

    /// Path of the types index
    #[must_use]
    pub fn types_index_path(&self) -> PathBuf {
        self.build_dir.join("types.json")
    }

    /// Path of the cache metadata file
    #[must_use]
    pub fn cache_metadata_path(&self) -> PathBuf {
        self.build_dir.join("cache.json")
    }

    /// Output directory for a theme type
    #[must_use]
    pub fn target_dir(&self, type_id: &str) -> PathBuf {
        self.build_dir.join(type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.build_dir, PathBuf::from("./build"));
        assert_eq!(config.cache_ttl_secs, 1800);
        assert!(config.logging);
        assert!(!config.bypass_cache);
        assert_eq!(config.exclude_from_build.len(), 7);
        assert!(config.exclude_from_build.contains(&"components".to_string()));
    }

    #[test]
    fn test_branch_override_paths() {
        let config = GeneratorConfig::default();
        assert_eq!(
            config.effective_url(),
            "https://codeload.github.com/Automattic/theme-components/zip/branchless-merge"
        );
        assert_eq!(
            config.archive_file_name(),
            "theme-components-branchless-merge.zip"
        );
        assert_eq!(
            config.library_dir(),
            PathBuf::from("./build/theme-components-branchless-merge")
        );
    }

    #[test]
    fn test_without_branch_override() {
        let config = GeneratorConfig {
            branch_override: None,
            ..GeneratorConfig::default()
        };
        assert!(config.effective_url().ends_with("/zip/master"));
        assert_eq!(config.archive_file_name(), "theme-components-master.zip");
        assert_eq!(config.library_dir_name(), "theme-components-master");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("generator.toml");
        std::fs::write(&path, "build_dir = \"/tmp/themes\"\ncache_ttl_secs = 60\n").unwrap();

        let config = GeneratorConfig::load_from(&path).unwrap();
        assert_eq!(config.build_dir, PathBuf::from("/tmp/themes"));
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.repo_file_name, "theme-components-master.zip");
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let config = GeneratorConfig::load_from("/nonexistent/generator.toml").unwrap();
        assert_eq!(config.cache_ttl_secs, 1800);
    }
}
