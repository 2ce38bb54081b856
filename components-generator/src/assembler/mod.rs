//! Theme assembly
//!
//! Building a type copies the base library into `<build_dir>/<type>`, then
//! applies each section of `configs/type-<type>.json` in file order:
//!
//! ```text
//! library/ ──plan_tree──▶ build/<type>/ ──sections──▶ finished theme
//!            (minus components, types, ...)   replacement_files, components, ...
//! ```
//!
//! Sections are dispatched through a [`SectionRegistry`]. Identifiers without
//! a handler are logged at debug level and skipped.

pub mod components;
pub mod config;
pub mod sections;

use std::path::{Path, PathBuf};

use crate::config::GeneratorConfig;
use crate::copier::{self, CopyPlan, CopyReport};
use crate::error::{GeneratorError, Result};
use crate::types;

pub use components::{resolve_component, ResolvedComponent};
pub use config::{Section, TypeConfig};
pub use sections::{SectionHandler, SectionRegistry};

/// What a build did
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Finished theme directory
    pub target_dir: PathBuf,
    /// Every copy made, base tree included
    pub copies: CopyReport,
    /// Markers replaced with an include directive
    pub markers_resolved: usize,
    /// Markers removed
    pub markers_stripped: usize,
    /// PHP sources whose content changed
    pub files_rewritten: usize,
}

/// State shared by the section handlers of one build
pub struct BuildContext<'a> {
    /// Type being built
    pub type_id: &'a str,
    /// Extracted component library
    pub library_dir: &'a Path,
    /// Theme output directory
    pub target_dir: &'a Path,
    /// Parsed config of the type
    pub type_config: &'a TypeConfig,
    /// Accumulated results
    pub report: BuildReport,
}

/// Builds theme types from the extracted library
pub struct Assembler<'a> {
    config: &'a GeneratorConfig,
    registry: SectionRegistry,
}

impl<'a> Assembler<'a> {
    /// Assembler with the default section handlers
    #[must_use]
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self::with_registry(config, SectionRegistry::default())
    }

    /// Assembler dispatching through `registry`
    #[must_use]
    pub const fn with_registry(config: &'a GeneratorConfig, registry: SectionRegistry) -> Self {
        Self { config, registry }
    }

    /// Copy plan for the base files of `type_id`, without writing anything
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::UnknownType`] if the type has no config.
    pub fn plan(&self, type_id: &str) -> Result<CopyPlan> {
        self.config_path(type_id)?;
        Ok(copier::plan_tree(
            &self.config.library_dir(),
            &self.config.target_dir(type_id),
            &self.config.exclude_from_build,
        ))
    }

    /// Build `type_id` into `<build_dir>/<type_id>`
    ///
    /// An earlier build of the same type is deleted first.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::UnknownType`] if the type has no config, or
    /// [`GeneratorError::TypeConfig`] if the config cannot be parsed. Copy
    /// failures are recorded in the report instead.
    pub fn build(&self, type_id: &str) -> Result<BuildReport> {
        let config_path = self.config_path(type_id)?;
        let type_config = TypeConfig::load(type_id, &config_path)?;

        let library_dir = self.config.library_dir();
        let target_dir = self.config.target_dir(type_id);
        tracing::info!(type_id = %type_id, target = %target_dir.display(), "building theme");

        let base = copier::plan_tree(&library_dir, &target_dir, &self.config.exclude_from_build)
            .execute(true);

        let mut ctx = BuildContext {
            type_id,
            library_dir: &library_dir,
            target_dir: &target_dir,
            type_config: &type_config,
            report: BuildReport {
                target_dir: target_dir.clone(),
                copies: base,
                ..BuildReport::default()
            },
        };

        for section in type_config.sections() {
            match self.registry.get(&section.name) {
                Some(handler) => {
                    tracing::debug!(
                        type_id = %type_id,
                        section = %section.name,
                        entries = section.entries.len(),
                        "applying section"
                    );
                    handler.apply(&mut ctx, &section.entries)?;
                }
                None => {
                    tracing::debug!(type_id = %type_id, section = %section.name, "ignoring unknown section");
                }
            }
        }

        let report = ctx.report;
        tracing::info!(
            type_id = %type_id,
            copied = report.copies.copied.len(),
            failed = report.copies.failed.len(),
            resolved = report.markers_resolved,
            stripped = report.markers_stripped,
            "theme built"
        );
        Ok(report)
    }

    fn config_path(&self, type_id: &str) -> Result<PathBuf> {
        if type_id.is_empty() || type_id.contains(['/', '\\']) || type_id.contains("..") {
            return Err(GeneratorError::UnknownType(type_id.to_string()));
        }

        let path = types::config_path(&self.config.library_dir(), type_id);
        if path.is_file() {
            Ok(path)
        } else {
            Err(GeneratorError::UnknownType(type_id.to_string()))
        }
    }
}
