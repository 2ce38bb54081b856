//! Config section handlers
//!
//! Each known section identifier maps to one [`SectionHandler`]. The
//! assembler looks handlers up in a [`SectionRegistry`]; identifiers without
//! a handler are ignored.

use std::path::Path;

use super::components::ComponentsHandler;
use super::config::{JS, REPLACEMENT_FILES, SASS_REPLACE, TEMPLATES};
use super::BuildContext;
use crate::copier;
use crate::error::Result;
use crate::stylesheet;

/// Main stylesheet of the library, relative to its root
const STYLESHEET: &str = "assets/stylesheets/style.scss";

/// Applies one config section to a build
pub trait SectionHandler {
    /// Section identifier handled
    fn name(&self) -> &'static str;

    /// Apply the section's entries to the build in `ctx`
    ///
    /// # Errors
    ///
    /// Returns an error only when the build cannot continue; per-file problems
    /// are logged and recorded in the build report.
    fn apply(&self, ctx: &mut BuildContext<'_>, entries: &[String]) -> Result<()>;
}

/// Section identifier → handler
pub struct SectionRegistry {
    handlers: Vec<Box<dyn SectionHandler>>,
}

impl SectionRegistry {
    /// Registry without handlers
    #[must_use]
    pub fn empty() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Add a handler, replacing any handler for the same identifier
    pub fn register(&mut self, handler: Box<dyn SectionHandler>) {
        self.handlers.retain(|h| h.name() != handler.name());
        self.handlers.push(handler);
    }

    /// Handler for `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn SectionHandler> {
        self.handlers
            .iter()
            .find(|h| h.name() == name)
            .map(|h| h.as_ref())
    }

    /// Identifiers with a handler
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.iter().map(|h| h.name())
    }
}

impl Default for SectionRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(ReplacementFilesHandler));
        registry.register(Box::new(SassReplaceHandler));
        registry.register(Box::new(ComponentsHandler));
        registry.register(Box::new(TemplatesHandler));
        registry.register(Box::new(JavascriptHandler));
        registry
    }
}

/// Copies the type's own files over the base files
pub struct ReplacementFilesHandler;

impl SectionHandler for ReplacementFilesHandler {
    fn name(&self) -> &'static str {
        REPLACEMENT_FILES
    }

    fn apply(&self, ctx: &mut BuildContext<'_>, entries: &[String]) -> Result<()> {
        let source = ctx.library_dir.join("types").join(ctx.type_id);
        let report = copier::copy_files(&source, entries, ctx.target_dir);
        ctx.report.copies.merge(report);
        Ok(())
    }
}

/// Accepts stylesheet include names without changing the build
///
/// The library stylesheet's imports are resolved and logged so the requested
/// names can be checked against them.
pub struct SassReplaceHandler;

impl SectionHandler for SassReplaceHandler {
    fn name(&self) -> &'static str {
        SASS_REPLACE
    }

    fn apply(&self, ctx: &mut BuildContext<'_>, entries: &[String]) -> Result<()> {
        let stylesheet = ctx.library_dir.join(STYLESHEET);
        if !stylesheet.is_file() {
            tracing::debug!(path = %stylesheet.display(), "no library stylesheet to inspect");
            return Ok(());
        }

        match stylesheet::import_paths(&stylesheet) {
            Ok(imports) => {
                for entry in entries {
                    let known = imports.iter().any(|import| import == entry);
                    tracing::debug!(include = %entry, known, "sass include requested");
                }
            }
            Err(e) => tracing::error!(error = %e, "Error: stylesheet file was unable to be read"),
        }

        Ok(())
    }
}

/// Copies page templates into `templates/`
pub struct TemplatesHandler;

impl SectionHandler for TemplatesHandler {
    fn name(&self) -> &'static str {
        TEMPLATES
    }

    fn apply(&self, ctx: &mut BuildContext<'_>, entries: &[String]) -> Result<()> {
        copy_subdir(ctx, entries, "templates", "templates");
        Ok(())
    }
}

/// Copies scripts into `assets/js/`
pub struct JavascriptHandler;

impl SectionHandler for JavascriptHandler {
    fn name(&self) -> &'static str {
        JS
    }

    fn apply(&self, ctx: &mut BuildContext<'_>, entries: &[String]) -> Result<()> {
        copy_subdir(ctx, entries, "assets/js", "assets/js");
        Ok(())
    }
}

fn copy_subdir(ctx: &mut BuildContext<'_>, entries: &[String], from: &str, to: &str) {
    let source = ctx.library_dir.join(Path::new(from));
    let target = ctx.target_dir.join(Path::new(to));
    let report = copier::copy_files(&source, entries, &target);
    ctx.report.copies.merge(report);
}
