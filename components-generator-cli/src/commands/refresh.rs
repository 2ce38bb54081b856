//! Library refresh command

use anyhow::{Context, Result};
use chrono::Utc;
use components_generator::types::IndexOutcome;
use components_generator::{Generator, RefreshReport};
use console::style;
use std::path::PathBuf;

use super::{archive_source, spinner, INFO, SUCCESS, WARN};

/// Fetch the component library if it is stale
pub struct RefreshCommand {
    force: bool,
    archive: Option<PathBuf>,
}

impl RefreshCommand {
    /// Create a new command instance
    ///
    /// # Arguments
    ///
    /// * `force` - Refresh even when the cached library is fresh
    /// * `archive` - Local zip to use instead of downloading
    #[must_use]
    pub const fn new(force: bool, archive: Option<PathBuf>) -> Self {
        Self { force, archive }
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the library cannot be fetched or extracted, or the
    /// index cannot be written.
    pub fn execute(&self, generator: &Generator) -> Result<()> {
        let source = archive_source(self.archive.as_deref());

        let pending = if self.force {
            None
        } else {
            match generator.gate().check(Utc::now()) {
                Some(pending) => Some(pending),
                None => {
                    println!("{} {}", INFO, style("Component library is up to date").bold());
                    return Ok(());
                }
            }
        };

        let spinner = spinner("Fetching component library...")?;
        let result = match pending {
            Some(pending) => pending.run(generator, &*source),
            None => generator.refresh_with(&*source),
        };
        spinner.finish_and_clear();

        let report = result.context("Failed to refresh component library")?;
        println!("{}", render_report(&report));
        Ok(())
    }
}

/// Summary printed after a refresh
#[must_use]
pub fn render_report(report: &RefreshReport) -> String {
    let mut out = format!(
        "{} {} {} ({} bytes)",
        SUCCESS,
        style("Fetched").green().bold(),
        report.fetch.library_dir.display(),
        report.fetch.bytes
    );
    match report.index {
        IndexOutcome::Written(count) => {
            out.push_str(&format!("\n{SUCCESS} Indexed {count} theme types"));
        }
        IndexOutcome::Skipped => {
            out.push_str(&format!(
                "\n{WARN} {}",
                style("No type configs found; types index left unchanged").yellow()
            ));
        }
    }
    out
}
