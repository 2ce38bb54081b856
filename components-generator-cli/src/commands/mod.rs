//! CLI command implementations

pub mod build;
pub mod refresh;
pub mod status;
pub mod types;

pub use build::BuildCommand;
pub use refresh::RefreshCommand;
pub use status::StatusCommand;
pub use types::TypesCommand;

use anyhow::{Context, Result};
use components_generator::fetch::{ArchiveSource, HttpSource, LocalSource};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

pub(crate) static SUCCESS: Emoji = Emoji("✓", "√");
pub(crate) static INFO: Emoji = Emoji("ℹ", "i");
pub(crate) static WARN: Emoji = Emoji("⚠", "!");

/// Archive source for a fetch: a local zip when given, HTTP otherwise
pub(crate) fn archive_source(archive: Option<&Path>) -> Box<dyn ArchiveSource> {
    match archive {
        Some(path) => Box::new(LocalSource::new(path)),
        None => Box::new(HttpSource),
    }
}

pub(crate) fn spinner(message: &'static str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("Failed to set progress style")?,
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner.set_message(message);
    Ok(spinner)
}
