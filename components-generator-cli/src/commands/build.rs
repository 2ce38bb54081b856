//! Theme build command

use anyhow::{Context, Result};
use chrono::Utc;
use components_generator::assembler::BuildReport;
use components_generator::copier::CopyPlan;
use components_generator::error::GeneratorError;
use components_generator::Generator;
use console::style;
use std::path::Path;

use super::{spinner, INFO, SUCCESS, WARN};

/// Build one theme type
pub struct BuildCommand {
    type_id: String,
    dry_run: bool,
    skip_refresh: bool,
}

impl BuildCommand {
    /// Create a new command instance
    ///
    /// # Arguments
    ///
    /// * `type_id` - Theme type to build (see `components-generator types`)
    /// * `dry_run` - Print the base copy plan instead of building
    /// * `skip_refresh` - Use the cached library even if it is stale
    #[must_use]
    pub const fn new(type_id: String, dry_run: bool, skip_refresh: bool) -> Self {
        Self {
            type_id,
            dry_run,
            skip_refresh,
        }
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The library refresh fails
    /// - The type is unknown or its config is malformed
    pub fn execute(&self, generator: &Generator) -> Result<()> {
        if self.dry_run {
            let plan = generator
                .plan_build(&self.type_id)
                .map_err(|e| unknown_type_hint(e, &self.type_id))?;
            let target = generator.config().target_dir(&self.type_id);
            println!("{}", render_plan(&self.type_id, &target, &plan));
            return Ok(());
        }

        if !self.skip_refresh {
            let spinner = spinner("Checking component library...")?;
            let refreshed = generator.ensure_fresh(Utc::now());
            spinner.finish_and_clear();
            if refreshed.context("Failed to refresh component library")?.is_some() {
                println!("{} Component library refreshed", SUCCESS);
            }
        }

        println!(
            "{} {} {}",
            style("Building").green().bold(),
            style("theme type:").bold(),
            style(&self.type_id).cyan().bold()
        );

        let spinner = spinner("Assembling theme...")?;
        let result = generator.build_type(&self.type_id);
        spinner.finish_and_clear();

        let report = result.map_err(|e| unknown_type_hint(e, &self.type_id))?;
        println!("{}", render_build(&report));
        Ok(())
    }
}

fn unknown_type_hint(err: GeneratorError, type_id: &str) -> anyhow::Error {
    match err {
        GeneratorError::UnknownType(_) => anyhow::Error::new(err).context(format!(
            "No config for theme type '{type_id}'. Run `components-generator types` to list them."
        )),
        other => anyhow::Error::new(other).context(format!("Failed to build theme type '{type_id}'")),
    }
}

/// Files and directories a build of `type_id` into `target` would create
#[must_use]
pub fn render_plan(type_id: &str, target: &Path, plan: &CopyPlan) -> String {
    let mut out = format!(
        "{} Dry run for {} into {}\n{}",
        INFO,
        style(type_id).cyan().bold(),
        target.display(),
        "─".repeat(60)
    );
    for dir in plan.dirs() {
        out.push_str(&format!("\n  mkdir {}", dir.display()));
    }
    for op in plan.files() {
        out.push_str(&format!(
            "\n  copy  {} -> {}",
            op.source.display(),
            op.destination.display()
        ));
    }
    out.push_str(&format!(
        "\n{}\n{} directories, {} files",
        "─".repeat(60),
        plan.dirs().len(),
        plan.files().len()
    ));
    out
}

/// Summary printed after a build
#[must_use]
pub fn render_build(report: &BuildReport) -> String {
    let mut out = format!(
        "{} {} {}\n  {} files copied, {} components inserted, {} markers removed",
        SUCCESS,
        style("Theme built:").green().bold(),
        report.target_dir.display(),
        report.copies.copied.len(),
        report.markers_resolved,
        report.markers_stripped
    );
    for (path, reason) in &report.copies.failed {
        out.push_str(&format!(
            "\n{} {} {}: {reason}",
            WARN,
            style("Not copied").yellow(),
            path.display()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use components_generator::config::GeneratorConfig;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_render_build_lists_failures() {
        let mut report = BuildReport {
            target_dir: PathBuf::from("build/blog"),
            markers_resolved: 3,
            markers_stripped: 1,
            ..BuildReport::default()
        };
        report.copies.copied.push(PathBuf::from("build/blog/index.php"));
        report
            .copies
            .failed
            .push((PathBuf::from("lib/templates/page.php"), "not found".to_string()));

        let out = render_build(&report);
        assert!(out.contains("1 files copied, 3 components inserted, 1 markers removed"));
        assert!(out.contains("lib/templates/page.php: not found"));
    }

    #[test]
    fn test_render_plan_lists_copies() {
        let dir = TempDir::new().unwrap();
        let library = dir.path().join("library");
        fs::create_dir_all(library.join("inc")).unwrap();
        fs::write(library.join("inc/extras.php"), "<?php").unwrap();
        fs::write(library.join("index.php"), "<?php").unwrap();
        let target = dir.path().join("blog");

        let plan = components_generator::copier::plan_tree(&library, &target, &[]);
        let out = render_plan("blog", &target, &plan);

        assert!(out.contains(&format!("mkdir {}", target.join("inc").display())));
        assert!(out.contains(&format!("-> {}", target.join("index.php").display())));
        assert!(out.contains("1 directories, 2 files"));
    }

    #[test]
    fn test_dry_run_leaves_build_dir_untouched() {
        let dir = TempDir::new().unwrap();
        let config = GeneratorConfig {
            build_dir: dir.path().to_path_buf(),
            ..GeneratorConfig::default()
        };
        let library = config.library_dir();
        fs::create_dir_all(library.join("configs")).unwrap();
        fs::write(library.join("configs/type-blog.json"), "{}").unwrap();
        fs::write(library.join("index.php"), "<?php").unwrap();

        let generator = Generator::new(config.clone());
        BuildCommand::new("blog".to_string(), true, false)
            .execute(&generator)
            .unwrap();

        assert!(!config.target_dir("blog").exists());
        assert!(!config.cache_metadata_path().exists());
    }

    #[test]
    fn test_unknown_type_has_hint() {
        let dir = TempDir::new().unwrap();
        let generator = Generator::new(GeneratorConfig {
            build_dir: dir.path().to_path_buf(),
            ..GeneratorConfig::default()
        });

        let err = BuildCommand::new("portfolio".to_string(), true, true)
            .execute(&generator)
            .unwrap_err();
        assert!(err.to_string().contains("components-generator types"));
    }
}
