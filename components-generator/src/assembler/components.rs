//! Component resolution and marker rewriting
//!
//! A component identifier names either one file (`header`, `header.php`) or a
//! directory whose files are all made available (`nav`). Once the requested
//! components are copied, every PHP source in the build is rewritten: markers
//! for available components become `get_template_part()` calls, the rest are
//! stripped. Files the type replaces keep all their markers, and the
//! referenced components are copied in as well.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::config::COMPONENTS;
use super::sections::SectionHandler;
use super::BuildContext;
use crate::copier::{self, CopyReport};
use crate::error::Result;
use crate::marker::{self, normalize_path};

const COMPONENT_EXT: &str = ".php";

/// What a component identifier refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedComponent {
    /// A single file, relative to `components/`
    File(String),
    /// A directory and the files directly inside it, sorted
    Directory {
        /// Directory relative to `components/`
        dir: String,
        /// File names inside the directory
        files: Vec<String>,
    },
    /// Nothing by that name exists
    Missing,
}

impl ResolvedComponent {
    /// Paths, relative to `components/`, that become available
    #[must_use]
    pub fn available_paths(&self) -> Vec<String> {
        match self {
            Self::File(path) => vec![path.clone()],
            Self::Directory { dir, files } => files
                .iter()
                .map(|file| normalize_path(&format!("{dir}/{file}")))
                .collect(),
            Self::Missing => Vec::new(),
        }
    }
}

/// Resolve `component` against the library's `components/` directory
#[must_use]
pub fn resolve_component(components_dir: &Path, component: &str) -> ResolvedComponent {
    let component = normalize_path(component.trim_matches('/'));
    let path = components_dir.join(&component);

    if component.ends_with(COMPONENT_EXT) {
        if path.is_file() {
            return ResolvedComponent::File(component);
        }
    } else if components_dir
        .join(format!("{component}{COMPONENT_EXT}"))
        .is_file()
    {
        return ResolvedComponent::File(format!("{component}{COMPONENT_EXT}"));
    }

    if path.is_dir() {
        return ResolvedComponent::Directory {
            files: list_files(&path),
            dir: component,
        };
    }

    ResolvedComponent::Missing
}

fn list_files(dir: &Path) -> Vec<String> {
    let mut files = Vec::new();
    let Ok(entries) = fs::read_dir(dir) else {
        return files;
    };

    for entry in entries.filter_map(std::result::Result::ok) {
        let path = entry.path();
        if path.is_file() {
            files.push(entry.file_name().to_string_lossy().into_owned());
        } else {
            tracing::warn!(path = %path.display(), "skipping nested directory in component");
        }
    }

    files.sort();
    files
}

/// PHP files below `root`, sorted, with their `/`-separated relative paths
fn php_sources(root: &Path) -> Vec<(PathBuf, String)> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "php"))
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(root).ok()?;
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            Some((entry.path().to_path_buf(), relative))
        })
        .collect()
}

/// Handles the `components` section
pub struct ComponentsHandler;

impl SectionHandler for ComponentsHandler {
    fn name(&self) -> &'static str {
        COMPONENTS
    }

    fn apply(&self, ctx: &mut BuildContext<'_>, entries: &[String]) -> Result<()> {
        let components_src = ctx.library_dir.join("components");
        let components_dst = ctx.target_dir.join("components");
        copier::ensure_directory(&components_dst, false);

        let mut available = HashSet::new();
        for component in entries {
            let resolved = resolve_component(&components_src, component);
            match &resolved {
                ResolvedComponent::File(file) => {
                    let report = copier::copy_files(&components_src, &[file], &components_dst);
                    ctx.report.copies.merge(report);
                }
                ResolvedComponent::Directory { dir, files } => {
                    let report = copier::copy_files(
                        &components_src.join(dir),
                        files,
                        &components_dst.join(dir),
                    );
                    ctx.report.copies.merge(report);
                }
                ResolvedComponent::Missing => {
                    tracing::warn!(component = %component, "component not found in library");
                }
            }
            available.extend(resolved.available_paths());
        }

        let replacements: HashSet<String> = ctx
            .type_config
            .replacement_files()
            .iter()
            .map(|file| normalize_path(file.trim_start_matches('/')))
            .collect();

        for (path, relative) in php_sources(ctx.target_dir) {
            let copy_over = replacements.contains(&relative);
            insert_components(ctx, &path, copy_over, &available, &components_src, &components_dst);
        }

        Ok(())
    }
}

/// Rewrite the markers of one source file
fn insert_components(
    ctx: &mut BuildContext<'_>,
    path: &Path,
    copy_over: bool,
    available: &HashSet<String>,
    components_src: &Path,
    components_dst: &Path,
) {
    let source = match fs::read(path) {
        Ok(source) => source,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable source");
            return;
        }
    };

    let mut forced = Vec::new();
    let rewritten = marker::rewrite_bytes(&source, |found| {
        let component = found.normalized_path();
        if !copy_over && !available.contains(&component) {
            tracing::trace!(path = %path.display(), component = %component, "stripping marker");
            return None;
        }
        if copy_over {
            forced.push(component);
        }
        Some(found.directive().to_string())
    });

    let mut report = CopyReport::default();
    for component in forced {
        report.merge(force_copy(components_src, components_dst, &component));
    }
    ctx.report.copies.merge(report);

    ctx.report.markers_resolved += rewritten.resolved;
    ctx.report.markers_stripped += rewritten.stripped;

    if rewritten.text == source {
        return;
    }
    match fs::write(path, &rewritten.text) {
        Ok(()) => ctx.report.files_rewritten += 1,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Error: source was not able to be written");
        }
    }
}

fn force_copy(components_src: &Path, components_dst: &Path, component: &str) -> CopyReport {
    copier::copy_files(components_src, &[component], components_dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn library() -> TempDir {
        let dir = TempDir::new().unwrap();
        let components = dir.path().join("components");
        fs::create_dir_all(components.join("nav/extra")).unwrap();
        fs::write(components.join("header.php"), "header").unwrap();
        fs::write(components.join("nav/nav-main.php"), "nav").unwrap();
        fs::write(components.join("nav/nav-social.php"), "social").unwrap();
        dir
    }

    #[test]
    fn test_resolve_implicit_file() {
        let lib = library();
        let components = lib.path().join("components");
        assert_eq!(
            resolve_component(&components, "header"),
            ResolvedComponent::File("header.php".to_string())
        );
        assert_eq!(
            resolve_component(&components, "header.php"),
            ResolvedComponent::File("header.php".to_string())
        );
    }

    #[test]
    fn test_resolve_directory_lists_files_only() {
        let lib = library();
        let resolved = resolve_component(&lib.path().join("components"), "nav");
        assert_eq!(
            resolved,
            ResolvedComponent::Directory {
                dir: "nav".to_string(),
                files: vec!["nav-main.php".to_string(), "nav-social.php".to_string()],
            }
        );
        assert_eq!(
            resolved.available_paths(),
            vec!["nav/nav-main.php", "nav/nav-social.php"]
        );
    }

    #[test]
    fn test_resolve_missing() {
        let lib = library();
        let components = lib.path().join("components");
        assert_eq!(resolve_component(&components, "footer"), ResolvedComponent::Missing);
        assert_eq!(resolve_component(&components, "footer.php"), ResolvedComponent::Missing);
    }

    #[test]
    fn test_php_sources_relative_paths() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("inc")).unwrap();
        fs::write(dir.path().join("index.php"), "").unwrap();
        fs::write(dir.path().join("inc/extras.php"), "").unwrap();
        fs::write(dir.path().join("style.css"), "").unwrap();

        let relative: Vec<_> = php_sources(dir.path()).into_iter().map(|(_, r)| r).collect();
        assert_eq!(relative, vec!["inc/extras.php", "index.php"]);
    }
}
