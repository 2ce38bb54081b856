//! Integration tests for theme assembly
//!
//! Each test lays out a small component library inside a temporary build
//! directory and builds a theme type from it.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use components_generator::prelude::*;
use tempfile::TempDir;
use walkdir::WalkDir;

const HEADER: &str = "<?php\n?>\n<header>\n\t<!-- components/header.php -->\n\t<!-- components/nav/nav-main.php -->\n\t<!-- components/footer/footer-widgets.php -->\n</header>\n";

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Library with base files, components, one type and its replacement files
fn fixture(type_config: &str) -> (TempDir, GeneratorConfig) {
    let dir = TempDir::new().unwrap();
    let config = GeneratorConfig {
        build_dir: dir.path().to_path_buf(),
        ..GeneratorConfig::default()
    };
    let lib = config.library_dir();

    write(&lib.join("header.php"), HEADER);
    write(&lib.join("index.php"), "<?php get_header(); ?>\n");
    write(&lib.join("style.css"), "/* Theme Name: Components */\n");
    write(&lib.join("README.md"), "library readme\n");
    write(&lib.join("CONTRIBUTING.md"), "contributing\n");
    write(&lib.join("inc/components/helper.php"), "<?php // nested\n");

    write(&lib.join("components/header.php"), "<h1>site</h1>\n");
    write(&lib.join("components/nav/nav-main.php"), "<nav></nav>\n");
    write(&lib.join("components/footer/footer-widgets.php"), "<aside></aside>\n");

    write(&lib.join("templates/page-full.php"), "<?php /* Template Name: Full */ ?>\n");
    write(&lib.join("assets/js/navigation.js"), "// nav\n");
    write(&lib.join("assets/stylesheets/style.scss"), "@import \"header/site\";\n");

    write(
        &lib.join("types/blog/index.php"),
        "<main>\n\t<!-- components/footer/footer-widgets.php -->\n</main>\n",
    );

    write(&lib.join("configs/type-blog.json"), type_config);
    (dir, config)
}

fn snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let relative = e.path().strip_prefix(root).unwrap().display().to_string();
            (relative, fs::read(e.path()).unwrap())
        })
        .collect()
}

#[test]
fn test_requested_components_are_resolved() {
    let (_dir, config) = fixture(r#"{ "components": ["header", "nav"] }"#);

    let report = Generator::new(config.clone()).build_type("blog").unwrap();
    let target = config.target_dir("blog");

    assert_eq!(report.target_dir, target);
    assert!(target.join("components/header.php").is_file());
    assert!(target.join("components/nav/nav-main.php").is_file());
    assert!(!target.join("components/footer").exists());

    let header = fs::read_to_string(target.join("header.php")).unwrap();
    assert_eq!(
        header,
        "<?php\n?>\n<header>\n\
         \t<?php get_template_part( 'components', 'header' ); ?>\n\
         \t<?php get_template_part( 'components/nav/nav', 'main' ); ?>\n\
         </header>\n"
    );
    assert_eq!(report.markers_resolved, 2);
    assert_eq!(report.markers_stripped, 1);
    assert_eq!(report.files_rewritten, 1);
    assert!(report.copies.is_clean());
}

#[test]
fn test_unrequested_components_are_stripped() {
    let (_dir, config) = fixture(r#"{ "components": [] }"#);

    let report = Generator::new(config.clone()).build_type("blog").unwrap();
    let header = fs::read_to_string(config.target_dir("blog").join("header.php")).unwrap();

    assert_eq!(header, "<?php\n?>\n<header>\n</header>\n");
    assert!(!header.contains("get_template_part"));
    assert_eq!(report.markers_stripped, 3);
    assert!(config.target_dir("blog").join("components").is_dir());
}

#[test]
fn test_replacement_files_keep_their_markers() {
    let (_dir, config) = fixture(r#"{ "replacement_files": ["index.php"], "components": ["header"] }"#);

    Generator::new(config.clone()).build_type("blog").unwrap();
    let target = config.target_dir("blog");

    let index = fs::read_to_string(target.join("index.php")).unwrap();
    assert_eq!(
        index,
        "<main>\n\t<?php get_template_part( 'components/footer/footer', 'widgets' ); ?>\n</main>\n"
    );
    assert!(target.join("components/footer/footer-widgets.php").is_file());

    // header.php is not a replacement file, so its footer marker still goes
    let header = fs::read_to_string(target.join("header.php")).unwrap();
    assert!(!header.contains("footer"));
}

#[test]
fn test_base_copy_excludes_root_entries_only() {
    let (_dir, config) = fixture("{}");

    Generator::new(config.clone()).build_type("blog").unwrap();
    let target = config.target_dir("blog");

    for kept in ["header.php", "index.php", "style.css", "inc/components/helper.php"] {
        assert!(target.join(kept).is_file(), "{kept} should be copied");
    }
    for excluded in [
        "README.md",
        "CONTRIBUTING.md",
        "configs",
        "types",
        "templates",
        "assets",
        "components",
    ] {
        assert!(!target.join(excluded).exists(), "{excluded} should be excluded");
    }
}

#[test]
fn test_templates_and_scripts_are_copied() {
    let (_dir, config) = fixture(
        r#"{ "templates": ["page-full.php"], "js": ["navigation.js"], "sass_replace": ["header/site"] }"#,
    );

    let report = Generator::new(config.clone()).build_type("blog").unwrap();
    let target = config.target_dir("blog");

    assert!(target.join("templates/page-full.php").is_file());
    assert!(target.join("assets/js/navigation.js").is_file());
    assert!(!target.join("assets/stylesheets").exists());
    assert!(report.copies.is_clean());
}

#[test]
fn test_missing_files_are_reported_not_fatal() {
    let (_dir, config) = fixture(r#"{ "templates": ["page-missing.php"], "components": ["sidebar"] }"#);

    let report = Generator::new(config.clone()).build_type("blog").unwrap();

    assert_eq!(report.copies.failed.len(), 1);
    assert!(report.copies.failed[0].0.ends_with("templates/page-missing.php"));
    assert!(config.target_dir("blog").join("header.php").is_file());
}

#[test]
fn test_rebuild_is_byte_identical() {
    let config_json = r#"{ "replacement_files": ["index.php"], "components": ["header", "nav"], "js": ["navigation.js"] }"#;
    let (_dir, config) = fixture(config_json);
    let generator = Generator::new(config.clone());
    let target = config.target_dir("blog");

    generator.build_type("blog").unwrap();
    let first = snapshot(&target);

    // leftovers from an earlier build must not survive
    fs::write(target.join("stale.php"), "old").unwrap();

    generator.build_type("blog").unwrap();
    let second = snapshot(&target);

    assert_eq!(first, second);
}

#[test]
fn test_dry_run_plan() {
    let (_dir, config) = fixture("{}");

    let plan = Generator::new(config.clone()).plan_build("blog").unwrap();

    assert_eq!(plan.root(), Some(&config.target_dir("blog")));
    let destinations: Vec<_> = plan
        .files()
        .iter()
        .map(|op| op.destination.strip_prefix(config.target_dir("blog")).unwrap().to_path_buf())
        .collect();
    assert!(destinations.contains(&Path::new("inc/components/helper.php").to_path_buf()));
    assert!(!destinations.iter().any(|d| d.starts_with("configs")));
    assert!(!config.target_dir("blog").exists());
}

#[test]
fn test_unknown_type() {
    let (_dir, config) = fixture("{}");
    let err = Generator::new(config).build_type("portfolio").unwrap_err();
    assert!(matches!(err, GeneratorError::UnknownType(_)));
    assert!(!err.is_fatal());
}

#[test]
fn test_non_utf8_sources_are_rewritten() {
    let (_dir, config) = fixture(r#"{ "components": ["header"] }"#);
    let source: &[u8] = b"<?php /* caf\xe9 */ ?>\n<header>\n\t<!-- components/header.php -->\n\t<!-- components/missing.php -->\n</header>\n";
    fs::write(config.library_dir().join("header.php"), source).unwrap();

    let report = Generator::new(config.clone()).build_type("blog").unwrap();
    let header = fs::read(config.target_dir("blog").join("header.php")).unwrap();

    assert_eq!(
        header,
        b"<?php /* caf\xe9 */ ?>\n<header>\n\t<?php get_template_part( 'components', 'header' ); ?>\n</header>\n".to_vec()
    );
    assert_eq!(report.markers_resolved, 1);
    assert_eq!(report.markers_stripped, 1);
}

#[test]
fn test_doubled_slash_marker_resolves() {
    let (_dir, config) = fixture(r#"{ "components": ["header"] }"#);
    write(
        &config.library_dir().join("header.php"),
        "<header>\n\t<!-- components//header.php -->\n</header>\n",
    );

    Generator::new(config.clone()).build_type("blog").unwrap();
    let header = fs::read_to_string(config.target_dir("blog").join("header.php")).unwrap();

    assert_eq!(
        header,
        "<header>\n\t<?php get_template_part( 'components', 'header' ); ?>\n</header>\n"
    );
}

#[test]
fn test_doubled_slash_marker_in_replacement_file() {
    let (_dir, config) = fixture(r#"{ "replacement_files": ["index.php"], "components": [] }"#);
    write(
        &config.library_dir().join("types/blog/index.php"),
        "<main>\n\t<!-- components//footer/footer-widgets.php -->\n</main>\n",
    );

    Generator::new(config.clone()).build_type("blog").unwrap();
    let target = config.target_dir("blog");

    let index = fs::read_to_string(target.join("index.php")).unwrap();
    assert!(index.contains("get_template_part( 'components/footer/footer', 'widgets' )"));
    assert!(target.join("components/footer/footer-widgets.php").is_file());
}
