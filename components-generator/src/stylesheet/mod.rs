//! SASS `@import` scanning
//!
//! Maps the import list of a stylesheet to the partial files it pulls in:
//! `@import "layout/content";` refers to `layout/_content.scss` and
//! `@import "variables";` to `_variables.scss`.

use std::path::Path;

use crate::error::{GeneratorError, Result};

/// Partial file paths imported by the stylesheet at `path`
///
/// An empty list means the stylesheet had no parseable imports; that case is
/// logged as an error.
///
/// # Errors
///
/// Returns an error if the stylesheet cannot be read.
pub fn import_paths(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path).map_err(|e| GeneratorError::io(path, e))?;
    let imports = parse_imports(&contents);

    if imports.is_empty() {
        tracing::error!(
            path = %path.display(),
            "Error: stylesheet file was unable to be parsed and/or find SASS imports"
        );
    }

    Ok(imports.iter().map(|import| partial_path(import)).collect())
}

/// Targets of every `@import "...";` statement, in order
#[must_use]
pub fn parse_imports(contents: &str) -> Vec<&str> {
    let mut imports = Vec::new();
    let mut rest = contents;

    while let Some(idx) = find_ignore_case(rest, "@import") {
        rest = &rest[idx + "@import".len()..];
        if let Some((target, remaining)) = quoted_target(rest) {
            imports.push(target);
            rest = remaining;
        }
    }

    imports
}

/// `a/b/c` becomes `a/_c.scss`; a bare `c` becomes `_c.scss`
#[must_use]
pub fn partial_path(import: &str) -> String {
    let mut parts = import.split('/');
    let first = parts.next().unwrap_or_default();
    match parts.last() {
        Some(last) => format!("{first}/_{last}.scss"),
        None => format!("_{first}.scss"),
    }
}

/// Parse `\s+"target"\s*;` at the start of `input`
fn quoted_target(input: &str) -> Option<(&str, &str)> {
    let trimmed = input.trim_start();
    if trimmed.len() == input.len() {
        return None;
    }
    let body = trimmed.strip_prefix('"')?;
    let end = body.find('"')?;
    if end == 0 {
        return None;
    }
    let after = body[end + 1..].trim_start().strip_prefix(';')?;
    Some((&body[..end], after))
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}
