//! Theme type listing command

use components_generator::types::TypesIndex;
use components_generator::Generator;
use console::style;

use super::INFO;

/// List the theme types of the indexed library
pub struct TypesCommand;

impl TypesCommand {
    /// Execute the command
    ///
    /// A missing index is not an error; a hint to refresh is printed instead.
    pub fn execute(generator: &Generator) {
        match generator.types() {
            Ok(index) => println!("{}", render_types(&index)),
            Err(e) => {
                tracing::debug!(error = %e, "types index unavailable");
                println!("{}", render_types(&TypesIndex::default()));
            }
        }
    }
}

/// Table of `id  Title` rows, or a hint when the index is empty
#[must_use]
pub fn render_types(index: &TypesIndex) -> String {
    if index.is_empty() {
        return format!(
            "{} No theme types known. Run {} first.",
            INFO,
            style("components-generator refresh").cyan()
        );
    }

    let width = index.iter().map(|(id, _)| id.len()).max().unwrap_or(0);
    let mut out = format!("{}\n{}", style("Theme types").bold(), "─".repeat(40));
    for (id, title) in index.iter() {
        out.push_str(&format!("\n  {id:<width$}  {title}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use components_generator::types::TypeDescriptor;
    use std::path::PathBuf;

    fn descriptor(id: &str, title: &str) -> TypeDescriptor {
        TypeDescriptor {
            id: id.to_string(),
            title: title.to_string(),
            config_path: PathBuf::from(format!("configs/type-{id}.json")),
        }
    }

    #[test]
    fn test_render_aligned_rows() {
        let index = TypesIndex::from_descriptors(&[
            descriptor("business-plus", "Business Plus"),
            descriptor("blog", "Blog"),
        ]);
        let out = render_types(&index);
        assert!(out.contains("  blog           Blog"));
        assert!(out.contains("  business-plus  Business Plus"));
        assert!(out.find("blog ").unwrap() < out.find("business-plus").unwrap());
    }

    #[test]
    fn test_render_empty_index_hints_refresh() {
        let out = render_types(&TypesIndex::default());
        assert!(out.contains("No theme types known"));
        assert!(out.contains("refresh"));
    }
}
