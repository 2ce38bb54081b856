//! components-generator: WordPress starter themes assembled from a component library
//!
//! The generator downloads a component library (a zip of base theme files,
//! reusable components and per-type configs), indexes the theme types it
//! defines, and builds a theme for a chosen type:
//!
//! 1. **Fetch** the library archive and extract it into the build directory
//! 2. **Index** `configs/type-<id>.json` files into `types.json`
//! 3. **Assemble** a type: copy the base files, apply the type's config
//!    sections and rewrite `<!-- components/... -->` markers into
//!    `get_template_part()` calls
//!
//! A freshness gate keeps the downloaded library for a configurable TTL.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use components_generator::prelude::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = GeneratorConfig::load()?;
//! observability::init(&config)?;
//!
//! let generator = Generator::new(config);
//! generator.ensure_fresh(chrono::Utc::now())?;
//!
//! for (id, title) in generator.types()?.iter() {
//!     println!("{id}: {title}");
//! }
//! generator.build_type("blog")?;
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod config;
pub mod copier;
pub mod error;
pub mod fetch;
pub mod freshness;
pub mod generator;
pub mod marker;
pub mod observability;
pub mod stylesheet;
pub mod types;

pub use generator::{Generator, RefreshReport};

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! ```rust
    //! use components_generator::prelude::*;
    //! ```

    pub use crate::assembler::{Assembler, BuildReport, SectionHandler, SectionRegistry, TypeConfig};
    pub use crate::config::GeneratorConfig;
    pub use crate::copier::{CopyPlan, CopyReport};
    pub use crate::error::{GeneratorError, Result};
    pub use crate::fetch::{ArchiveSource, HttpSource, LocalSource};
    pub use crate::freshness::{FreshnessGate, PendingRefresh, StaleReason};
    pub use crate::generator::{Generator, RefreshReport};
    pub use crate::observability;
    pub use crate::types::{IndexOutcome, TypesIndex};
}
