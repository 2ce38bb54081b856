//! Pipeline entry point tying fetch, index, freshness and assembly together

use chrono::{DateTime, Utc};

use crate::assembler::{Assembler, BuildReport};
use crate::config::GeneratorConfig;
use crate::copier::CopyPlan;
use crate::error::Result;
use crate::fetch::{ArchiveFetcher, ArchiveSource, FetchOutcome, HttpSource};
use crate::freshness::FreshnessGate;
use crate::types::{self, IndexOutcome, TypesIndex};

/// Result of fetching the library and rebuilding the index
#[derive(Debug, Clone)]
pub struct RefreshReport {
    /// What the fetch produced
    pub fetch: FetchOutcome,
    /// What happened to `types.json`
    pub index: IndexOutcome,
}

/// The theme generator
///
/// # Example
///
/// ```rust,no_run
/// use components_generator::{config::GeneratorConfig, Generator};
///
/// # fn main() -> anyhow::Result<()> {
/// let generator = Generator::new(GeneratorConfig::load()?);
/// generator.ensure_fresh(chrono::Utc::now())?;
/// let report = generator.build_type("blog")?;
/// println!("built {}", report.target_dir.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    /// Generator using `config`
    #[must_use]
    pub const fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Freshness gate for the configured cache
    #[must_use]
    pub fn gate(&self) -> FreshnessGate {
        FreshnessGate::new(&self.config)
    }

    /// Download the library over HTTP and rebuild the types index
    ///
    /// # Errors
    ///
    /// See [`Generator::refresh_with`].
    pub fn refresh(&self) -> Result<RefreshReport> {
        self.refresh_with(&HttpSource)
    }

    /// Fetch the library from `source` and rebuild the types index
    ///
    /// # Errors
    ///
    /// Returns a fatal error if the download or extraction fails, or an I/O
    /// error if the cache metadata or index cannot be written.
    pub fn refresh_with<S: ArchiveSource + ?Sized>(&self, source: &S) -> Result<RefreshReport> {
        let fetch = ArchiveFetcher::new(&self.config, source).fetch()?;
        let index = types::rebuild_index(&fetch.library_dir, &self.config.types_index_path())?;
        Ok(RefreshReport { fetch, index })
    }

    /// Refresh over HTTP if the cache is stale at `now`
    ///
    /// # Errors
    ///
    /// See [`Generator::refresh_with`].
    pub fn ensure_fresh(&self, now: DateTime<Utc>) -> Result<Option<RefreshReport>> {
        self.ensure_fresh_with(&HttpSource, now)
    }

    /// Refresh from `source` if the cache is stale at `now`
    ///
    /// Returns `None` when the cached library was still fresh.
    ///
    /// # Errors
    ///
    /// See [`Generator::refresh_with`].
    pub fn ensure_fresh_with<S: ArchiveSource + ?Sized>(
        &self,
        source: &S,
        now: DateTime<Utc>,
    ) -> Result<Option<RefreshReport>> {
        match self.gate().check(now) {
            Some(pending) => pending.run(self, source).map(Some),
            None => {
                tracing::debug!("component library is fresh");
                Ok(None)
            }
        }
    }

    /// Read the types index
    ///
    /// # Errors
    ///
    /// Returns an error if `types.json` is missing or malformed.
    pub fn types(&self) -> Result<TypesIndex> {
        TypesIndex::load(&self.config.types_index_path())
    }

    /// Build one theme type
    ///
    /// # Errors
    ///
    /// See [`Assembler::build`].
    pub fn build_type(&self, type_id: &str) -> Result<BuildReport> {
        Assembler::new(&self.config).build(type_id)
    }

    /// Base copy plan of one theme type, without writing anything
    ///
    /// # Errors
    ///
    /// See [`Assembler::plan`].
    pub fn plan_build(&self, type_id: &str) -> Result<CopyPlan> {
        Assembler::new(&self.config).plan(type_id)
    }
}
