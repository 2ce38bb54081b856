//! Cache expiry gate
//!
//! Freshness is judged from the `fetched_at` timestamp recorded in
//! `cache.json` after every fetch, not from file modification times. The
//! library is stale when:
//!
//! - no metadata exists (or it cannot be read)
//! - `bypass_cache` is set
//! - at least `cache_ttl_secs` have passed since the last fetch
//!
//! A stale check hands back a [`PendingRefresh`]. Running it consumes it, so a
//! scheduled refresh happens at most once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::GeneratorConfig;
use crate::error::{GeneratorError, Result};
use crate::fetch::ArchiveSource;
use crate::generator::{Generator, RefreshReport};

/// Metadata written after each successful fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// When the library was last fetched
    pub fetched_at: DateTime<Utc>,
    /// URL the archive came from
    pub source_url: String,
    /// Name of the extracted library directory
    pub library_dir: String,
}

impl CacheMetadata {
    /// Read metadata from `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| GeneratorError::io(path, e))?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write metadata to `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| GeneratorError::io(path, e))
    }
}

/// Why a refresh is needed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    /// No usable cache metadata
    Missing,
    /// Cache bypass is switched on
    Bypassed,
    /// The last fetch is too old
    Expired {
        /// Seconds since the last fetch
        age_secs: i64,
    },
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "no cached library"),
            Self::Bypassed => write!(f, "cache bypass enabled"),
            Self::Expired { age_secs } => write!(f, "cached library is {age_secs}s old"),
        }
    }
}

/// A refresh decided on by the gate but not yet run
#[derive(Debug)]
#[must_use = "a pending refresh does nothing until it is run"]
pub struct PendingRefresh {
    reason: StaleReason,
}

impl PendingRefresh {
    /// Why the refresh was scheduled
    pub const fn reason(&self) -> &StaleReason {
        &self.reason
    }

    /// Fetch the library and rebuild the types index
    ///
    /// # Errors
    ///
    /// Propagates fetch errors (fatal) and index write errors.
    pub fn run<S: ArchiveSource + ?Sized>(self, generator: &Generator, source: &S) -> Result<RefreshReport> {
        tracing::info!(reason = %self.reason, "refreshing component library");
        generator.refresh_with(source)
    }
}

/// Decides whether the cached library must be fetched again
#[derive(Debug, Clone)]
pub struct FreshnessGate {
    metadata_path: PathBuf,
    ttl_secs: u64,
    bypass: bool,
}

impl FreshnessGate {
    /// Gate configured from `config`
    #[must_use]
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            metadata_path: config.cache_metadata_path(),
            ttl_secs: config.cache_ttl_secs,
            bypass: config.bypass_cache,
        }
    }

    /// Last recorded fetch, if any
    #[must_use]
    pub fn metadata(&self) -> Option<CacheMetadata> {
        CacheMetadata::load(&self.metadata_path).ok()
    }

    /// Check freshness at `now`
    ///
    /// Returns `None` when the cache is fresh.
    pub fn check(&self, now: DateTime<Utc>) -> Option<PendingRefresh> {
        let reason = self.stale_reason(now)?;
        tracing::debug!(reason = %reason, "component library is stale");
        Some(PendingRefresh { reason })
    }

    fn stale_reason(&self, now: DateTime<Utc>) -> Option<StaleReason> {
        let Some(metadata) = self.metadata() else {
            return Some(StaleReason::Missing);
        };
        if self.bypass {
            return Some(StaleReason::Bypassed);
        }

        let age_secs = now.signed_duration_since(metadata.fetched_at).num_seconds();
        let ttl = i64::try_from(self.ttl_secs).unwrap_or(i64::MAX);
        (age_secs >= ttl).then_some(StaleReason::Expired { age_secs })
    }
}
