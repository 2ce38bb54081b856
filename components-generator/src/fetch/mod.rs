//! Component library download and extraction
//!
//! The library ships as a zip archive. A fetch downloads it into the build
//! directory, extracts it in place (overwriting an earlier extraction with the
//! same name), deletes the archive and records when this happened.
//!
//! Download and extraction failures are fatal (see
//! [`GeneratorError::is_fatal`]); nothing is retried or cleaned up.

use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::config::GeneratorConfig;
use crate::copier;
use crate::error::{GeneratorError, Result};
use crate::freshness::CacheMetadata;

/// Where archive bytes come from
pub trait ArchiveSource {
    /// Write the archive found at `url` to `destination`, returning its size
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Download`] if the archive cannot be obtained.
    fn download(&self, url: &str, destination: &Path) -> Result<u64>;
}

impl<T: ArchiveSource + ?Sized> ArchiveSource for &T {
    fn download(&self, url: &str, destination: &Path) -> Result<u64> {
        (**self).download(url, destination)
    }
}

/// Downloads over HTTP(S), streaming the body to disk
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpSource;

impl ArchiveSource for HttpSource {
    fn download(&self, url: &str, destination: &Path) -> Result<u64> {
        let download_error = |reason: String| GeneratorError::Download {
            url: url.to_string(),
            reason,
        };

        let response = ureq::get(url)
            .call()
            .map_err(|e| download_error(e.to_string()))?;

        let mut file = File::create(destination).map_err(|e| GeneratorError::io(destination, e))?;
        let mut reader = response.into_body().into_reader();
        io::copy(&mut reader, &mut file).map_err(|e| download_error(e.to_string()))
    }
}

/// Uses an archive already on disk, ignoring the URL
#[derive(Debug, Clone)]
pub struct LocalSource {
    path: PathBuf,
}

impl LocalSource {
    /// Source backed by the zip at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ArchiveSource for LocalSource {
    fn download(&self, _url: &str, destination: &Path) -> Result<u64> {
        fs::copy(&self.path, destination).map_err(|e| GeneratorError::Download {
            url: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Result of a successful fetch
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Extracted library directory
    pub library_dir: PathBuf,
    /// Size of the downloaded archive
    pub bytes: u64,
    /// When the fetch completed
    pub fetched_at: DateTime<Utc>,
}

/// Fetches the component library into the build directory
pub struct ArchiveFetcher<'a, S> {
    config: &'a GeneratorConfig,
    source: S,
}

impl<'a, S: ArchiveSource> ArchiveFetcher<'a, S> {
    /// Create a fetcher reading from `source`
    pub const fn new(config: &'a GeneratorConfig, source: S) -> Self {
        Self { config, source }
    }

    /// Download, extract, delete the archive and record cache metadata
    ///
    /// # Errors
    ///
    /// Returns a fatal error if the download or extraction fails, or an I/O
    /// error if the cache metadata cannot be written.
    pub fn fetch(&self) -> Result<FetchOutcome> {
        let build_dir = &self.config.build_dir;
        copier::ensure_directory(build_dir, false);

        let url = self.config.effective_url();
        let archive = self.config.archive_path();

        tracing::info!(url = %url, archive = %archive.display(), "downloading component library");
        let bytes = self.source.download(&url, &archive)?;

        extract(&archive, build_dir)?;
        copier::delete_file(&archive);

        let fetched_at = Utc::now();
        let library_dir = self.config.library_dir();
        CacheMetadata {
            fetched_at,
            source_url: url,
            library_dir: self.config.library_dir_name(),
        }
        .save(&self.config.cache_metadata_path())?;

        tracing::info!(
            library = %library_dir.display(),
            bytes,
            "component library extracted"
        );

        Ok(FetchOutcome {
            library_dir,
            bytes,
            fetched_at,
        })
    }
}

/// Extract the zip at `archive` into `destination`
///
/// # Errors
///
/// Returns [`GeneratorError::Extract`] if the archive cannot be opened or
/// any entry fails to extract.
pub fn extract(archive: &Path, destination: &Path) -> Result<()> {
    let extract_error = |reason: String| GeneratorError::Extract {
        path: archive.to_path_buf(),
        reason,
    };

    let file = File::open(archive).map_err(|e| extract_error(e.to_string()))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| extract_error(e.to_string()))?;
    zip.extract(destination)
        .map_err(|e| extract_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        for (name, contents) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(contents.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_extract_writes_entries() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("lib.zip");
        write_zip(&archive, &[("lib/functions.php", "<?php"), ("lib/style.css", "body{}")]);

        extract(&archive, dir.path()).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("lib/functions.php")).unwrap(),
            "<?php"
        );
    }

    #[test]
    fn test_extract_invalid_archive_is_fatal() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("lib.zip");
        fs::write(&archive, "not a zip").unwrap();

        let err = extract(&archive, dir.path()).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, GeneratorError::Extract { .. }));
    }

    #[test]
    fn test_fetch_from_local_source() {
        let dir = TempDir::new().unwrap();
        let config = GeneratorConfig {
            build_dir: dir.path().join("build"),
            ..GeneratorConfig::default()
        };
        let upstream = dir.path().join("upstream.zip");
        let entry = format!("{}/configs/type-blog.json", config.library_dir_name());
        write_zip(&upstream, &[(entry.as_str(), "{}")]);

        let outcome = ArchiveFetcher::new(&config, LocalSource::new(&upstream))
            .fetch()
            .unwrap();

        assert_eq!(outcome.library_dir, config.library_dir());
        assert!(config.library_dir().join("configs/type-blog.json").is_file());
        assert!(!config.archive_path().exists(), "archive should be deleted");

        let metadata = CacheMetadata::load(&config.cache_metadata_path()).unwrap();
        assert_eq!(metadata.source_url, config.effective_url());
    }

    #[test]
    fn test_fetch_missing_local_source_is_fatal() {
        let dir = TempDir::new().unwrap();
        let config = GeneratorConfig {
            build_dir: dir.path().join("build"),
            ..GeneratorConfig::default()
        };

        let err = ArchiveFetcher::new(&config, LocalSource::new(dir.path().join("none.zip")))
            .fetch()
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(!config.cache_metadata_path().exists());
    }
}
