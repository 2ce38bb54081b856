//! Error types and error handling

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the generator
pub type Result<T, E = GeneratorError> = std::result::Result<T, E>;

/// Generator error type
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Filesystem error tied to a path
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Archive download failed
    #[error("Failed to download {url}: {reason}")]
    Download {
        /// Requested URL
        url: String,
        /// Failure description
        reason: String,
    },

    /// Archive could not be opened or extracted
    #[error("Oh no! I couldn't open the zip: {}. {reason}", path.display())]
    Extract {
        /// Archive path
        path: PathBuf,
        /// Failure description
        reason: String,
    },

    /// Per-type config is missing or malformed
    #[error("Type config error for '{type_id}': {reason}")]
    TypeConfig {
        /// Type being built
        type_id: String,
        /// Failure description
        reason: String,
    },

    /// No config exists for the requested type
    #[error("Unknown theme type: {0}")]
    UnknownType(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GeneratorError {
    /// Wrap an I/O error with the path that produced it
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error must halt the whole process
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Download { .. } | Self::Extract { .. })
    }
}

impl From<figment::Error> for GeneratorError {
    fn from(err: figment::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let extract = GeneratorError::Extract {
            path: PathBuf::from("build/lib.zip"),
            reason: "invalid header".to_string(),
        };
        assert!(extract.is_fatal());

        let download = GeneratorError::Download {
            url: "https://example.test/lib.zip".to_string(),
            reason: "timeout".to_string(),
        };
        assert!(download.is_fatal());

        let unknown = GeneratorError::UnknownType("basic".to_string());
        assert!(!unknown.is_fatal());
    }

    #[test]
    fn test_extract_message_names_archive() {
        let err = GeneratorError::Extract {
            path: PathBuf::from("build/lib.zip"),
            reason: "invalid header".to_string(),
        };
        assert!(err.to_string().contains("build/lib.zip"));
    }
}
