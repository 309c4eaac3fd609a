use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for consolidation operations
pub type Result<T> = std::result::Result<T, MergeError>;

/// Errors that can occur while consolidating lists
#[derive(Error, Debug)]
pub enum MergeError {
    /// Reading or writing a list file failed
    #[error("io error on {path}: {source}")]
    Io {
        /// File the operation was acting on
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A required output directory could not be created
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Configuration is invalid or unreadable
    #[error("configuration error: {0}")]
    Config(String),

    /// Checksum algorithm is not supported
    #[error("unsupported checksum algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A consolidation worker panicked or was cancelled
    #[error("worker task failed: {0}")]
    Task(String),
}

impl MergeError {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Returns true if the run cannot continue after this error
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::OutputDir { .. } | Self::Config(_) | Self::UnsupportedAlgorithm(_) | Self::Task(_)
        )
    }

    /// Returns the path involved, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io { path, .. } | Self::OutputDir { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_keeps_path() {
        let err = MergeError::io(
            "/tmp/missing.txt",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert_eq!(err.path(), Some(Path::new("/tmp/missing.txt")));
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("/tmp/missing.txt"));
    }

    #[test]
    fn output_dir_is_fatal() {
        let err = MergeError::OutputDir {
            path: PathBuf::from("/root/out"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.is_fatal());
    }
}
