//! Error types for scanning, hashing and reporting.
//!
//! Only [`ScanError`] aborts a run. [`HashError`] is carried inside a
//! [`crate::HashResult`] and degrades the result set instead.

use std::io;
use std::path::PathBuf;

/// Fatal errors raised before or while setting up a scan.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The scan root does not exist.
    #[error("Path does not exist: {0}")]
    RootNotFound(PathBuf),

    /// The scan root exists but is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The scan root could not be resolved to an absolute path.
    #[error("Failed to resolve {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The hashing worker pool could not be started.
    #[error("Failed to build hashing worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Per-file failure while computing a content digest.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file disappeared between discovery and hashing.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// The file could not be opened or read due to permissions.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Any other I/O error while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl HashError {
    pub(crate) fn from_io(path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }
}

/// Errors raised while writing a duplicate report.
#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    /// The requested output path is an existing directory.
    #[error("Output path is a directory: {0}")]
    IsADirectory(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::RootNotFound(PathBuf::from("/missing"));
        assert_eq!(err.to_string(), "Path does not exist: /missing");

        let err = ScanError::NotADirectory(PathBuf::from("/file.txt"));
        assert_eq!(err.to_string(), "Not a directory: /file.txt");
    }

    #[test]
    fn test_hash_error_from_io_kind() {
        let path = PathBuf::from("/data/a.bin");

        let err = HashError::from_io(path.clone(), io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, HashError::NotFound(ref p) if p == &path));

        let err = HashError::from_io(
            path.clone(),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert_eq!(err.to_string(), "Permission denied: /data/a.bin");

        let err = HashError::from_io(path, io::Error::new(io::ErrorKind::Other, "bad sector"));
        assert!(err.to_string().contains("bad sector"));
    }

    #[test]
    fn test_hash_error_names_path_once() {
        let path = PathBuf::from("/data/a.bin");
        for kind in [
            io::ErrorKind::NotFound,
            io::ErrorKind::PermissionDenied,
            io::ErrorKind::UnexpectedEof,
        ] {
            let message = HashError::from_io(path.clone(), io::Error::from(kind)).to_string();
            assert_eq!(message.matches("/data/a.bin").count(), 1, "{}", message);
        }
    }
}
