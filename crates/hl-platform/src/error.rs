//! Storage backend errors

use std::path::PathBuf;
use thiserror::Error;

/// Storage backend errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The store file could not be read or written
    #[error("Store file {path}: {source}")]
    File {
        /// Path of the store file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The stored record could not be encoded
    #[error("Invalid store record: {0}")]
    Record(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlatformError {
    /// Attach a path to an I/O error
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}

impl From<PlatformError> for hl_core::Error {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::Io(e) => Self::Io(e),
            PlatformError::Record(e) => Self::Json(e),
            other => Self::Store(other.to_string()),
        }
    }
}

/// Platform result type
pub type Result<T> = std::result::Result<T, PlatformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_error_converts_to_store_error() {
        let err = PlatformError::file(
            "/nope/lists.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let core: hl_core::Error = err.into();
        assert!(matches!(core, hl_core::Error::Store(ref msg) if msg.contains("/nope/lists.json")));
    }
}
