//! Error types for treesync-fs

use std::path::PathBuf;

/// Result type for treesync-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in treesync-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk {root}: {message}")]
    Walk { root: PathBuf, message: String },

    #[error("mode \"{value}\" does not match regex: \"{pattern}\"")]
    InvalidMode { value: String, pattern: &'static str },

    #[error("Path must be absolute: \"{path}\"")]
    RelativePath { path: String },

    #[error("Failed to parse {format} arguments at {path}: {message}")]
    ArgsParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported arguments format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
