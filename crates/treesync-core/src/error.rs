//! Error types for treesync-core

use std::path::PathBuf;

/// Result type for treesync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in treesync-core operations
///
/// None of these cross the engine boundary: engines turn them into a
/// failed [`crate::Reconciliation`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed arguments, detected before any mutation
    #[error("{message}")]
    Configuration { message: String },

    /// The controlling host is not a supported operating system
    #[error("unsupported OS: \"{os}\"")]
    Platform { os: String },

    /// A single target operation failed
    #[error("{message}")]
    Operation { message: String },

    /// Template could not be rendered
    #[error("failed to render {template}: {message}")]
    Render { template: PathBuf, message: String },

    /// Owner or group name unknown on the target
    #[error("unknown {kind} \"{name}\"")]
    UnknownIdentity { kind: &'static str, name: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from treesync-fs
    #[error(transparent)]
    Fs(#[from] treesync_fs::Error),
}

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn operation(message: impl Into<String>) -> Self {
        Self::Operation {
            message: message.into(),
        }
    }
}
