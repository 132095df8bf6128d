//! Error types for treesync-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that stop the CLI before or after a reconciliation
///
/// A failed reconciliation is not one of these; it is reported through the
/// result and the exit code.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from treesync-core
    #[error(transparent)]
    Core(#[from] treesync_core::Error),

    /// Error from treesync-fs
    #[error(transparent)]
    Fs(#[from] treesync_fs::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
