//! Target operation adapters
//!
//! The engines never touch the target directly. Every directory, file and
//! template operation goes through a [`RemoteAdapter`], which reports what it
//! did as an [`OpOutcome`]. Implementations decide how operations reach the
//! target (local filesystem, SSH, agent RPC); the reconciliation logic does not
//! change between them.

mod identity;
mod local;
mod render;

pub use identity::IdentityDb;
pub use local::{LocalAdapter, LocalOptions, OwnershipPolicy};
pub use render::{TemplateRenderer, VarsRenderer};

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use treesync_fs::RemotePath;

use crate::Result;
use crate::policy::Attributes;
use crate::report::OpOutcome;

/// Variables available to templates
pub type TemplateContext = BTreeMap<String, serde_json::Value>;

/// What a stat of a target path found
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemoteStat {
    pub exists: bool,
    pub is_dir: bool,
}

impl RemoteStat {
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn directory() -> Self {
        Self {
            exists: true,
            is_dir: true,
        }
    }

    pub fn file() -> Self {
        Self {
            exists: true,
            is_dir: false,
        }
    }
}

/// Idempotent operations on the target.
///
/// Each mutating operation converges one path and reports whether anything
/// changed. Failures are reported in the outcome, not as errors, so the
/// driver can record them alongside earlier progress.
pub trait RemoteAdapter: Send {
    /// Make `path` a directory with the given attributes.
    ///
    /// Missing intermediate directories are created as needed.
    fn ensure_directory(&mut self, path: &RemotePath, attrs: &Attributes) -> OpOutcome;

    /// Make `dest` a file with the content of the local `source` and the
    /// given attributes. The parent directory is expected to exist.
    fn write_file(&mut self, source: &Path, dest: &RemotePath, attrs: &Attributes) -> OpOutcome;

    /// Render `template` with `context` and converge `dest` onto the result.
    fn render_template(
        &mut self,
        template: &Path,
        dest: &RemotePath,
        context: &TemplateContext,
        attrs: &Attributes,
    ) -> OpOutcome;

    /// Probe a target path.
    fn stat_remote_path(&mut self, path: &RemotePath, follow_symlinks: bool) -> Result<RemoteStat>;
}
