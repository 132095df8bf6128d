//! Source tree traversal
//!
//! Maps every regular file below a source root to the absolute path it
//! occupies on the target: `/` + path relative to the root.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::{Error, RemotePath, Result};

/// Suffix stripped from template file names to obtain the rendered path.
pub const TEMPLATE_SUFFIX: &str = ".j2";

/// A regular file in the source tree and its destination on the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceEntry {
    /// Absolute local path of the file
    pub source: PathBuf,
    /// Absolute path on the target
    pub destination: RemotePath,
}

/// Recursive walker over a source root.
///
/// Directories are never yielded; they are implied by the destination
/// paths of the files beneath them.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root: PathBuf,
    strip_suffix: Option<String>,
}

impl TreeWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            strip_suffix: None,
        }
    }

    /// Strip `suffix` from destination paths that end with it.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.strip_suffix = Some(suffix.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily walk the tree. Order is whatever the platform returns.
    pub fn entries(&self) -> Entries<'_> {
        Entries {
            walker: self,
            inner: WalkDir::new(&self.root).min_depth(1).into_iter(),
        }
    }

    /// Walk the whole tree and sort the entries by destination.
    pub fn collect_sorted(&self) -> Result<Vec<SourceEntry>> {
        let mut entries = self.entries().collect::<Result<Vec<_>>>()?;
        entries.sort_by(|a, b| a.destination.cmp(&b.destination));
        Ok(entries)
    }

    fn entry_for(&self, path: &Path) -> Result<SourceEntry> {
        let relative = path.strip_prefix(&self.root).map_err(|e| Error::Walk {
            root: self.root.clone(),
            message: format!("{} is outside the root: {}", path.display(), e),
        })?;
        let mut destination = RemotePath::from_relative(relative);
        if let Some(suffix) = &self.strip_suffix {
            destination = destination.strip_suffix(suffix);
        }
        Ok(SourceEntry {
            source: path.to_path_buf(),
            destination,
        })
    }
}

/// Iterator returned by [`TreeWalker::entries`].
pub struct Entries<'a> {
    walker: &'a TreeWalker,
    inner: walkdir::IntoIter,
}

impl Iterator for Entries<'_> {
    type Item = Result<SourceEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    return Some(Err(Error::Walk {
                        root: self.walker.root.clone(),
                        message: e.to_string(),
                    }));
                }
            };

            let is_file = if entry.path_is_symlink() {
                // Links to files are copied as files; links to directories are not descended
                match fs::metadata(entry.path()) {
                    Ok(meta) => meta.is_file(),
                    Err(e) => {
                        tracing::warn!(path = %entry.path().display(), error = %e, "Skipping dangling symlink");
                        false
                    }
                }
            } else {
                entry.file_type().is_file()
            };

            if is_file {
                return Some(self.walker.entry_for(entry.path()));
            }
        }
    }
}
