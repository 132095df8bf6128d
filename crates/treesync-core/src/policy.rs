//! Attribute policy: defaults plus per-path overrides

use std::collections::BTreeSet;

use serde::Serialize;
use treesync_fs::{Mode, RemotePath};

/// Role of a path, selecting between the file and directory mode defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    File,
    Directory,
}

/// Effective owner, group and mode for one path
///
/// Owner and group are optional because the template variant may leave
/// identity untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attributes {
    pub owner: Option<String>,
    pub group: Option<String>,
    pub mode: Mode,
}

impl Attributes {
    pub fn new(owner: Option<String>, group: Option<String>, mode: Mode) -> Self {
        Self { owner, group, mode }
    }
}

impl std::fmt::Display for Attributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mode={}", self.mode)?;
        if let Some(owner) = &self.owner {
            write!(f, " owner={}", owner)?;
        }
        if let Some(group) = &self.group {
            write!(f, " group={}", group)?;
        }
        Ok(())
    }
}

/// Strip trailing slashes from an override path before comparing it.
pub fn normalize_override_path(path: &str) -> String {
    path.trim_end_matches('/').to_string()
}

/// Ordered mapping from an attribute value to the paths that receive it
///
/// Lookup is first-match in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideTable<V> {
    entries: Vec<(V, BTreeSet<String>)>,
}

impl<V> Default for OverrideTable<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> OverrideTable<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry; paths are normalized on the way in.
    pub fn insert<'a>(&mut self, value: V, paths: impl IntoIterator<Item = &'a str>) {
        let paths = paths.into_iter().map(normalize_override_path).collect();
        self.entries.push((value, paths));
    }

    /// The first value whose path set contains `path`.
    pub fn lookup(&self, path: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(_, paths)| paths.contains(path))
            .map(|(value, _)| value)
    }

    /// Every path named by any entry.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .flat_map(|(_, paths)| paths.iter().map(String::as_str))
    }

    /// Paths listed under more than one value, sorted.
    pub fn conflicts(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        let mut conflicting = BTreeSet::new();
        for path in self.paths() {
            if !seen.insert(path) {
                conflicting.insert(path);
            }
        }
        conflicting.into_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Default attributes plus override tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePolicy {
    pub default_owner: Option<String>,
    pub default_group: Option<String>,
    pub default_file_mode: Mode,
    pub default_dir_mode: Mode,
    pub owner_overrides: OverrideTable<String>,
    pub group_overrides: OverrideTable<String>,
    pub mode_overrides: OverrideTable<Mode>,
}

impl AttributePolicy {
    /// A policy with no overrides.
    pub fn new(
        owner: Option<String>,
        group: Option<String>,
        file_mode: Mode,
        dir_mode: Mode,
    ) -> Self {
        Self {
            default_owner: owner,
            default_group: group,
            default_file_mode: file_mode,
            default_dir_mode: dir_mode,
            owner_overrides: OverrideTable::new(),
            group_overrides: OverrideTable::new(),
            mode_overrides: OverrideTable::new(),
        }
    }

    /// Resolve each attribute independently: override first, then default.
    pub fn resolve(&self, path: &RemotePath, kind: PathKind) -> Attributes {
        let key = path.as_str();
        let owner = self
            .owner_overrides
            .lookup(key)
            .cloned()
            .or_else(|| self.default_owner.clone());
        let group = self
            .group_overrides
            .lookup(key)
            .cloned()
            .or_else(|| self.default_group.clone());
        let mode = self.mode_overrides.lookup(key).copied().unwrap_or(match kind {
            PathKind::File => self.default_file_mode,
            PathKind::Directory => self.default_dir_mode,
        });
        Attributes { owner, group, mode }
    }

    /// Every path named by any override table.
    pub fn override_paths(&self) -> BTreeSet<&str> {
        self.owner_overrides
            .paths()
            .chain(self.group_overrides.paths())
            .chain(self.mode_overrides.paths())
            .collect()
    }
}
