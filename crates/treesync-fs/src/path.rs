//! Absolute destination paths on the target filesystem

use std::path::{Component, Path, PathBuf};

use serde::{Serialize, Serializer};

use crate::{Error, Result};

/// An absolute path on the target, normalized to forward slashes.
///
/// The inner string always starts with `/`, never contains empty
/// components and never ends with a slash, except for the root itself.
/// Converting to a native path happens only at I/O boundaries through
/// [`RemotePath::under`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RemotePath {
    inner: String,
}

impl RemotePath {
    /// The filesystem root `/`.
    pub fn root() -> Self {
        Self {
            inner: "/".to_string(),
        }
    }

    /// Parse an absolute path string.
    ///
    /// Backslashes become forward slashes, repeated slashes collapse and
    /// trailing slashes are dropped.
    pub fn parse(path: &str) -> Result<Self> {
        let unified = path.replace('\\', "/");
        if !unified.starts_with('/') {
            return Err(Error::RelativePath {
                path: path.to_string(),
            });
        }
        Ok(Self::from_segments(unified.split('/')))
    }

    /// Map a path relative to a source root onto the target: `/` + relative.
    pub fn from_relative(relative: &Path) -> Self {
        let segments: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().replace('\\', "/")),
                _ => None,
            })
            .collect();
        Self::from_segments(segments.iter().map(String::as_str))
    }

    fn from_segments<'a>(segments: impl Iterator<Item = &'a str>) -> Self {
        let mut inner = String::new();
        for segment in segments.filter(|s| !s.is_empty()) {
            inner.push('/');
            inner.push_str(segment);
        }
        if inner.is_empty() {
            inner.push('/');
        }
        Self { inner }
    }

    /// Get the internal string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Byte length of the path, used to order parents before children.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.inner == "/"
    }

    /// Get the parent directory. The root has no parent.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.inner.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self {
                inner: self.inner[..idx].to_string(),
            }),
            None => None,
        }
    }

    /// Strict ancestors from the immediate parent upward, excluding the root.
    pub fn ancestors(&self) -> impl Iterator<Item = RemotePath> {
        std::iter::successors(self.parent(), RemotePath::parent).take_while(|p| !p.is_root())
    }

    /// Remove `suffix` from the end of the path.
    ///
    /// The path is returned unchanged when it does not end with the suffix
    /// or when stripping would leave an empty file name.
    pub fn strip_suffix(&self, suffix: &str) -> Self {
        if suffix.is_empty() {
            return self.clone();
        }
        match self.inner.strip_suffix(suffix) {
            Some(stripped) if !stripped.ends_with('/') => Self {
                inner: stripped.to_string(),
            },
            _ => self.clone(),
        }
    }

    /// Map this path onto a local directory standing in for the target root.
    pub fn under(&self, target_root: &Path) -> PathBuf {
        let mut native = target_root.to_path_buf();
        for segment in self.inner.split('/').filter(|s| !s.is_empty()) {
            native.push(segment);
        }
        native
    }
}

impl AsRef<str> for RemotePath {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl std::fmt::Display for RemotePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl Serialize for RemotePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_drops_trailing_and_repeated_slashes() {
        let path = RemotePath::parse("//etc//nginx/").unwrap();
        assert_eq!(path.as_str(), "/etc/nginx");
    }

    #[test]
    fn parse_rejects_relative() {
        assert!(matches!(
            RemotePath::parse("etc/nginx"),
            Err(Error::RelativePath { .. })
        ));
    }

    #[test]
    fn parent_of_top_level_is_root() {
        let path = RemotePath::parse("/etc").unwrap();
        assert_eq!(path.parent(), Some(RemotePath::root()));
        assert_eq!(RemotePath::root().parent(), None);
    }

    #[test]
    fn ancestors_exclude_root() {
        let path = RemotePath::parse("/a/b/c.txt").unwrap();
        let ancestors: Vec<String> = path.ancestors().map(|p| p.to_string()).collect();
        assert_eq!(ancestors, vec!["/a/b", "/a"]);
    }

    #[test]
    fn from_relative_prefixes_root() {
        let path = RemotePath::from_relative(Path::new("a/b/file.txt"));
        assert_eq!(path.as_str(), "/a/b/file.txt");
    }

    #[test]
    fn strip_suffix_keeps_bare_suffix_names() {
        let path = RemotePath::parse("/etc/app.yml.j2").unwrap();
        assert_eq!(path.strip_suffix(".j2").as_str(), "/etc/app.yml");

        let bare = RemotePath::parse("/etc/.j2").unwrap();
        assert_eq!(bare.strip_suffix(".j2").as_str(), "/etc/.j2");
    }

    #[test]
    fn under_maps_onto_local_root() {
        let path = RemotePath::parse("/a/b").unwrap();
        assert_eq!(path.under(Path::new("/tmp/target")), PathBuf::from("/tmp/target/a/b"));
    }
}
