//! Ancestor directory derivation and ordering
//!
//! Applying directory operations in the order returned here never touches a
//! child before its parent: every ancestor is strictly shorter than its
//! descendants, and the list is sorted by length. The root `/` is never
//! returned.

use std::collections::BTreeSet;

use crate::RemotePath;

/// Every strict ancestor directory of every path, deduplicated, shortest first.
///
/// Ties between equal-length paths are broken lexicographically so the
/// result is deterministic.
pub fn parent_directories<'a>(paths: impl IntoIterator<Item = &'a RemotePath>) -> Vec<RemotePath> {
    let mut seen = BTreeSet::new();
    for path in paths {
        for ancestor in path.ancestors() {
            // Everything above an already-seen directory was added with it
            if !seen.insert(ancestor) {
                break;
            }
        }
    }
    sort_shortest_first(seen)
}

/// The immediate parent directory of every path, deduplicated, shortest first.
pub fn immediate_parents<'a>(paths: impl IntoIterator<Item = &'a RemotePath>) -> Vec<RemotePath> {
    let parents: BTreeSet<RemotePath> = paths
        .into_iter()
        .filter_map(RemotePath::parent)
        .filter(|p| !p.is_root())
        .collect();
    sort_shortest_first(parents)
}

fn sort_shortest_first(set: BTreeSet<RemotePath>) -> Vec<RemotePath> {
    let mut dirs: Vec<RemotePath> = set.into_iter().collect();
    // BTreeSet order is lexicographic, and the sort is stable
    dirs.sort_by_key(RemotePath::len);
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paths(raw: &[&str]) -> Vec<RemotePath> {
        raw.iter().map(|p| RemotePath::parse(p).unwrap()).collect()
    }

    fn strings(dirs: &[RemotePath]) -> Vec<&str> {
        dirs.iter().map(RemotePath::as_str).collect()
    }

    #[test]
    fn single_file_yields_its_chain() {
        let files = paths(&["/a/b/file.txt"]);
        assert_eq!(strings(&parent_directories(&files)), vec!["/a", "/a/b"]);
    }

    #[test]
    fn shared_ancestors_appear_once() {
        let files = paths(&["/a/b/one", "/a/b/two", "/a/c/three", "/top"]);
        assert_eq!(
            strings(&parent_directories(&files)),
            vec!["/a", "/a/b", "/a/c"]
        );
    }

    #[test]
    fn root_level_files_have_no_ancestors() {
        let files = paths(&["/file"]);
        assert!(parent_directories(&files).is_empty());
        assert!(immediate_parents(&files).is_empty());
    }

    #[test]
    fn empty_input_is_empty() {
        assert!(parent_directories(&Vec::<RemotePath>::new()).is_empty());
    }

    #[test]
    fn immediate_parents_skip_intermediates() {
        let files = paths(&["/etc/app/conf.d/x.conf", "/etc/app/main.conf"]);
        assert_eq!(
            strings(&immediate_parents(&files)),
            vec!["/etc/app", "/etc/app/conf.d"]
        );
    }
}
