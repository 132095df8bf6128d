//! Tree walker behaviour against real directory trees

use assert_fs::prelude::*;
use pretty_assertions::assert_eq;
use treesync_fs::{TEMPLATE_SUFFIX, TreeWalker};

fn destinations(walker: &TreeWalker) -> Vec<String> {
    walker
        .collect_sorted()
        .unwrap()
        .into_iter()
        .map(|e| e.destination.to_string())
        .collect()
}

#[test]
fn nested_tree_maps_to_absolute_destinations() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("etc/nginx/nginx.conf").write_str("worker_processes 1;").unwrap();
    temp.child("etc/nginx/sites/default").write_str("server {}").unwrap();
    temp.child("usr/local/bin/tool").write_str("#!/bin/sh").unwrap();

    let walker = TreeWalker::new(temp.path());
    assert_eq!(
        destinations(&walker),
        vec![
            "/etc/nginx/nginx.conf",
            "/etc/nginx/sites/default",
            "/usr/local/bin/tool",
        ]
    );
}

#[test]
fn empty_directories_are_not_entries() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("var/empty").create_dir_all().unwrap();

    assert!(destinations(&TreeWalker::new(temp.path())).is_empty());
}

#[test]
fn lazy_entries_cover_every_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    for i in 0..20 {
        temp.child(format!("d{}/f{}", i % 4, i)).write_str("x").unwrap();
    }

    let count = TreeWalker::new(temp.path())
        .entries()
        .filter(|e| e.is_ok())
        .count();
    assert_eq!(count, 20);
}

#[test]
fn template_suffix_only_stripped_at_end() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("app/config.yml.j2").write_str("a: {{ a }}").unwrap();
    temp.child("app/notes.j2.txt").write_str("plain").unwrap();

    let walker = TreeWalker::new(temp.path()).with_suffix(TEMPLATE_SUFFIX);
    assert_eq!(
        destinations(&walker),
        vec!["/app/config.yml", "/app/notes.j2.txt"]
    );
}

#[cfg(unix)]
#[test]
fn symlinked_files_are_entries_but_linked_dirs_are_not_descended() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("real/file").write_str("x").unwrap();
    std::os::unix::fs::symlink(temp.child("real/file").path(), temp.child("link").path()).unwrap();
    std::os::unix::fs::symlink(temp.child("real").path(), temp.child("linkdir").path()).unwrap();

    assert_eq!(
        destinations(&TreeWalker::new(temp.path())),
        vec!["/link", "/real/file"]
    );
}
