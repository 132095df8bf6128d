//! [`TestTree`] builder for reconciliation scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;
use treesync_fs::Args;

/// A temporary workspace holding a source tree under `src/` and an empty
/// target root under `target/`.
///
/// # Example
///
/// ```rust,no_run
/// use treesync_test_utils::TestTree;
///
/// let tree = TestTree::new().with_file("a/b/file.txt", "payload");
/// let args = tree.copy_args("root", "root", "0644", "0755");
/// tree.assert_target_missing("a");
/// ```
pub struct TestTree {
    temp_dir: TempDir,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// Create empty `src/` and `target/` directories.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("src")).unwrap();
        fs::create_dir(temp_dir.path().join("target")).unwrap();
        Self { temp_dir }
    }

    /// Add a file to the source tree, creating parents.
    pub fn with_file(self, relative: &str, content: &str) -> Self {
        self.write_source(relative, content);
        self
    }

    pub fn write_source(&self, relative: &str, content: &str) {
        let path = self.src_root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Place a file directly on the target.
    pub fn write_target(&self, relative: &str, content: &str) {
        let path = self.target_root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn src_root(&self) -> PathBuf {
        self.root().join("src")
    }

    pub fn target_root(&self) -> PathBuf {
        self.root().join("target")
    }

    /// Arguments of the copy variant over `src/`.
    pub fn copy_args(&self, owner: &str, group: &str, mode: &str, dirs_mode: &str) -> Args {
        to_args(json!({
            "owner": owner,
            "group": group,
            "mode": mode,
            "parent_dirs_mode": dirs_mode,
            "src_root": self.src_root(),
        }))
    }

    /// Arguments of the template variant over `src/` with the given vars.
    pub fn template_args(&self, vars: Value) -> Args {
        to_args(json!({
            "templates_root": self.src_root(),
            "vars": vars,
        }))
    }

    /// Write `args` as JSON next to the trees and return the file path.
    pub fn write_args(&self, name: &str, args: &Args) -> PathBuf {
        let path = self.root().join(name);
        fs::write(&path, serde_json::to_string_pretty(args).unwrap()).unwrap();
        path
    }

    /// Content of a target file.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read_target(&self, relative: &str) -> String {
        let path = self.target_root().join(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Assert that `relative` does not exist on the target.
    pub fn assert_target_missing(&self, relative: &str) {
        let path = self.target_root().join(relative);
        assert!(
            !path.exists(),
            "Expected path NOT to exist: {}",
            path.display()
        );
    }

    /// Assert that `relative` is a directory on the target.
    pub fn assert_target_dir(&self, relative: &str) {
        let path = self.target_root().join(relative);
        assert!(path.is_dir(), "Expected directory: {}", path.display());
    }
}

fn to_args(value: Value) -> Args {
    serde_json::from_value(value).unwrap()
}
