#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::Path;

use serde_json::Value;
use treesync_core::{Attributes, OpOutcome, RemoteAdapter, RemoteStat, TemplateContext};
use treesync_fs::{Args, RemotePath};

/// Adapter that records calls and pretends every operation changed something
#[derive(Debug, Default)]
pub struct RecordingAdapter {
    pub calls: Vec<String>,
    /// Paths reported as existing directories by `stat_remote_path`
    pub existing_dirs: BTreeSet<String>,
    /// Destination whose operation fails
    pub fail_on: Option<String>,
}

impl RecordingAdapter {
    fn record(&mut self, call: String, path: &RemotePath) -> OpOutcome {
        self.calls.push(call);
        if self.fail_on.as_deref() == Some(path.as_str()) {
            OpOutcome::failure(format!("{}: injected failure", path))
        } else {
            OpOutcome::changed().with_msg(format!("touched {}", path))
        }
    }
}

impl RemoteAdapter for RecordingAdapter {
    fn ensure_directory(&mut self, path: &RemotePath, attrs: &Attributes) -> OpOutcome {
        self.record(format!("dir {} {}", path, attrs), path)
    }

    fn write_file(&mut self, _source: &Path, dest: &RemotePath, attrs: &Attributes) -> OpOutcome {
        self.record(format!("file {} {}", dest, attrs), dest)
    }

    fn render_template(
        &mut self,
        _template: &Path,
        dest: &RemotePath,
        _context: &TemplateContext,
        attrs: &Attributes,
    ) -> OpOutcome {
        self.record(format!("template {} {}", dest, attrs), dest)
    }

    fn stat_remote_path(
        &mut self,
        path: &RemotePath,
        _follow_symlinks: bool,
    ) -> treesync_core::Result<RemoteStat> {
        self.calls.push(format!("stat {}", path));
        Ok(if self.existing_dirs.contains(path.as_str()) {
            RemoteStat::directory()
        } else {
            RemoteStat::missing()
        })
    }
}

pub fn args(value: Value) -> Args {
    serde_json::from_value(value).unwrap()
}

pub fn copy_args(src_root: &Path) -> Args {
    args(serde_json::json!({
        "owner": "root",
        "group": "root",
        "mode": "0644",
        "parent_dirs_mode": "0755",
        "src_root": src_root,
    }))
}
