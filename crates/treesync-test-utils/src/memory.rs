//! [`MemoryAdapter`]: an in-memory target.
//!
//! Keeps a map from destination path to node and converges it the same way
//! the local adapter converges a directory, without touching disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use treesync_core::{
    Attributes, DiffRecord, OpOutcome, RemoteAdapter, RemoteStat, TemplateContext,
    TemplateRenderer, VarsRenderer,
};
use treesync_fs::RemotePath;

/// A path on the in-memory target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Directory(Attributes),
    File { content: Vec<u8>, attributes: Attributes },
}

/// An operation issued to the adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    EnsureDirectory(String),
    WriteFile(String),
    RenderTemplate(String),
    Stat(String),
}

/// In-memory [`RemoteAdapter`] recording every call.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    pub nodes: BTreeMap<RemotePath, Node>,
    pub ops: Vec<Op>,
    /// Mutating operations on this destination fail
    pub fail_on: Option<String>,
    pub check_mode: bool,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every mutating operation on `path`.
    pub fn failing_on(mut self, path: &str) -> Self {
        self.fail_on = Some(path.to_string());
        self
    }

    pub fn in_check_mode(mut self) -> Self {
        self.check_mode = true;
        self
    }

    /// Seed the target with a node.
    pub fn insert(&mut self, path: &str, node: Node) {
        self.nodes.insert(parse(path), node);
    }

    pub fn node(&self, path: &str) -> Option<&Node> {
        self.nodes.get(&parse(path))
    }

    /// Mutating operations only, in issue order.
    pub fn mutations(&self) -> Vec<&Op> {
        self.ops
            .iter()
            .filter(|op| !matches!(op, Op::Stat(_)))
            .collect()
    }

    fn injected(&self, path: &RemotePath) -> Option<OpOutcome> {
        (self.fail_on.as_deref() == Some(path.as_str()))
            .then(|| OpOutcome::failure(format!("{}: injected failure", path)))
    }

    fn parent_missing(&self, dest: &RemotePath) -> bool {
        dest.parent().is_some_and(|p| {
            !p.is_root() && !matches!(self.nodes.get(&p), Some(Node::Directory(_)))
        })
    }

    fn converge_file(
        &mut self,
        dest: &RemotePath,
        content: Vec<u8>,
        origin: &str,
        attrs: &Attributes,
    ) -> OpOutcome {
        if let Some(failure) = self.injected(dest) {
            return failure;
        }
        // In check mode earlier directory operations were not applied
        if !self.check_mode && self.parent_missing(dest) {
            return OpOutcome::failure(format!("{}: parent directory missing", dest));
        }

        let before = match self.nodes.get(dest) {
            Some(Node::Directory(_)) => {
                return OpOutcome::failure(format!("{} is a directory", dest));
            }
            Some(Node::File {
                content: old,
                attributes,
            }) if *old == content && attributes == attrs => {
                return OpOutcome::unchanged();
            }
            Some(Node::File { content: old, .. }) => String::from_utf8_lossy(old).into_owned(),
            None => String::new(),
        };
        let after = String::from_utf8_lossy(&content).into_owned();
        if !self.check_mode {
            self.nodes.insert(
                dest.clone(),
                Node::File {
                    content,
                    attributes: attrs.clone(),
                },
            );
        }
        OpOutcome::changed()
            .with_msg(format!("wrote {}", dest))
            .with_diff(DiffRecord::new(dest.as_str(), origin, before, after))
    }
}

impl RemoteAdapter for MemoryAdapter {
    fn ensure_directory(&mut self, path: &RemotePath, attrs: &Attributes) -> OpOutcome {
        self.ops.push(Op::EnsureDirectory(path.to_string()));
        if let Some(failure) = self.injected(path) {
            return failure;
        }

        match self.nodes.get(path) {
            Some(Node::Directory(current)) if current == attrs => OpOutcome::unchanged(),
            Some(Node::File { .. }) => {
                OpOutcome::failure(format!("{} exists but is not a directory", path))
            }
            existing => {
                let msg = match existing {
                    Some(Node::Directory(current)) => format!("{}: {} -> {}", path, current, attrs),
                    _ => format!("created directory {}", path),
                };
                if !self.check_mode {
                    for ancestor in path.ancestors() {
                        self.nodes
                            .entry(ancestor)
                            .or_insert_with(|| Node::Directory(attrs.clone()));
                    }
                    self.nodes.insert(path.clone(), Node::Directory(attrs.clone()));
                }
                OpOutcome::changed().with_msg(msg)
            }
        }
    }

    fn write_file(&mut self, source: &Path, dest: &RemotePath, attrs: &Attributes) -> OpOutcome {
        self.ops.push(Op::WriteFile(dest.to_string()));
        match fs::read(source) {
            Ok(content) => self.converge_file(dest, content, &source.display().to_string(), attrs),
            Err(e) => OpOutcome::failure(format!("{}: {}", dest, e)),
        }
    }

    fn render_template(
        &mut self,
        template: &Path,
        dest: &RemotePath,
        context: &TemplateContext,
        attrs: &Attributes,
    ) -> OpOutcome {
        self.ops.push(Op::RenderTemplate(dest.to_string()));
        match VarsRenderer.render(template, context) {
            Ok(content) => {
                self.converge_file(dest, content, &template.display().to_string(), attrs)
            }
            Err(e) => OpOutcome::failure(format!("{}: {}", dest, e)),
        }
    }

    fn stat_remote_path(
        &mut self,
        path: &RemotePath,
        _follow_symlinks: bool,
    ) -> treesync_core::Result<RemoteStat> {
        self.ops.push(Op::Stat(path.to_string()));
        Ok(match self.nodes.get(path) {
            Some(Node::Directory(_)) => RemoteStat::directory(),
            Some(Node::File { .. }) => RemoteStat::file(),
            None => RemoteStat::missing(),
        })
    }
}

fn parse(path: &str) -> RemotePath {
    RemotePath::parse(path).unwrap()
}
