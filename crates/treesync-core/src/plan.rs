//! Ordered operation plans derived from a validated request
//!
//! Planning walks the source tree, derives directories and resolves the
//! attribute policy. It never talks to the target, so a plan can be built,
//! inspected and then applied through any adapter.

use std::path::PathBuf;

use serde::Serialize;
use treesync_fs::{RemotePath, SourceEntry, TEMPLATE_SUFFIX, TreeWalker, immediate_parents, parent_directories};

use crate::Result;
use crate::adapter::TemplateContext;
use crate::gate::{CopyRequest, TemplateRequest, check_override_targets};
use crate::policy::{Attributes, PathKind};

/// A directory to converge, with its resolved attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedDirectory {
    pub path: RemotePath,
    pub attributes: Attributes,
}

/// A file to converge from a local source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedFile {
    pub source: PathBuf,
    pub destination: RemotePath,
    pub attributes: Attributes,
}

/// Operations of the copy variant in application order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopyPlan {
    /// Every ancestor directory, shortest first
    pub directories: Vec<PlannedDirectory>,
    /// Every source file, sorted by destination
    pub files: Vec<PlannedFile>,
}

impl CopyPlan {
    /// Walk the source root and resolve every path.
    ///
    /// Fails when an override names a path that is neither a destination
    /// file nor one of its ancestors.
    pub fn build(request: &CopyRequest) -> Result<Self> {
        let entries = TreeWalker::new(&request.src_root).collect_sorted()?;
        let destinations: Vec<RemotePath> =
            entries.iter().map(|e| e.destination.clone()).collect();
        let directories = parent_directories(&destinations);

        check_override_targets(&request.policy, &destinations, &directories)?;

        let directories = directories
            .into_iter()
            .map(|path| PlannedDirectory {
                attributes: request.policy.resolve(&path, PathKind::Directory),
                path,
            })
            .collect();
        let files = entries
            .into_iter()
            .map(|SourceEntry { source, destination }| PlannedFile {
                attributes: request.policy.resolve(&destination, PathKind::File),
                source,
                destination,
            })
            .collect();

        let plan = Self { directories, files };
        tracing::debug!(
            directories = plan.directories.len(),
            files = plan.files.len(),
            "Built copy plan"
        );
        Ok(plan)
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.files.is_empty()
    }
}

/// Operations of the template variant
///
/// Directories here are candidates: the engine creates only those missing
/// on the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplatePlan {
    /// Immediate parents of the rendered files, shortest first
    pub directories: Vec<RemotePath>,
    /// Templates sorted by rendered destination
    pub templates: Vec<SourceEntry>,
    pub file_attributes: Attributes,
    pub dir_attributes: Attributes,
    pub vars: TemplateContext,
}

impl TemplatePlan {
    pub fn build(request: &TemplateRequest) -> Result<Self> {
        let templates = TreeWalker::new(&request.templates_root)
            .with_suffix(TEMPLATE_SUFFIX)
            .collect_sorted()?;
        let directories = immediate_parents(templates.iter().map(|t| &t.destination));

        tracing::debug!(
            directories = directories.len(),
            templates = templates.len(),
            "Built template plan"
        );
        Ok(Self {
            directories,
            templates,
            file_attributes: Attributes::new(
                request.owner.clone(),
                request.group.clone(),
                request.mode,
            ),
            dir_attributes: Attributes::new(
                request.owner.clone(),
                request.group.clone(),
                request.new_dir_mode,
            ),
            vars: request.vars.clone(),
        })
    }
}
