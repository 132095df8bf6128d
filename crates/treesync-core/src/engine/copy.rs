//! Copy variant driver

use treesync_fs::Args;

use super::run_phase;
use crate::adapter::RemoteAdapter;
use crate::gate::CopyRequest;
use crate::plan::CopyPlan;
use crate::report::Reconciliation;
use crate::Result;

/// Mirrors a source tree onto the target with per-path attributes.
///
/// Every ancestor directory is converged before any file, shortest path
/// first.
pub struct CopyEngine<'a> {
    adapter: &'a mut dyn RemoteAdapter,
}

impl<'a> CopyEngine<'a> {
    pub fn new(adapter: &'a mut dyn RemoteAdapter) -> Self {
        Self { adapter }
    }

    /// Validate `args` and build the plan without touching the target.
    pub fn plan(&self, args: &Args) -> Result<CopyPlan> {
        let request = CopyRequest::from_args(args)?;
        CopyPlan::build(&request)
    }

    /// Validate, plan and apply.
    ///
    /// Validation errors yield a failed result before any adapter call.
    pub fn run(&mut self, args: &Args) -> Reconciliation {
        match self.plan(args) {
            Ok(plan) => self.apply(&plan),
            Err(e) => {
                tracing::warn!(error = %e, "Copy rejected");
                Reconciliation::failure(e.to_string())
            }
        }
    }

    /// Directories first, then files; stops at the first failure.
    pub fn apply(&mut self, plan: &CopyPlan) -> Reconciliation {
        tracing::info!(
            directories = plan.directories.len(),
            files = plan.files.len(),
            "Applying copy plan"
        );
        let adapter = &mut *self.adapter;

        let result = run_phase("directories", Reconciliation::new(), &plan.directories, |dir| {
            tracing::debug!(path = %dir.path, attributes = %dir.attributes, "Ensuring directory");
            adapter.ensure_directory(&dir.path, &dir.attributes)
        });

        run_phase("files", result, &plan.files, |file| {
            tracing::debug!(
                path = %file.destination,
                source = %file.source.display(),
                attributes = %file.attributes,
                "Writing file"
            );
            adapter.write_file(&file.source, &file.destination, &file.attributes)
        })
    }
}
