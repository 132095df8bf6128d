//! Template variant driver

use treesync_fs::Args;

use super::run_phase;
use crate::adapter::RemoteAdapter;
use crate::gate::TemplateRequest;
use crate::plan::TemplatePlan;
use crate::report::{OpOutcome, Reconciliation};
use crate::Result;

/// Renders a template tree onto the target.
///
/// Only parent directories that are missing on the target are created;
/// existing ones keep their attributes.
pub struct TemplateEngine<'a> {
    adapter: &'a mut dyn RemoteAdapter,
}

impl<'a> TemplateEngine<'a> {
    pub fn new(adapter: &'a mut dyn RemoteAdapter) -> Self {
        Self { adapter }
    }

    pub fn plan(&self, args: &Args) -> Result<TemplatePlan> {
        let request = TemplateRequest::from_args(args)?;
        TemplatePlan::build(&request)
    }

    pub fn run(&mut self, args: &Args) -> Reconciliation {
        match self.plan(args) {
            Ok(plan) => self.apply(&plan),
            Err(e) => {
                tracing::warn!(error = %e, "Template rejected");
                Reconciliation::failure(e.to_string())
            }
        }
    }

    pub fn apply(&mut self, plan: &TemplatePlan) -> Reconciliation {
        tracing::info!(
            directories = plan.directories.len(),
            templates = plan.templates.len(),
            "Applying template plan"
        );
        let adapter = &mut *self.adapter;

        let result = run_phase("directories", Reconciliation::new(), &plan.directories, |path| {
            match adapter.stat_remote_path(path, true) {
                Ok(stat) if stat.exists && stat.is_dir => {
                    tracing::debug!(path = %path, "Directory present");
                    OpOutcome::unchanged()
                }
                Ok(_) => {
                    tracing::debug!(
                        path = %path,
                        attributes = %plan.dir_attributes,
                        "Creating directory"
                    );
                    adapter.ensure_directory(path, &plan.dir_attributes)
                }
                Err(e) => OpOutcome::failure(format!("{}: {}", path, e)),
            }
        });

        run_phase("templates", result, &plan.templates, |entry| {
            tracing::debug!(
                path = %entry.destination,
                template = %entry.source.display(),
                "Rendering template"
            );
            adapter.render_template(
                &entry.source,
                &entry.destination,
                &plan.vars,
                &plan.file_attributes,
            )
        })
    }
}
