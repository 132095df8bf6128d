//! Copy and template commands
//!
//! Loads the argument file, builds a local adapter rooted at the target
//! directory and runs the selected engine.

use std::path::Path;

use treesync_core::{
    CopyEngine, LocalAdapter, LocalOptions, OwnershipPolicy, Reconciliation, TemplateEngine,
};
use treesync_fs::{Args, ArgsStore};

use super::output::{print_human, print_json};
use crate::cli::RunOptions;
use crate::error::{CliError, Result};

/// Which engine to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Copy,
    Template,
}

impl Variant {
    fn name(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Template => "template",
        }
    }
}

/// Run one reconciliation and print its result.
///
/// Returns whether it succeeded.
pub fn run_reconcile(variant: Variant, opts: &RunOptions) -> Result<bool> {
    let args = ArgsStore::new().load(&opts.args_file)?;
    let mut adapter = LocalAdapter::new(&opts.target, local_options(opts));
    let result = reconcile(variant, &mut adapter, &args, &opts.target)?;

    if opts.json {
        print_json(&result)?;
    } else {
        print_human(variant.name(), &opts.target, opts.check, &result);
    }
    Ok(!result.failed)
}

fn local_options(opts: &RunOptions) -> LocalOptions {
    LocalOptions {
        check_mode: opts.check,
        diff_mode: opts.diff,
        ownership: if opts.ignore_ownership {
            OwnershipPolicy::Ignore
        } else {
            OwnershipPolicy::Enforce
        },
    }
}

fn reconcile(
    variant: Variant,
    adapter: &mut LocalAdapter,
    args: &Args,
    target: &Path,
) -> Result<Reconciliation> {
    if !target.is_dir() {
        return Err(CliError::user(format!(
            "target {} is not a directory",
            target.display()
        )));
    }
    tracing::info!(variant = variant.name(), target = %target.display(), "Starting reconciliation");

    let result = match variant {
        Variant::Copy => CopyEngine::new(adapter).run(args),
        Variant::Template => TemplateEngine::new(adapter).run(args),
    };
    tracing::info!(changed = result.changed, failed = result.failed, "Reconciliation finished");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn options(args_file: &Path, target: &Path) -> RunOptions {
        RunOptions {
            args_file: args_file.to_path_buf(),
            target: target.to_path_buf(),
            check: false,
            diff: false,
            json: true,
            ignore_ownership: true,
        }
    }

    #[test]
    fn missing_target_is_a_cli_error() {
        let temp = TempDir::new().unwrap();
        let args_file = temp.path().join("args.json");
        fs::write(&args_file, "{}").unwrap();

        let err = run_reconcile(Variant::Copy, &options(&args_file, &temp.path().join("nope")))
            .unwrap_err();
        assert!(err.to_string().contains("is not a directory"));
    }

    #[test]
    fn unreadable_args_is_a_cli_error() {
        let temp = TempDir::new().unwrap();
        let err = run_reconcile(
            Variant::Template,
            &options(&temp.path().join("missing.yml"), temp.path()),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Fs(_)));
    }

    #[test]
    fn rejected_args_report_failure() {
        let temp = TempDir::new().unwrap();
        let args_file = temp.path().join("args.json");
        fs::write(&args_file, r#"{"owner": "root"}"#).unwrap();

        let ok = run_reconcile(Variant::Copy, &options(&args_file, temp.path())).unwrap();
        assert!(!ok);
    }

    #[test]
    fn ownership_flag_selects_policy() {
        let temp = TempDir::new().unwrap();
        let mut opts = options(temp.path(), temp.path());
        assert_eq!(local_options(&opts).ownership, OwnershipPolicy::Ignore);
        opts.ignore_ownership = false;
        assert_eq!(local_options(&opts).ownership, OwnershipPolicy::Enforce);
    }
}
