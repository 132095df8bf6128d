//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// treesync - converge a target tree toward a local tree plus an attribute policy
#[derive(Parser, Debug)]
#[command(name = "treesync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Mirror a source tree with per-path owner, group and mode
    ///
    /// The argument file needs owner, group, mode, parent_dirs_mode and
    /// src_root; mode_overrides, owner_overrides and group_overrides are
    /// optional.
    ///
    /// Examples:
    ///   treesync copy --args site.yml --target /mnt/root
    ///   treesync copy --args site.yml --target /mnt/root --check --diff
    Copy(RunOptions),

    /// Render a template tree, stripping the .j2 suffix
    ///
    /// The argument file needs templates_root; owner, group, mode,
    /// new_dir_mode and vars are optional.
    Template(RunOptions),
}

/// Options shared by both variants
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Argument file (.yaml, .yml, .json or .toml)
    #[arg(short, long = "args", value_name = "FILE")]
    pub args_file: PathBuf,

    /// Directory standing in for the target root
    #[arg(short, long, value_name = "DIR", env = "TREESYNC_TARGET")]
    pub target: PathBuf,

    /// Report what would change without modifying the target
    #[arg(long)]
    pub check: bool,

    /// Show before/after differences
    #[arg(long)]
    pub diff: bool,

    /// Output the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Leave owner and group untouched (for unprivileged runs)
    #[arg(long)]
    pub ignore_ownership: bool,
}
