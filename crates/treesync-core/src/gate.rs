//! Validation gate
//!
//! Every check here runs before the first adapter call. A request that gets
//! through is immutable and normalized; the engines never look at the raw
//! [`Args`] again.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde_json::Value;
use treesync_fs::{Args, Mode, RemotePath};

use crate::adapter::TemplateContext;
use crate::policy::{AttributePolicy, OverrideTable};
use crate::{Error, Result};

/// Operating systems whose filesystem root is `/`
pub const SUPPORTED_OS: &[&str] = &["linux", "macos"];

/// Mode of rendered files when `mode` is not given
pub const DEFAULT_TEMPLATE_MODE: &str = "0644";

/// Mode of directories created for templates when `new_dir_mode` is not given
pub const DEFAULT_NEW_DIR_MODE: &str = "0755";

const COPY_REQUIRED: &[&str] = &["owner", "group", "mode", "parent_dirs_mode", "src_root"];
const COPY_SUPPORTED: &[&str] = &[
    "owner",
    "group",
    "mode",
    "parent_dirs_mode",
    "src_root",
    "mode_overrides",
    "owner_overrides",
    "group_overrides",
];

const TEMPLATE_REQUIRED: &[&str] = &["templates_root"];
const TEMPLATE_SUPPORTED: &[&str] = &[
    "templates_root",
    "owner",
    "group",
    "mode",
    "new_dir_mode",
    "vars",
];

/// Validated arguments of the copy variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRequest {
    /// Canonical source root
    pub src_root: PathBuf,
    pub policy: AttributePolicy,
}

impl CopyRequest {
    /// Run the argument checks of the gate.
    ///
    /// Override targets can only be checked once the tree has been walked;
    /// see [`check_override_targets`].
    pub fn from_args(args: &Args) -> Result<Self> {
        check_platform()?;
        check_fields(args, COPY_REQUIRED, COPY_SUPPORTED)?;

        let src_root = root_arg(args, "src_root")?;

        let file_mode = parse_mode(required_str(args, "mode")?)?;
        let dir_mode = parse_mode(required_str(args, "parent_dirs_mode")?)?;
        let mut policy = AttributePolicy::new(
            Some(required_str(args, "owner")?.to_string()),
            Some(required_str(args, "group")?.to_string()),
            file_mode,
            dir_mode,
        );

        for (value, paths) in override_arg(args, "mode_overrides")? {
            let mode = parse_mode(&value)?;
            policy.mode_overrides.insert(mode, paths.iter().map(String::as_str));
        }
        for (value, paths) in override_arg(args, "owner_overrides")? {
            policy.owner_overrides.insert(value, paths.iter().map(String::as_str));
        }
        for (value, paths) in override_arg(args, "group_overrides")? {
            policy.group_overrides.insert(value, paths.iter().map(String::as_str));
        }

        check_conflicts("mode_overrides", &policy.mode_overrides)?;
        check_conflicts("owner_overrides", &policy.owner_overrides)?;
        check_conflicts("group_overrides", &policy.group_overrides)?;

        Ok(Self { src_root, policy })
    }
}

/// Validated arguments of the template variant
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateRequest {
    /// Canonical templates root
    pub templates_root: PathBuf,
    pub owner: Option<String>,
    pub group: Option<String>,
    /// Mode of rendered files
    pub mode: Mode,
    /// Mode of directories created because they were missing
    pub new_dir_mode: Mode,
    /// Template context
    pub vars: TemplateContext,
}

impl TemplateRequest {
    pub fn from_args(args: &Args) -> Result<Self> {
        check_platform()?;
        check_fields(args, TEMPLATE_REQUIRED, TEMPLATE_SUPPORTED)?;

        let templates_root = root_arg(args, "templates_root")?;
        let mode = parse_mode(optional_str(args, "mode")?.unwrap_or(DEFAULT_TEMPLATE_MODE))?;
        let new_dir_mode =
            parse_mode(optional_str(args, "new_dir_mode")?.unwrap_or(DEFAULT_NEW_DIR_MODE))?;

        let vars = match args.get("vars") {
            None => TemplateContext::new(),
            Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            Some(other) => {
                return Err(Error::configuration(format!(
                    "argument \"vars\" must be a mapping! found: {}",
                    other
                )));
            }
        };

        Ok(Self {
            templates_root,
            owner: optional_str(args, "owner")?.map(str::to_string),
            group: optional_str(args, "group")?.map(str::to_string),
            mode,
            new_dir_mode,
            vars,
        })
    }
}

/// Reject hosts whose root is not `/`.
pub fn check_platform() -> Result<()> {
    check_platform_named(std::env::consts::OS)
}

pub fn check_platform_named(os: &str) -> Result<()> {
    if SUPPORTED_OS.contains(&os) {
        Ok(())
    } else {
        Err(Error::Platform { os: os.to_string() })
    }
}

/// Every override path must name a destination file or one of its ancestors.
pub fn check_override_targets(
    policy: &AttributePolicy,
    files: &[RemotePath],
    directories: &[RemotePath],
) -> Result<()> {
    let valid: BTreeSet<&str> = files
        .iter()
        .chain(directories)
        .map(RemotePath::as_str)
        .collect();
    let invalid: Vec<&str> = policy
        .override_paths()
        .into_iter()
        .filter(|p| !valid.contains(p))
        .collect();

    if invalid.is_empty() {
        return Ok(());
    }
    let valid_paths: Vec<&str> = files
        .iter()
        .chain(directories)
        .map(RemotePath::as_str)
        .collect();
    Err(Error::configuration(format!(
        "overrides specified for invalid paths: {:?}. valid paths: {:?}",
        invalid, valid_paths
    )))
}

fn check_fields(args: &Args, required: &[&str], supported: &[&str]) -> Result<()> {
    if let Some(missing) = required.iter().find(|name| !args.contains_key(**name)) {
        return Err(Error::configuration(format!(
            "argument required: \"{}\"",
            missing
        )));
    }
    if let Some(unsupported) = args.keys().find(|name| !supported.contains(&name.as_str())) {
        return Err(Error::configuration(format!(
            "unsupported argument: \"{}\"",
            unsupported
        )));
    }
    Ok(())
}

fn optional_str<'a>(args: &'a Args, name: &str) -> Result<Option<&'a str>> {
    match args.get(name) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(Error::configuration(format!(
            "argument \"{}\" is not a string! found: {}",
            name, other
        ))),
    }
}

fn required_str<'a>(args: &'a Args, name: &str) -> Result<&'a str> {
    optional_str(args, name)?
        .ok_or_else(|| Error::configuration(format!("argument required: \"{}\"", name)))
}

fn parse_mode(value: &str) -> Result<Mode> {
    Mode::parse(value).map_err(|e| Error::configuration(e.to_string()))
}

fn root_arg(args: &Args, name: &str) -> Result<PathBuf> {
    let raw = required_str(args, name)?;
    let root = Path::new(raw);
    if !root.is_dir() {
        return Err(Error::configuration(format!("\"{}\" is not a directory!", raw)));
    }
    let canonical = dunce::canonicalize(root).map_err(|e| treesync_fs::Error::io(root, e))?;
    tracing::debug!(root = %canonical.display(), "Resolved {}", name);
    Ok(canonical)
}

fn override_arg(args: &Args, name: &str) -> Result<Vec<(String, Vec<String>)>> {
    let table = match args.get(name) {
        None => return Ok(Vec::new()),
        Some(Value::Object(table)) => table,
        Some(other) => {
            return Err(Error::configuration(format!(
                "argument \"{}\" must be a mapping of value to list of paths! found: {}",
                name, other
            )));
        }
    };

    let mut entries = Vec::with_capacity(table.len());
    for (value, paths) in table {
        let paths = paths
            .as_array()
            .and_then(|list| {
                list.iter()
                    .map(|p| p.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
            })
            .ok_or_else(|| {
                Error::configuration(format!(
                    "{}[\"{}\"] must be a list of paths! found: {}",
                    name, value, paths
                ))
            })?;
        entries.push((value.clone(), paths));
    }
    Ok(entries)
}

fn check_conflicts<V>(name: &str, table: &OverrideTable<V>) -> Result<()> {
    match table.conflicts().first() {
        None => Ok(()),
        Some(path) => Err(Error::configuration(format!(
            "path \"{}\" is listed under more than one value in {}",
            path, name
        ))),
    }
}
