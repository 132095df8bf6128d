//! Local filesystem adapter
//!
//! Treats a local directory as the target root: destination `/a/b` lives at
//! `<target_root>/a/b`. Useful for staging images, chroots, containers'
//! root filesystems and for tests.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use treesync_fs::checksum::compute_content_checksum;
use treesync_fs::io::{self, WriteAttributes};
use treesync_fs::{Mode, RemotePath};

use super::{IdentityDb, RemoteAdapter, RemoteStat, TemplateContext, TemplateRenderer, VarsRenderer};
use crate::policy::Attributes;
use crate::report::{DiffRecord, OpOutcome};
use crate::{Error, Result};

/// Whether owner and group are reconciled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OwnershipPolicy {
    /// Resolve names and chown when they differ
    #[default]
    Enforce,
    /// Leave ownership alone; only content and mode are reconciled
    Ignore,
}

/// Behaviour switches of the local adapter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalOptions {
    /// Report what would change without touching the target
    pub check_mode: bool,
    /// Produce before/after records
    pub diff_mode: bool,
    pub ownership: OwnershipPolicy,
}

/// Numeric owner/group wanted for a path; `None` leaves that id alone
#[derive(Debug, Clone, Copy, Default)]
struct DesiredIds {
    uid: Option<u32>,
    gid: Option<u32>,
}

/// Differences between a path's current attributes and the desired ones
#[derive(Debug, Clone, Copy, Default)]
struct AttrDelta {
    mode: Option<(Mode, Mode)>,
    uid: Option<(u32, u32)>,
    gid: Option<(u32, u32)>,
}

impl AttrDelta {
    fn is_empty(&self) -> bool {
        self.mode.is_none() && self.uid.is_none() && self.gid.is_none()
    }
}

/// [`RemoteAdapter`] over a local directory
pub struct LocalAdapter {
    target_root: PathBuf,
    options: LocalOptions,
    identities: IdentityDb,
    renderer: Box<dyn TemplateRenderer>,
}

impl LocalAdapter {
    /// Create an adapter resolving names through the system name service
    /// and rendering with [`VarsRenderer`].
    pub fn new(target_root: impl Into<PathBuf>, options: LocalOptions) -> Self {
        Self {
            target_root: target_root.into(),
            options,
            identities: IdentityDb::system(),
            renderer: Box::new(VarsRenderer),
        }
    }

    pub fn with_identities(mut self, identities: IdentityDb) -> Self {
        self.identities = identities;
        self
    }

    pub fn with_renderer(mut self, renderer: impl TemplateRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    fn desired_ids(&self, attrs: &Attributes) -> Result<DesiredIds> {
        if self.options.ownership == OwnershipPolicy::Ignore {
            return Ok(DesiredIds::default());
        }
        Ok(DesiredIds {
            uid: attrs.owner.as_deref().map(|o| self.identities.uid(o)).transpose()?,
            gid: attrs.group.as_deref().map(|g| self.identities.gid(g)).transpose()?,
        })
    }

    fn attribute_delta(&self, native: &Path, attrs: &Attributes, ids: DesiredIds) -> Result<AttrDelta> {
        let mode = io::mode_of(native)?;
        let (uid, gid) = io::ownership_of(native)?;
        Ok(AttrDelta {
            mode: (mode != attrs.mode).then_some((mode, attrs.mode)),
            uid: ids.uid.filter(|want| *want != uid).map(|want| (uid, want)),
            gid: ids.gid.filter(|want| *want != gid).map(|want| (gid, want)),
        })
    }

    fn apply_ownership(native: &Path, ids: DesiredIds) -> Result<()> {
        if ids.uid.is_none() && ids.gid.is_none() {
            return Ok(());
        }
        io::set_ownership(native, ids.uid, ids.gid)?;
        Ok(())
    }

    /// Attribute listing used on both sides of attribute diffs.
    fn describe(&self, state: &str, mode: Mode, uid: Option<u32>, gid: Option<u32>) -> String {
        let mut out = format!("state={}\nmode={}\n", state, mode);
        if let Some(uid) = uid {
            out.push_str(&format!("owner={}\n", self.identities.user_name(uid)));
        }
        if let Some(gid) = gid {
            out.push_str(&format!("group={}\n", self.identities.group_name(gid)));
        }
        out
    }

    fn summarize(&self, delta: &AttrDelta) -> String {
        let mut parts = Vec::new();
        if let Some((from, to)) = delta.mode {
            parts.push(format!("mode {} -> {}", from, to));
        }
        if let Some((from, to)) = delta.uid {
            parts.push(format!(
                "owner {} -> {}",
                self.identities.user_name(from),
                self.identities.user_name(to)
            ));
        }
        if let Some((from, to)) = delta.gid {
            parts.push(format!(
                "group {} -> {}",
                self.identities.group_name(from),
                self.identities.group_name(to)
            ));
        }
        parts.join(", ")
    }

    /// Bring mode and ownership of an existing path in line.
    fn converge_attributes(
        &self,
        path: &RemotePath,
        native: &Path,
        state: &str,
        attrs: &Attributes,
        ids: DesiredIds,
    ) -> Result<OpOutcome> {
        let delta = self.attribute_delta(native, attrs, ids)?;
        if delta.is_empty() {
            tracing::debug!(path = %path, "Attributes already match");
            return Ok(OpOutcome::unchanged());
        }

        if !self.options.check_mode {
            // chown may clear setuid/setgid bits, so the mode is always
            // reapplied after it
            Self::apply_ownership(native, ids)?;
            io::set_mode(native, attrs.mode)?;
        }

        let mut outcome =
            OpOutcome::changed().with_msg(format!("{}: {}", path, self.summarize(&delta)));
        if self.options.diff_mode {
            let before = self.describe(
                state,
                delta.mode.map_or(attrs.mode, |(from, _)| from),
                delta.uid.map(|(from, _)| from).or(ids.uid),
                delta.gid.map(|(from, _)| from).or(ids.gid),
            );
            let after = self.describe(state, attrs.mode, ids.uid, ids.gid);
            outcome = outcome.with_diff(DiffRecord::new(path.as_str(), path.as_str(), before, after));
        }
        Ok(outcome)
    }

    fn try_ensure_directory(&self, path: &RemotePath, attrs: &Attributes) -> Result<OpOutcome> {
        let native = path.under(&self.target_root);
        let ids = self.desired_ids(attrs)?;

        match fs::metadata(&native) {
            Ok(meta) if meta.is_dir() => {
                self.converge_attributes(path, &native, "directory", attrs, ids)
            }
            Ok(_) => Err(Error::operation(format!(
                "{} exists but is not a directory",
                path
            ))),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // Every component created here gets the requested attributes;
                // existing ancestors are left alone
                let mut created: Vec<RemotePath> = path
                    .ancestors()
                    .filter(|dir| !dir.under(&self.target_root).exists())
                    .collect();
                created.reverse();
                created.push(path.clone());

                if !self.options.check_mode {
                    for dir in &created {
                        let native = dir.under(&self.target_root);
                        fs::create_dir(&native).map_err(|e| treesync_fs::Error::io(&native, e))?;
                        Self::apply_ownership(&native, ids)?;
                        io::set_mode(&native, attrs.mode)?;
                    }
                }
                tracing::debug!(path = %path, created = created.len(), mode = %attrs.mode, "Created directory");

                let mut outcome =
                    OpOutcome::changed().with_msg(format!("created directory {}", path));
                if self.options.diff_mode {
                    for dir in &created {
                        outcome = outcome.with_diff(DiffRecord::new(
                            dir.as_str(),
                            dir.as_str(),
                            "state=absent\n",
                            self.describe("directory", attrs.mode, ids.uid, ids.gid),
                        ));
                    }
                }
                Ok(outcome)
            }
            Err(e) => Err(treesync_fs::Error::io(&native, e).into()),
        }
    }

    /// Converge `dest` onto `content`, then its attributes.
    fn converge_content(
        &self,
        dest: &RemotePath,
        content: &[u8],
        origin: &str,
        attrs: &Attributes,
    ) -> Result<OpOutcome> {
        let native = dest.under(&self.target_root);
        if native.is_dir() {
            return Err(Error::operation(format!("{} is a directory", dest)));
        }
        let ids = self.desired_ids(attrs)?;
        let existing = io::read_if_exists(&native)?;

        if existing.as_deref() == Some(content) {
            return self.converge_attributes(dest, &native, "file", attrs, ids);
        }

        // Attribute drift on an existing file is reported next to the content diff
        let (delta, current_ids) = match existing {
            Some(_) => (
                self.attribute_delta(&native, attrs, ids)?,
                Some(io::ownership_of(&native)?),
            ),
            None => (AttrDelta::default(), None),
        };

        if !self.options.check_mode {
            // The rename replaces the inode, so ids not being enforced are
            // carried over from the file being replaced
            let write_attrs = WriteAttributes {
                mode: Some(attrs.mode),
                uid: ids.uid.or(current_ids.map(|(uid, _)| uid)),
                gid: ids.gid.or(current_ids.map(|(_, gid)| gid)),
            };
            io::write_atomic(&native, content, write_attrs)?;
        }

        let verb = if existing.is_some() { "updated" } else { "created" };
        tracing::debug!(path = %dest, origin, "File content {}", verb);

        let mut msg = format!("{} {}", verb, dest);
        if !delta.is_empty() {
            msg.push_str(&format!(" ({})", self.summarize(&delta)));
        }
        let mut outcome = OpOutcome::changed().with_msg(msg);
        if self.options.diff_mode {
            let before = existing.as_deref().map(display_content).unwrap_or_default();
            outcome = outcome.with_diff(DiffRecord::new(
                dest.as_str(),
                origin,
                before,
                display_content(content),
            ));
        }
        Ok(outcome)
    }
}

/// Text content as-is; anything else as its checksum.
fn display_content(content: &[u8]) -> String {
    match std::str::from_utf8(content) {
        Ok(text) => text.to_string(),
        Err(_) => format!("binary content {}\n", compute_content_checksum(content)),
    }
}

impl RemoteAdapter for LocalAdapter {
    fn ensure_directory(&mut self, path: &RemotePath, attrs: &Attributes) -> OpOutcome {
        self.try_ensure_directory(path, attrs)
            .unwrap_or_else(|e| OpOutcome::failure(format!("{}: {}", path, e)))
    }

    fn write_file(&mut self, source: &Path, dest: &RemotePath, attrs: &Attributes) -> OpOutcome {
        let origin = source.display().to_string();
        fs::read(source)
            .map_err(|e| Error::from(treesync_fs::Error::io(source, e)))
            .and_then(|content| self.converge_content(dest, &content, &origin, attrs))
            .unwrap_or_else(|e| OpOutcome::failure(format!("{}: {}", dest, e)))
    }

    fn render_template(
        &mut self,
        template: &Path,
        dest: &RemotePath,
        context: &TemplateContext,
        attrs: &Attributes,
    ) -> OpOutcome {
        let origin = template.display().to_string();
        self.renderer
            .render(template, context)
            .and_then(|content| self.converge_content(dest, &content, &origin, attrs))
            .unwrap_or_else(|e| OpOutcome::failure(format!("{}: {}", dest, e)))
    }

    fn stat_remote_path(&mut self, path: &RemotePath, follow_symlinks: bool) -> Result<RemoteStat> {
        let native = path.under(&self.target_root);
        let meta = if follow_symlinks {
            fs::metadata(&native)
        } else {
            fs::symlink_metadata(&native)
        };
        match meta {
            Ok(meta) => Ok(RemoteStat {
                exists: true,
                is_dir: meta.is_dir(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(RemoteStat::missing()),
            Err(e) => Err(treesync_fs::Error::io(&native, e).into()),
        }
    }
}
