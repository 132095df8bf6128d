//! Atomic I/O and attribute primitives used by the local target adapter

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use fs2::FileExt;

use crate::{Error, Mode, Result};

/// Attributes given to the temp file before it replaces the destination
///
/// Ownership is applied before the mode because chown clears the setuid and
/// setgid bits of regular files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteAttributes {
    pub mode: Option<Mode>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
}

impl WriteAttributes {
    pub fn with_mode(mode: Mode) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }
}

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so readers never observe a partial file.
/// The parent directory must already exist. The temp file is removed on
/// every failure path.
pub fn write_atomic(path: &Path, content: &[u8], attrs: WriteAttributes) -> Result<()> {
    // Temp file in the same directory so the rename stays on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    let staged = stage(path, &temp_path, temp_file, content, attrs)
        .and_then(|()| fs::rename(&temp_path, path).map_err(|e| Error::io(path, e)));
    if staged.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    staged
}

fn stage(
    path: &Path,
    temp_path: &Path,
    mut temp_file: File,
    content: &[u8],
    attrs: WriteAttributes,
) -> Result<()> {
    FileExt::lock_exclusive(&temp_file).map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    temp_file
        .write_all(content)
        .and_then(|()| temp_file.sync_all())
        .map_err(|e| Error::io(temp_path, e))?;

    FileExt::unlock(&temp_file).map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;
    drop(temp_file);

    if attrs.uid.is_some() || attrs.gid.is_some() {
        set_ownership(temp_path, attrs.uid, attrs.gid)?;
    }
    if let Some(mode) = attrs.mode {
        set_mode(temp_path, mode)?;
    }
    Ok(())
}

/// Read a file, returning `None` when it does not exist.
pub fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Apply permission bits to a path.
#[cfg(unix)]
pub fn set_mode(path: &Path, mode: Mode) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode.bits()))
        .map_err(|e| Error::io(path, e))
}

#[cfg(not(unix))]
pub fn set_mode(_path: &Path, _mode: Mode) -> Result<()> {
    Ok(())
}

/// Current permission bits of a path, following symlinks like chmod does.
#[cfg(unix)]
pub fn mode_of(path: &Path) -> Result<Mode> {
    use std::os::unix::fs::PermissionsExt;
    let meta = fs::metadata(path).map_err(|e| Error::io(path, e))?;
    Ok(Mode::from_bits(meta.permissions().mode()))
}

#[cfg(not(unix))]
pub fn mode_of(path: &Path) -> Result<Mode> {
    fs::metadata(path).map_err(|e| Error::io(path, e))?;
    Ok(Mode::from_bits(0))
}

/// Current numeric owner and group of a path.
#[cfg(unix)]
pub fn ownership_of(path: &Path) -> Result<(u32, u32)> {
    use std::os::unix::fs::MetadataExt;
    let meta = fs::metadata(path).map_err(|e| Error::io(path, e))?;
    Ok((meta.uid(), meta.gid()))
}

#[cfg(not(unix))]
pub fn ownership_of(path: &Path) -> Result<(u32, u32)> {
    fs::metadata(path).map_err(|e| Error::io(path, e))?;
    Ok((0, 0))
}

/// Change numeric owner and/or group of a path; `None` keeps that id.
#[cfg(unix)]
pub fn set_ownership(path: &Path, uid: Option<u32>, gid: Option<u32>) -> Result<()> {
    std::os::unix::fs::chown(path, uid, gid).map_err(|e| Error::io(path, e))
}

#[cfg(not(unix))]
pub fn set_ownership(_path: &Path, _uid: Option<u32>, _gid: Option<u32>) -> Result<()> {
    Ok(())
}
