//! User and group name resolution
//!
//! Names go through the system name service (`getpwnam_r`/`getgrnam_r` via
//! nix), so accounts from LDAP, sssd or directory services resolve the same
//! way `chown` would resolve them. Numeric names are taken as ids verbatim.

use std::collections::HashMap;

use crate::{Error, Result};

/// Where names are resolved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IdentityDb {
    /// The host's name service
    #[default]
    System,
    /// Fixed name to id tables, for targets whose accounts differ from the
    /// controlling host
    Fixed {
        users: HashMap<String, u32>,
        groups: HashMap<String, u32>,
    },
}

impl IdentityDb {
    pub fn system() -> Self {
        Self::System
    }

    pub fn fixed<'a>(
        users: impl IntoIterator<Item = (&'a str, u32)>,
        groups: impl IntoIterator<Item = (&'a str, u32)>,
    ) -> Self {
        Self::Fixed {
            users: table(users),
            groups: table(groups),
        }
    }

    pub fn uid(&self, name: &str) -> Result<u32> {
        if let Ok(id) = name.parse() {
            return Ok(id);
        }
        let found = match self {
            Self::System => system::uid(name)?,
            Self::Fixed { users, .. } => users.get(name).copied(),
        };
        found.ok_or_else(|| unknown("user", name))
    }

    pub fn gid(&self, name: &str) -> Result<u32> {
        if let Ok(id) = name.parse() {
            return Ok(id);
        }
        let found = match self {
            Self::System => system::gid(name)?,
            Self::Fixed { groups, .. } => groups.get(name).copied(),
        };
        found.ok_or_else(|| unknown("group", name))
    }

    /// Name for a uid, falling back to the number.
    pub fn user_name(&self, uid: u32) -> String {
        let name = match self {
            Self::System => system::user_name(uid),
            Self::Fixed { users, .. } => reverse(users, uid),
        };
        name.unwrap_or_else(|| uid.to_string())
    }

    /// Name for a gid, falling back to the number.
    pub fn group_name(&self, gid: u32) -> String {
        let name = match self {
            Self::System => system::group_name(gid),
            Self::Fixed { groups, .. } => reverse(groups, gid),
        };
        name.unwrap_or_else(|| gid.to_string())
    }
}

fn table<'a>(entries: impl IntoIterator<Item = (&'a str, u32)>) -> HashMap<String, u32> {
    entries
        .into_iter()
        .map(|(name, id)| (name.to_string(), id))
        .collect()
}

fn unknown(kind: &'static str, name: &str) -> Error {
    Error::UnknownIdentity {
        kind,
        name: name.to_string(),
    }
}

fn reverse(table: &HashMap<String, u32>, id: u32) -> Option<String> {
    // Several names may share an id; pick the smallest for stable output
    table
        .iter()
        .filter(|(_, v)| **v == id)
        .map(|(k, _)| k)
        .min()
        .cloned()
}

#[cfg(unix)]
mod system {
    use nix::unistd::{Gid, Group, Uid, User};

    use crate::{Error, Result};

    fn lookup_failed(kind: &str, name: &str, e: nix::Error) -> Error {
        Error::operation(format!("failed to look up {} \"{}\": {}", kind, name, e))
    }

    pub fn uid(name: &str) -> Result<Option<u32>> {
        User::from_name(name)
            .map(|user| user.map(|u| u.uid.as_raw()))
            .map_err(|e| lookup_failed("user", name, e))
    }

    pub fn gid(name: &str) -> Result<Option<u32>> {
        Group::from_name(name)
            .map(|group| group.map(|g| g.gid.as_raw()))
            .map_err(|e| lookup_failed("group", name, e))
    }

    pub fn user_name(uid: u32) -> Option<String> {
        User::from_uid(Uid::from_raw(uid)).ok().flatten().map(|u| u.name)
    }

    pub fn group_name(gid: u32) -> Option<String> {
        Group::from_gid(Gid::from_raw(gid)).ok().flatten().map(|g| g.name)
    }
}

#[cfg(not(unix))]
mod system {
    use crate::Result;

    pub fn uid(_name: &str) -> Result<Option<u32>> {
        Ok(None)
    }

    pub fn gid(_name: &str) -> Result<Option<u32>> {
        Ok(None)
    }

    pub fn user_name(_uid: u32) -> Option<String> {
        None
    }

    pub fn group_name(_gid: u32) -> Option<String> {
        None
    }
}
