//! Filesystem primitives for treesync
//!
//! Provides destination path handling, source tree walking, ancestor
//! directory ordering, permission modes and atomic I/O.

pub mod ancestry;
pub mod args;
pub mod checksum;
pub mod error;
pub mod io;
pub mod mode;
pub mod path;
pub mod walk;

pub use ancestry::{immediate_parents, parent_directories};
pub use args::{Args, ArgsStore};
pub use error::{Error, Result};
pub use mode::Mode;
pub use path::RemotePath;
pub use walk::{SourceEntry, TEMPLATE_SUFFIX, TreeWalker};
