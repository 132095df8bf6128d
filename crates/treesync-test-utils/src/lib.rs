//! Shared test utilities for the treesync workspace.
//!
//! This crate provides fixtures used by the workspace integration tests. It
//! is a dev-dependency only and never published.
//!
//! # Modules
//!
//! - [`tree`]: [`TestTree`] builder for a source tree, a target root and
//!   argument files
//! - [`memory`]: [`MemoryAdapter`], an in-memory target that records every
//!   operation issued

pub mod memory;
pub mod tree;

pub use memory::{MemoryAdapter, Node, Op};
pub use tree::TestTree;
