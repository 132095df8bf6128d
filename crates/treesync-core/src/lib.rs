//! Reconciliation engines for treesync
//!
//! This crate converges a target filesystem toward a local tree plus an
//! attribute policy:
//!
//! - **Validation gate**: rejects malformed arguments before any mutation
//! - **Policy resolution**: owner, group and mode per path, overrides first
//! - **Plans**: ordered directory and file operations derived from a source tree
//! - **Engines**: the copy and template drivers folding operation outcomes
//!   into a [`Reconciliation`]
//! - **Adapters**: the [`RemoteAdapter`] boundary and a local-filesystem
//!   implementation
//!
//! # Architecture
//!
//! ```text
//!             args
//!               |
//!         validation gate
//!               |
//!   tree walk + ancestry + policy  ->  plan
//!               |
//!         engine (driver)
//!               |
//!        RemoteAdapter (per path)
//!               |
//!         Reconciliation
//! ```
//!
//! # Example
//!
//! ```ignore
//! use treesync_core::{CopyEngine, LocalAdapter, LocalOptions};
//!
//! let mut adapter = LocalAdapter::new("/mnt/target", LocalOptions::default());
//! let result = CopyEngine::new(&mut adapter).run(&args);
//! assert!(!result.failed, "{}", result.msg());
//! ```

pub mod adapter;
pub mod engine;
pub mod error;
pub mod gate;
pub mod plan;
pub mod policy;
pub mod report;

pub use adapter::{
    LocalAdapter, LocalOptions, OwnershipPolicy, RemoteAdapter, RemoteStat, TemplateContext,
    TemplateRenderer, VarsRenderer,
};
pub use engine::{CopyEngine, TemplateEngine};
pub use error::{Error, Result};
pub use gate::{CopyRequest, TemplateRequest};
pub use plan::{CopyPlan, PlannedDirectory, PlannedFile, TemplatePlan};
pub use policy::{AttributePolicy, Attributes, OverrideTable, PathKind};
pub use report::{DiffRecord, OpOutcome, Reconciliation};
