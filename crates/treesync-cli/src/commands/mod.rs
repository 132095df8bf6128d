//! Command implementations for treesync-cli

mod output;
mod reconcile;

pub use reconcile::{Variant, run_reconcile};
