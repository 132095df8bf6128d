//! Reconciliation drivers
//!
//! Both engines run their phases strictly in sequence and fold each
//! adapter outcome into a [`Reconciliation`]. The first failed outcome
//! stops the run; what was accumulated until then is returned as is.

mod copy;
mod template;

pub use copy::CopyEngine;
pub use template::TemplateEngine;

use crate::report::{OpOutcome, Reconciliation};

/// Fold one phase of operations into `result`, stopping at the first failure.
///
/// Nothing is issued when `result` has already failed.
pub(crate) fn run_phase<T>(
    phase: &'static str,
    result: Reconciliation,
    items: impl IntoIterator<Item = T>,
    mut operation: impl FnMut(T) -> OpOutcome,
) -> Reconciliation {
    if result.failed {
        return result;
    }

    let mut issued = 0usize;
    let mut result = result;
    for item in items {
        let outcome = operation(item);
        issued += 1;
        if outcome.failed {
            tracing::warn!(
                phase,
                issued,
                error = outcome.msg.as_deref().unwrap_or_default(),
                "Operation failed, stopping"
            );
            return result.absorb(outcome);
        }
        result = result.absorb(outcome);
    }

    tracing::info!(
        phase,
        operations = issued,
        changed = result.changed,
        "Phase complete"
    );
    result
}
