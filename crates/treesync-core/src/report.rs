//! Operation outcomes and the reconciliation result they fold into

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use similar::TextDiff;

/// Before/after record of one changed aspect of a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRecord {
    /// Label of the prior state, usually the destination path
    pub before_header: String,
    /// Label of the desired state, usually the source
    pub after_header: String,
    /// Prior state as text
    pub before: String,
    /// Desired state as text
    pub after: String,
}

impl DiffRecord {
    pub fn new(
        before_header: impl Into<String>,
        after_header: impl Into<String>,
        before: impl Into<String>,
        after: impl Into<String>,
    ) -> Self {
        Self {
            before_header: before_header.into(),
            after_header: after_header.into(),
            before: before.into(),
            after: after.into(),
        }
    }

    /// Whether the record describes an actual difference
    pub fn is_noop(&self) -> bool {
        self.before == self.after
    }

    /// Render as a unified diff
    pub fn unified(&self) -> String {
        TextDiff::from_lines(&self.before, &self.after)
            .unified_diff()
            .context_radius(3)
            .header(&self.before_header, &self.after_header)
            .to_string()
    }
}

/// Outcome of a single adapter operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OpOutcome {
    pub changed: bool,
    pub failed: bool,
    pub msg: Option<String>,
    pub diff: Vec<DiffRecord>,
}

impl OpOutcome {
    /// Nothing needed doing
    pub fn unchanged() -> Self {
        Self::default()
    }

    /// The target was (or in check mode would be) modified
    pub fn changed() -> Self {
        Self {
            changed: true,
            ..Self::default()
        }
    }

    /// The operation failed
    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            failed: true,
            msg: Some(msg.into()),
            ..Self::default()
        }
    }

    pub fn with_msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = Some(msg.into());
        self
    }

    pub fn with_diff(mut self, diff: DiffRecord) -> Self {
        self.diff.push(diff);
        self
    }
}

/// Aggregated result of a reconciliation run
///
/// Built by folding [`OpOutcome`]s with [`Reconciliation::absorb`]. Once
/// `failed` is set the drivers stop issuing operations; whatever was
/// accumulated up to that point is still returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub changed: bool,
    pub failed: bool,
    /// Ordered message log
    pub messages: Vec<String>,
    /// Ordered diff records
    pub diff: Vec<DiffRecord>,
}

impl Reconciliation {
    /// An empty, successful, unchanged result
    pub fn new() -> Self {
        Self::default()
    }

    /// A failed result carrying only `msg`
    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            failed: true,
            messages: vec![msg.into()],
            ..Self::default()
        }
    }

    /// Merge one operation outcome into the result.
    ///
    /// Diffs are kept when the operation changed something; otherwise only
    /// records whose before and after differ are kept.
    pub fn absorb(mut self, outcome: OpOutcome) -> Self {
        self.changed |= outcome.changed;
        self.failed |= outcome.failed;
        if let Some(msg) = outcome.msg {
            self.messages.push(msg);
        }
        if outcome.changed {
            self.diff.extend(outcome.diff);
        } else {
            self.diff
                .extend(outcome.diff.into_iter().filter(|d| !d.is_noop()));
        }
        self
    }

    /// The message log joined with newlines
    pub fn msg(&self) -> String {
        self.messages.join("\n")
    }

    /// Neither changed nor failed: the target already matched
    pub fn is_converged(&self) -> bool {
        !self.changed && !self.failed
    }
}

impl Serialize for Reconciliation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Reconciliation", 4)?;
        state.serialize_field("changed", &self.changed)?;
        state.serialize_field("failed", &self.failed)?;
        state.serialize_field("msg", &self.msg())?;
        state.serialize_field("diff", &self.diff)?;
        state.end()
    }
}
