use super::Node;

/// Aggregates per-node errors into a graph-level validity flag.
///
/// Sweeps are deferred: mutations only [`schedule`](Self::schedule) one, and the owner runs
/// it on its next tick so a burst of edits costs a single pass.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    scheduled: bool,
    invalid: bool,
}

impl Validator {
    pub fn schedule(&mut self) {
        self.scheduled = true;
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// Runs the pending sweep, if any. Returns `true` when the flag changed.
    pub fn run_pending<'a>(&mut self, nodes: impl IntoIterator<Item = &'a Node>) -> bool {
        if !self.scheduled {
            return false;
        }
        self.scheduled = false;
        let invalid = nodes.into_iter().any(|node| node.error.is_some());
        let changed = invalid != self.invalid;
        self.invalid = invalid;
        changed
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid
    }
}
