use serde::{Deserialize, Serialize};

/// Whether a cothread reached its logical end or voluntarily stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Completion {
    /// The cothread completed its work; resuming it again is a no-op.
    Finished,
    /// The cothread stopped before completion and expects to be resumed.
    Preempted,
}

impl Completion {
    /// Map a "has more work" flag onto a completion value.
    #[inline]
    pub fn from_more_work(has_more_work: bool) -> Self {
        if has_more_work {
            Completion::Preempted
        } else {
            Completion::Finished
        }
    }
}
