use serde::{Deserialize, Serialize};

use crate::{Completion, PreemptReason, Progress};

/// Status reported by a cothread each time it returns control.
///
/// A finished status always carries [`PreemptReason::None`] and full progress.
/// [`Status::set_exit_status`] only flips the completion; callers keep the
/// other two fields consistent themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub completion: Completion,
    pub reason: PreemptReason,
    pub progress: Progress,
}

impl Status {
    pub const fn new(completion: Completion, reason: PreemptReason, progress: Progress) -> Self {
        Self {
            completion,
            reason,
            progress,
        }
    }

    /// `Finished / None / MAX_PROGRESS`.
    pub const fn finished() -> Self {
        Self::new(Completion::Finished, PreemptReason::None, Progress::FULL)
    }

    /// `Preempted / None / 0`: the state of a freshly initialised run.
    pub const fn pending() -> Self {
        Self::new(Completion::Preempted, PreemptReason::None, Progress::ZERO)
    }

    pub const fn preempted(reason: PreemptReason, progress: Progress) -> Self {
        Self::new(Completion::Preempted, reason, progress)
    }

    /// Set the completion to `Preempted` if there is more work, `Finished` otherwise.
    #[inline]
    pub fn set_exit_status(&mut self, has_more_work: bool) {
        self.completion = Completion::from_more_work(has_more_work);
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.completion == Completion::Finished
    }

    #[inline]
    pub fn is_preempted(&self) -> bool {
        self.completion == Completion::Preempted
    }

    #[inline]
    pub fn is_io_wait(&self) -> bool {
        self.is_preempted() && self.reason == PreemptReason::IoWait
    }

    /// Whether the finished-status invariant holds.
    pub fn is_consistent(&self) -> bool {
        match self.completion {
            Completion::Finished => self.reason == PreemptReason::None && self.progress.is_full(),
            Completion::Preempted => true,
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::finished()
    }
}
