use oev_model::{Completion, PreemptReason, Status};
use tracing::{debug, info, trace};

#[inline]
pub fn message_for(status: &Status) -> &'static str {
    match (status.completion, status.reason) {
        (Completion::Finished, _) => "task finished",

        // preempted
        (Completion::Preempted, PreemptReason::None) => "task preempted (time budget spent)",
        (Completion::Preempted, PreemptReason::IoWait) => "task waiting for i/o",
        (Completion::Preempted, PreemptReason::ProcessingData) => "task has data ready to process",
        (Completion::Preempted, PreemptReason::App(_)) => "task preempted (application reason)",
    }
}

/// Log one status report from `task`.
///
/// Routine budget preemptions go to `trace`, anything that changes what the
/// driver does next (waiting, finishing) is louder.
#[inline]
pub fn log_status(task: &str, tick: u64, status: &Status) {
    let msg = message_for(status);
    let progress = status.progress.raw();
    let percent = status.progress.percent();

    match (status.completion, status.reason) {
        (Completion::Finished, _) => info!(task, tick, "{msg}"),

        (Completion::Preempted, PreemptReason::None) => {
            trace!(task, tick, progress, percent, "{msg}")
        }
        (Completion::Preempted, PreemptReason::ProcessingData) => {
            trace!(task, tick, progress, percent, "{msg}")
        }
        (Completion::Preempted, PreemptReason::IoWait) => {
            debug!(task, tick, progress, percent, "{msg}")
        }
        (Completion::Preempted, PreemptReason::App(code)) => {
            debug!(task, tick, code, progress, percent, "{msg}")
        }
    }
}
