//! Fair-share composition: every job gets an equal slice of the budget per tick.
use std::{fmt, time::Duration};

use oev_model::{MAX_PROGRESS, PreemptReason, Progress, Status};
use tracing::{debug, trace};

use crate::{
    clock::TimeSlice,
    cothread::{Cothread, RunState},
};

/// When a [`ParallelController`] surfaces [`PreemptReason::IoWait`] to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IoWaitPolicy {
    /// Report `IoWait` whenever at least one job is blocked on I/O, even if
    /// others are still making progress.
    #[default]
    AnyWaiting,
    /// Report `IoWait` only when every remaining job is blocked on I/O.
    AllWaiting,
}

/// Runs a set of jobs "concurrently": each tick resumes every unfinished job
/// exactly once, each with `budget / len` of time.
///
/// Jobs blocked on I/O are parked in a waiting set and polled first on the
/// next tick without a budget check. A job that stops waiting rejoins the
/// active set but is not resumed a second time in that tick.
///
/// No aggregate result is produced; inspect the jobs through
/// [`jobs`](Self::jobs) or [`into_jobs`](Self::into_jobs) once finished.
pub struct ParallelController<C> {
    jobs: Vec<C>,
    active: Vec<usize>,
    waiting: Vec<usize>,
    policy: IoWaitPolicy,
    state: RunState,
}

impl<C: Cothread> ParallelController<C> {
    pub fn new(jobs: Vec<C>) -> Self {
        Self {
            jobs,
            active: Vec::new(),
            waiting: Vec::new(),
            policy: IoWaitPolicy::default(),
            state: RunState::default(),
        }
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.state.time_budget = budget;
        self
    }

    pub fn with_policy(mut self, policy: IoWaitPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    #[inline]
    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    pub fn job(&self, index: usize) -> Option<&C> {
        self.jobs.get(index)
    }

    pub fn jobs(&self) -> &[C] {
        &self.jobs
    }

    pub fn into_jobs(self) -> Vec<C> {
        self.jobs
    }

    /// Per-job slice handed out at `init`.
    fn job_budget(&self) -> Duration {
        let n = u32::try_from(self.jobs.len()).unwrap_or(u32::MAX).max(1);
        self.state.time_budget / n
    }
}

impl<C: Cothread> Cothread for ParallelController<C> {
    type Output = ();

    fn run_state(&self) -> &RunState {
        &self.state
    }

    fn run_state_mut(&mut self) -> &mut RunState {
        &mut self.state
    }

    fn init(&mut self) {
        let slice = self.job_budget();
        self.active = (0..self.jobs.len()).collect();
        self.waiting.clear();
        for job in &mut self.jobs {
            job.set_time_budget(slice);
            job.prepare();
        }
        self.state.reset();
        trace!(jobs = self.jobs.len(), slice_us = slice.as_micros() as u64, "parallel set initialised");
    }

    fn resume(&mut self, slice: &TimeSlice<'_>) -> Status {
        if self.state.status.is_finished() {
            return self.state.status;
        }
        let clock = slice.clock();
        let mut accumulated: u64 = 0;

        // Waiting jobs are expected to return almost immediately, so they are
        // polled without checking the budget.
        let mut rejoined = Vec::new();
        for idx in std::mem::take(&mut self.waiting) {
            let status = self.jobs[idx].continue_run(clock);
            if status.is_finished() {
                trace!(job = idx, "waiting job finished");
                continue;
            }
            accumulated += status.progress.raw() as u64;
            if status.reason == PreemptReason::IoWait {
                self.waiting.push(idx);
            } else {
                debug!(job = idx, "job left io wait");
                rejoined.push(idx);
            }
        }

        // Jobs that just left the waiting set already had their turn this tick.
        for idx in std::mem::take(&mut self.active) {
            let status = self.jobs[idx].continue_run(clock);
            if status.is_finished() {
                trace!(job = idx, "job finished");
                continue;
            }
            accumulated += status.progress.raw() as u64;
            if status.reason == PreemptReason::IoWait {
                debug!(job = idx, "job entered io wait");
                self.waiting.push(idx);
            } else {
                self.active.push(idx);
            }
        }
        self.active.extend(rejoined);

        let total = self.jobs.len() as u64;
        let remaining = (self.active.len() + self.waiting.len()) as u64;
        if remaining == 0 {
            trace!(jobs = total, "parallel set finished");
            return self.state.finish();
        }

        let io_wait = match self.policy {
            IoWaitPolicy::AnyWaiting => !self.waiting.is_empty(),
            IoWaitPolicy::AllWaiting => self.active.is_empty() && !self.waiting.is_empty(),
        };
        let reason = if io_wait {
            PreemptReason::IoWait
        } else {
            PreemptReason::None
        };

        let raw = (accumulated + (total - remaining) * MAX_PROGRESS as u64) / total;
        let progress = Progress::saturating(raw.min(MAX_PROGRESS as u64 - 1));
        self.state.preempt(reason, progress)
    }

    fn output(&self) -> Option<&()> {
        self.state.status.is_finished().then_some(&())
    }

    /// Forwards to every job that has not finished yet.
    fn abort(&mut self) {
        for &idx in self.active.iter().chain(self.waiting.iter()) {
            self.jobs[idx].abort();
        }
    }

    fn name(&self) -> &str {
        "parallel"
    }
}

impl<C: Cothread> fmt::Debug for ParallelController<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParallelController")
            .field("jobs", &self.jobs.len())
            .field("active", &self.active)
            .field("waiting", &self.waiting)
            .field("policy", &self.policy)
            .field("state", &self.state)
            .finish()
    }
}
