//! Strictly ordered composition of jobs under one shared time budget.
use std::{fmt, time::Duration};

use oev_model::{MAX_PROGRESS, PreemptReason, Progress, Status};
use tracing::{debug, trace};

use crate::{
    clock::TimeSlice,
    cothread::{Cothread, RunState},
    sentinel::Sentinel,
};

/// Entry of a [`SequentialController`] job list.
pub enum Job<T> {
    /// Atomic step: called once, its return value is the job result.
    Call(Box<dyn FnMut() -> T>),
    /// Resumable step, driven until it finishes.
    Task(Box<dyn Cothread<Output = T>>),
}

impl<T> Job<T> {
    pub fn call<F>(f: F) -> Self
    where
        F: FnMut() -> T + 'static,
    {
        Job::Call(Box::new(f))
    }

    pub fn task<C>(task: C) -> Self
    where
        C: Cothread<Output = T> + 'static,
    {
        Job::Task(Box::new(task))
    }

    #[inline]
    pub fn is_task(&self) -> bool {
        matches!(self, Job::Task(_))
    }

    pub fn as_task(&self) -> Option<&dyn Cothread<Output = T>> {
        match self {
            Job::Task(t) => Some(t.as_ref()),
            Job::Call(_) => None,
        }
    }
}

impl<T> fmt::Debug for Job<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::Call(_) => f.write_str("Job::Call"),
            Job::Task(t) => f
                .debug_tuple("Job::Task")
                .field(&t.name())
                .field(&t.status())
                .finish(),
        }
    }
}

/// Runs its jobs one after another, never starting job `k + 1` before job `k`
/// finishes.
///
/// - Finishes with the last job's result, or early with the first result that
///   [`is_quit`](Sentinel::is_quit); later jobs are then never initialised.
/// - A job waiting on I/O suspends the whole sequence with
///   [`PreemptReason::IoWait`].
/// - Progress is `(cursor * MAX + job_progress) / len`, capped below the
///   maximum until the sequence actually finishes.
/// - An empty job list finishes on its first resume with no result.
pub struct SequentialController<T> {
    jobs: Vec<Job<T>>,
    cursor: usize,
    state: RunState,
    result: Option<T>,
}

impl<T> SequentialController<T> {
    pub fn new(jobs: Vec<Job<T>>) -> Self {
        Self {
            jobs,
            cursor: 0,
            state: RunState::default(),
            result: None,
        }
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.state.time_budget = budget;
        self
    }

    /// Index of the job currently being driven; equals `len()` once done.
    #[inline]
    pub fn current_job(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn jobs(&self) -> &[Job<T>] {
        &self.jobs
    }

    pub fn into_jobs(self) -> Vec<Job<T>> {
        self.jobs
    }

    fn blended(&self, cursor: usize, job_progress: Progress) -> Progress {
        let n = self.jobs.len().max(1) as u64;
        let raw = (cursor as u64 * MAX_PROGRESS as u64 + job_progress.raw() as u64) / n;
        Progress::saturating(raw.min(MAX_PROGRESS as u64 - 1))
    }

    fn suspend(&mut self, reason: PreemptReason, job_progress: Progress) -> Status {
        let progress = self.blended(self.cursor, job_progress);
        trace!(job = self.cursor, %reason, %progress, "sequence preempted");
        self.state.preempt(reason, progress)
    }

    fn complete(&mut self, result: Option<T>) -> Status {
        self.result = result;
        self.state.finish()
    }
}

impl<T> Cothread for SequentialController<T>
where
    T: Clone + Sentinel,
{
    type Output = T;

    fn run_state(&self) -> &RunState {
        &self.state
    }

    fn run_state_mut(&mut self) -> &mut RunState {
        &mut self.state
    }

    fn init(&mut self) {
        self.cursor = 0;
        self.result = None;
        if let Some(Job::Task(first)) = self.jobs.first_mut() {
            first.prepare();
        }
        self.state.reset();
    }

    fn resume(&mut self, slice: &TimeSlice<'_>) -> Status {
        if self.state.status.is_finished() {
            return self.state.status;
        }
        let total = self.jobs.len();
        if total == 0 {
            return self.complete(None);
        }

        loop {
            let cursor = self.cursor;
            let (status, result) = match &mut self.jobs[cursor] {
                Job::Call(f) => (Status::finished(), Some(f())),
                Job::Task(task) => {
                    let status = task.continue_run(slice.clock());
                    if slice.expired() {
                        return self.suspend(PreemptReason::None, status.progress);
                    }
                    let result = if status.is_finished() {
                        task.output().cloned()
                    } else {
                        None
                    };
                    (status, result)
                }
            };

            if status.is_finished() {
                if result.as_ref().is_some_and(Sentinel::is_quit) {
                    debug!(job = cursor, "job requested quit; skipping remaining jobs");
                    return self.complete(result);
                }

                self.cursor += 1;
                if self.cursor == total {
                    trace!(jobs = total, "sequence finished");
                    return self.complete(result);
                }

                if let Job::Task(next) = &mut self.jobs[self.cursor] {
                    next.prepare();
                } else if slice.expired() {
                    return self.suspend(PreemptReason::None, Progress::ZERO);
                }
                continue;
            }

            if status.reason == PreemptReason::IoWait {
                return self.suspend(PreemptReason::IoWait, status.progress);
            }
        }
    }

    fn output(&self) -> Option<&T> {
        if self.state.status.is_finished() {
            self.result.as_ref()
        } else {
            None
        }
    }

    /// Forwards to the job currently running, if it is a task.
    fn abort(&mut self) {
        if let Some(Job::Task(task)) = self.jobs.get_mut(self.cursor)
            && !task.status().is_finished()
        {
            task.abort();
        }
    }

    fn name(&self) -> &str {
        "sequential"
    }
}

impl<T> fmt::Debug for SequentialController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequentialController")
            .field("jobs", &self.jobs)
            .field("cursor", &self.cursor)
            .field("state", &self.state)
            .finish()
    }
}
