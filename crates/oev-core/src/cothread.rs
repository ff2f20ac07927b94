use std::time::Duration;

use oev_model::{PreemptReason, Progress, Status};

use crate::clock::{Clock, TimeSlice};

/// Mutable run bookkeeping embedded in every cothread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunState {
    /// Last status produced by `resume`.
    pub status: Status,
    /// Soft target for one `resume` call; zero means "run to completion".
    pub time_budget: Duration,
}

impl RunState {
    pub fn with_budget(time_budget: Duration) -> Self {
        Self {
            status: Status::default(),
            time_budget,
        }
    }

    /// Mark a fresh run: `Preempted / None / 0`.
    #[inline]
    pub fn reset(&mut self) {
        self.status = Status::pending();
    }

    /// Record a finished run and return the status to hand back from `resume`.
    #[inline]
    pub fn finish(&mut self) -> Status {
        self.status = Status::finished();
        self.status
    }

    /// Record a preemption and return the status to hand back from `resume`.
    #[inline]
    pub fn preempt(&mut self, reason: PreemptReason, progress: Progress) -> Status {
        self.status = Status::preempted(reason, progress);
        self.status
    }
}

/// A resumable unit of cooperative work.
///
/// Implementors supply [`init`](Cothread::init) and [`resume`](Cothread::resume);
/// drivers and controllers only use the run-control methods
/// [`start`](Cothread::start), [`continue_run`](Cothread::continue_run) and
/// [`loop_run`](Cothread::loop_run).
///
/// Contract for `resume`:
/// - record the returned status in [`RunState::status`] (the `RunState` helpers do this);
/// - write the output only when finishing;
/// - poll [`TimeSlice::expired`] between units of work and return once it fires;
/// - once finished, return the cached status without side effects.
///
/// A body that never finishes makes every controller and driver above it ask
/// for more time forever. Nothing detects this.
pub trait Cothread {
    /// Result slot type. Domain failures are reported as a finished status
    /// plus a failure value here.
    type Output;

    fn run_state(&self) -> &RunState;

    fn run_state_mut(&mut self) -> &mut RunState;

    /// Reset the run context to its start state. Must not do heavy work.
    fn init(&mut self);

    /// Advance the work up to the soft deadline in `slice`.
    fn resume(&mut self, slice: &TimeSlice<'_>) -> Status;

    /// Result of the last finished run.
    fn output(&self) -> Option<&Self::Output> {
        None
    }

    /// Out-of-band cancellation hook. Controllers never call it on their own.
    fn abort(&mut self) {}

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    #[inline]
    fn status(&self) -> Status {
        self.run_state().status
    }

    #[inline]
    fn time_budget(&self) -> Duration {
        self.run_state().time_budget
    }

    #[inline]
    fn set_time_budget(&mut self, budget: Duration) {
        self.run_state_mut().time_budget = budget;
    }

    /// Mark the status pending, then call [`init`](Cothread::init).
    fn prepare(&mut self) {
        self.run_state_mut().reset();
        self.init();
    }

    /// Begin a new run: replaces any preempted context, then resumes once.
    fn start(&mut self, clock: &dyn Clock) -> Status {
        self.prepare();
        resume_with(self, clock)
    }

    /// Resume a preempted run; a finished run returns its cached status untouched.
    fn continue_run(&mut self, clock: &dyn Clock) -> Status {
        let status = self.status();
        if status.is_finished() {
            return status;
        }
        resume_with(self, clock)
    }

    /// Like [`continue_run`](Cothread::continue_run), but a finished run is
    /// re-initialised and started over.
    fn loop_run(&mut self, clock: &dyn Clock) -> Status {
        if self.status().is_finished() {
            self.prepare();
        }
        resume_with(self, clock)
    }
}

fn resume_with<C: Cothread + ?Sized>(task: &mut C, clock: &dyn Clock) -> Status {
    let slice = TimeSlice::begin(clock, task.time_budget());
    task.resume(&slice)
}

impl<C: Cothread + ?Sized> Cothread for Box<C> {
    type Output = C::Output;

    #[inline]
    fn run_state(&self) -> &RunState {
        (**self).run_state()
    }

    #[inline]
    fn run_state_mut(&mut self) -> &mut RunState {
        (**self).run_state_mut()
    }

    fn init(&mut self) {
        (**self).init()
    }

    fn resume(&mut self, slice: &TimeSlice<'_>) -> Status {
        (**self).resume(slice)
    }

    fn output(&self) -> Option<&Self::Output> {
        (**self).output()
    }

    fn abort(&mut self) {
        (**self).abort()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn prepare(&mut self) {
        (**self).prepare()
    }
}
